//! Queue, transport and state stream.
//!
//! [`PlaybackEngine`] owns the queue and drives an [`AudioSink`](crate::sink::AudioSink).
//! Hosts issue commands and read [`PlaybackState`] snapshots, either by
//! calling `state()` or through `subscribe()`.

mod bus;
mod engine;
mod queue;
mod shuffle;
mod types;

pub use engine::{EngineOptions, PlaybackEngine};
pub use queue::{Queue, Removal};
pub use shuffle::ShuffleOrder;
pub use types::{Command, PlaybackState, QueueSnapshot, RepeatMode, Transport};
