//! Signal tap: a read-only connection into what the sink is playing.
//!
//! `SampleTap` buffers mono samples from the decoder, `FrequencyAnalyser`
//! turns them into byte magnitudes, and `TapRegistry` makes sure every
//! visualizer reading the same sink shares one analyser.

mod analyser;
mod registry;
mod ring;

pub use analyser::{AnalyserOptions, FrequencyAnalyser};
pub use registry::{AnalyserHandle, TapRegistry};
pub use ring::{SampleTap, TapSource};
