//! Track model and local library scanning.
//!
//! `Track` is the immutable value the playback engine queues. `scan` builds
//! tracks from audio files on disk for the terminal host.

mod model;
mod scan;

pub use model::Track;
pub use scan::scan;
