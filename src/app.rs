//! Application module: the host-side view model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the latest published
//! playback state plus the list cursor.

mod model;

pub use model::*;
