//! Error types shared by the playback engine, the signal tap and the
//! visualizer.

use thiserror::Error;

/// Coarse classification of a [`PlaybackError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackErrorKind {
    LoadFailed,
    DecodeFailed,
    NetworkFailed,
}

/// A track could not be turned into sound.
///
/// These are reported through the playback state stream rather than returned
/// from commands: the track stays current, playback stops, and the caller
/// decides whether to retry or skip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("failed to open {url}: {reason}")]
    LoadFailed { url: String, reason: String },

    #[error("failed to decode {url}: {reason}")]
    DecodeFailed { url: String, reason: String },

    #[error("failed to fetch {url}: {reason}")]
    NetworkFailed { url: String, reason: String },
}

impl PlaybackError {
    pub fn kind(&self) -> PlaybackErrorKind {
        match self {
            Self::LoadFailed { .. } => PlaybackErrorKind::LoadFailed,
            Self::DecodeFailed { .. } => PlaybackErrorKind::DecodeFailed,
            Self::NetworkFailed { .. } => PlaybackErrorKind::NetworkFailed,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::LoadFailed { url, .. }
            | Self::DecodeFailed { url, .. }
            | Self::NetworkFailed { url, .. } => url,
        }
    }
}

/// Returned by engine commands issued after [`dispose`](crate::playback::PlaybackEngine::dispose).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("playback engine has been disposed")]
    Disposed,
}

/// Returned by visualizer ticks issued after teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VisualizerError {
    #[error("spectrum visualizer has been disposed")]
    Disposed,
}

/// The visualizer could not read from the audio graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TapError {
    #[error("signal tap unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Persisted player preferences could not be read or written.
#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse prefs: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize prefs: {0}")]
    Serialize(#[from] toml::ser::Error),
}
