//! Playback-related small types.
//!
//! This module defines the repeat mode, transport state, command set and the
//! published state snapshot.

use std::sync::Arc;

use crate::config::RepeatModeSetting;
use crate::error::PlaybackError;
use crate::library::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Stop at either end of the queue.
    #[default]
    None,
    /// Replay the current track when it ends naturally.
    One,
    /// Wrap around at either end of the queue.
    All,
}

impl RepeatMode {
    /// Next mode in the `None -> One -> All -> None` cycle.
    pub fn cycled(self) -> Self {
        match self {
            Self::None => Self::One,
            Self::One => Self::All,
            Self::All => Self::None,
        }
    }
}

impl From<RepeatModeSetting> for RepeatMode {
    fn from(s: RepeatModeSetting) -> Self {
        match s {
            RepeatModeSetting::None => Self::None,
            RepeatModeSetting::One => Self::One,
            RepeatModeSetting::All => Self::All,
        }
    }
}

impl From<RepeatMode> for RepeatModeSetting {
    fn from(m: RepeatMode) -> Self {
        match m {
            RepeatMode::None => Self::None,
            RepeatMode::One => Self::One,
            RepeatMode::All => Self::All,
        }
    }
}

/// Coarse engine state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Transport {
    /// Nothing loaded (empty queue).
    #[default]
    Idle,
    /// A track is current but has not started, or playback stopped at a boundary.
    Loaded,
    Playing,
    Paused,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the queue and load `tracks[start_index]`.
    SetQueue { tracks: Vec<Track>, start_index: usize },
    Play,
    Pause,
    TogglePlayPause,
    Next,
    Previous,
    /// Seek to an absolute position in seconds.
    Seek(f64),
    /// Seek relative to the current position (seconds, positive or negative).
    SeekBy(f64),
    RemoveFromQueue(usize),
    MoveInQueue { from: usize, to: usize },
    PlayFromQueue(usize),
    ToggleShuffle,
    ToggleRepeat,
    SetRepeatMode(RepeatMode),
    SetVolume(f32),
    ToggleMute,
    /// Swap in a refreshed copy of a queued track (matched by id).
    UpdateCurrentTrack(Track),
}

/// Read-only view of the queue carried by every [`PlaybackState`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueSnapshot {
    pub tracks: Arc<[Track]>,
    pub current_index: Option<usize>,
}

impl QueueSnapshot {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Snapshot published to subscribers after every transport event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    pub transport: Transport,
    pub is_playing: bool,
    /// The sink has not yet reported the current track as ready.
    pub is_loading: bool,
    pub current_time_seconds: f64,
    pub duration_seconds: f64,
    pub is_shuffling: bool,
    pub repeat_mode: RepeatMode,
    pub volume: f32,
    pub is_muted: bool,
    pub queue: QueueSnapshot,
    /// Set when the current track failed to load; cleared on the next load.
    pub last_error: Option<PlaybackError>,
}

impl PlaybackState {
    /// Playback progress in `[0, 1]`, or 0 when the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration_seconds > 0.0 {
            (self.current_time_seconds / self.duration_seconds).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
