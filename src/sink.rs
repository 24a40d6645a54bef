//! Audio output behind the playback engine.
//!
//! An [`AudioSink`] plays one track at a time. Loading is asynchronous from
//! the engine's point of view: `load` only starts the work, and the outcome
//! arrives later as a [`SinkEvent`] tagged with the [`LoadId`] the engine
//! handed in. Events for an older load are stale and the engine drops them.

mod clock;
mod null;
mod output;

pub use clock::PlaybackClock;
pub use null::NullSink;
pub use output::RodioSink;

use crate::error::PlaybackError;
use crate::library::Track;
use crate::tap::SampleTap;

/// Generation number of a `load` call.
pub type LoadId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// The track is decoded and paused at position 0.
    Ready {
        load: LoadId,
        /// Duration reported by the decoder, when it knows one.
        duration: Option<f64>,
    },
    Failed { load: LoadId, error: PlaybackError },
    Position { load: LoadId, seconds: f64 },
    /// Playback ran off the end of the track.
    Ended { load: LoadId },
}

impl SinkEvent {
    pub fn load(&self) -> LoadId {
        match self {
            Self::Ready { load, .. }
            | Self::Failed { load, .. }
            | Self::Position { load, .. }
            | Self::Ended { load } => *load,
        }
    }
}

pub trait AudioSink {
    /// Start loading `track`, replacing whatever was loaded before.
    fn load(&mut self, load: LoadId, track: &Track);
    fn play(&mut self);
    fn pause(&mut self);
    /// Unload the current track.
    fn stop(&mut self);
    /// Move the play head to `seconds`, keeping the play/pause state.
    fn seek(&mut self, seconds: f64);
    /// Output gain in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
    /// Everything that happened since the last poll, oldest first.
    fn poll_events(&mut self) -> Vec<SinkEvent>;

    /// Read-only view of the samples being played, if this sink has one.
    fn signal_tap(&self) -> Option<SampleTap> {
        None
    }
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn load(&mut self, load: LoadId, track: &Track) {
        (**self).load(load, track)
    }

    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn seek(&mut self, seconds: f64) {
        (**self).seek(seconds)
    }

    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume)
    }

    fn poll_events(&mut self) -> Vec<SinkEvent> {
        (**self).poll_events()
    }

    fn signal_tap(&self) -> Option<SampleTap> {
        (**self).signal_tap()
    }
}
