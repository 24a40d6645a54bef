use std::time::{Duration, Instant};

use tracing::debug;

use crate::library::Track;

use super::clock::PlaybackClock;
use super::{AudioSink, LoadId, SinkEvent};

const LOG_TARGET: &str = "encore::sink";

/// Silent sink that advances a virtual clock.
///
/// Used when no output device is available. Tracks load instantly with the
/// duration from their metadata, and end once the clock passes it.
#[derive(Debug, Default)]
pub struct NullSink {
    load: Option<LoadId>,
    duration: Option<f64>,
    clock: PlaybackClock,
    volume: f32,
    ended: bool,
    events: Vec<SinkEvent>,
}

impl NullSink {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            ..Self::default()
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn position(&self, now: Instant) -> f64 {
        let secs = self.clock.elapsed(now).as_secs_f64();
        match self.duration {
            Some(d) => secs.min(d),
            None => secs,
        }
    }
}

impl AudioSink for NullSink {
    fn load(&mut self, load: LoadId, track: &Track) {
        debug!(target: LOG_TARGET, "null sink loading {}", track.audio_url);
        self.load = Some(load);
        self.duration = (track.duration_seconds > 0.0).then_some(track.duration_seconds);
        self.clock.clear();
        self.ended = false;
        self.events.push(SinkEvent::Ready {
            load,
            duration: self.duration,
        });
    }

    fn play(&mut self) {
        if self.load.is_some() {
            self.clock.start(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.clock.pause(Instant::now());
    }

    fn stop(&mut self) {
        self.load = None;
        self.duration = None;
        self.clock.clear();
    }

    fn seek(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        self.clock
            .reset(Duration::from_secs_f64(seconds.max(0.0)), Instant::now());
        self.ended = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn poll_events(&mut self) -> Vec<SinkEvent> {
        let mut events = std::mem::take(&mut self.events);
        let Some(load) = self.load else {
            return events;
        };

        let now = Instant::now();
        events.push(SinkEvent::Position {
            load,
            seconds: self.position(now),
        });

        if let Some(d) = self.duration {
            if !self.ended && self.clock.is_running() && self.clock.elapsed(now).as_secs_f64() >= d {
                self.ended = true;
                self.clock.pause(now);
                events.push(SinkEvent::Ended { load });
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(duration: f64) -> Track {
        Track::new("a", "A", "Artist", duration, "/music/a.mp3")
    }

    #[test]
    fn load_reports_ready_with_metadata_duration() {
        let mut sink = NullSink::new();
        sink.load(7, &track(12.0));

        let events = sink.poll_events();
        assert_eq!(
            events[0],
            SinkEvent::Ready {
                load: 7,
                duration: Some(12.0)
            }
        );
        assert!(matches!(events[1], SinkEvent::Position { load: 7, .. }));
    }

    #[test]
    fn unknown_duration_never_ends() {
        let mut sink = NullSink::new();
        sink.load(1, &track(0.0));
        sink.play();

        let events = sink.poll_events();
        assert_eq!(events[0], SinkEvent::Ready { load: 1, duration: None });
        assert!(!events.iter().any(|e| matches!(e, SinkEvent::Ended { .. })));
    }

    #[test]
    fn seeking_past_the_end_reports_ended_once() {
        let mut sink = NullSink::new();
        sink.load(3, &track(5.0));
        sink.play();
        sink.seek(10.0);

        let events = sink.poll_events();
        assert!(events.contains(&SinkEvent::Ended { load: 3 }));
        assert!(events.contains(&SinkEvent::Position { load: 3, seconds: 5.0 }));

        let again = sink.poll_events();
        assert!(!again.iter().any(|e| matches!(e, SinkEvent::Ended { .. })));
    }

    #[test]
    fn stopped_sink_is_quiet() {
        let mut sink = NullSink::new();
        sink.load(1, &track(5.0));
        sink.stop();
        assert_eq!(sink.poll_events().len(), 1, "only the pending Ready");
        assert!(sink.poll_events().is_empty());
    }

    #[test]
    fn volume_is_clamped() {
        let mut sink = NullSink::new();
        sink.set_volume(1.7);
        assert_eq!(sink.volume(), 1.0);
    }
}
