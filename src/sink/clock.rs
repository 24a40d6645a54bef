use std::time::{Duration, Instant};

/// Wall-clock playback position: time accumulated across pauses plus the
/// running segment since the last start.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackClock {
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl PlaybackClock {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(st) = self.started_at.take() {
            self.accumulated += now.saturating_duration_since(st);
        }
    }

    /// Jump to `position`, keeping the running/paused state.
    pub fn reset(&mut self, position: Duration, now: Instant) {
        self.accumulated = position;
        if self.started_at.is_some() {
            self.started_at = Some(now);
        }
    }

    /// Stop and rewind to zero.
    pub fn clear(&mut self) {
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .started_at
                .map_or(Duration::ZERO, |st| now.saturating_duration_since(st))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_pauses() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::default();

        clock.start(t0);
        clock.pause(t0 + Duration::from_secs(2));
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(10)), Duration::from_secs(2));

        clock.start(t0 + Duration::from_secs(10));
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(13)), Duration::from_secs(5));
    }

    #[test]
    fn reset_keeps_running_state() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::default();

        clock.reset(Duration::from_secs(30), t0);
        assert!(!clock.is_running());
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(5)), Duration::from_secs(30));

        clock.start(t0);
        clock.reset(Duration::from_secs(1), t0 + Duration::from_secs(4));
        assert!(clock.is_running());
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(6)), Duration::from_secs(3));

        clock.clear();
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(9)), Duration::ZERO);
    }
}
