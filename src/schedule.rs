//! Fixed-interval, cancellable ticks for the host loop.
//!
//! A [`Ticker`] does no work on its own: the loop asks it whether a tick is
//! due and how long it may sleep. Cancelling it is immediate and final until
//! the next `start`.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    /// A stopped ticker. Intervals shorter than a millisecond are raised to one.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Begin ticking; the first tick is due one interval after `now`.
    /// Restarting an active ticker re-phases it.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Whether a tick is due at `now`. Consumes the tick; missed ticks are
    /// collapsed into one rather than replayed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let next = due + self.interval;
        self.next_due = Some(if next <= now { now + self.interval } else { next });
        true
    }

    /// Time until the next tick (zero when overdue), or `None` when cancelled.
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn ticks_once_per_interval() {
        let t0 = Instant::now();
        let mut ticker = Ticker::from_millis(50);
        ticker.start(t0);

        assert!(!ticker.poll(t0));
        assert!(!ticker.poll(t0 + 49 * MS));
        assert!(ticker.poll(t0 + 50 * MS));
        assert!(!ticker.poll(t0 + 60 * MS));
        assert!(ticker.poll(t0 + 100 * MS));
        assert_eq!(ticker.time_until(t0 + 120 * MS), Some(30 * MS));
    }

    #[test]
    fn missed_ticks_collapse() {
        let t0 = Instant::now();
        let mut ticker = Ticker::from_millis(10);
        ticker.start(t0);

        assert!(ticker.poll(t0 + 95 * MS));
        assert!(!ticker.poll(t0 + 96 * MS));
        assert!(ticker.poll(t0 + 105 * MS));
    }

    #[test]
    fn cancel_stops_all_further_ticks() {
        let t0 = Instant::now();
        let mut ticker = Ticker::from_millis(10);
        assert!(!ticker.is_active());
        assert!(!ticker.poll(t0 + 1000 * MS));

        ticker.start(t0);
        assert!(ticker.is_active());
        ticker.cancel();
        assert!(!ticker.is_active());
        assert!(!ticker.poll(t0 + 1000 * MS));
        assert_eq!(ticker.time_until(t0), None);
    }

    #[test]
    fn zero_interval_is_raised() {
        assert_eq!(Ticker::new(Duration::ZERO).interval(), MS);
    }
}
