//! Fixed-period tick schedule.
//!
//! Ticks are due every `period`. A tick that finishes after the next deadline
//! defers that next tick: it becomes due immediately and the schedule re-bases
//! from there. Ticks are never skipped and never overlap.

use std::time::{Duration, Instant};

/// Tracks when the next tick is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickClock {
    period: Duration,
    next_tick: Instant,
}

impl TickClock {
    /// Create a clock whose first tick is due at `start`.
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next_tick: start,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_tick(&self) -> Instant {
        self.next_tick
    }

    /// Check if a tick is due at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_tick
    }

    /// Time left until the next tick is due.
    pub fn time_until_tick(&self, now: Instant) -> Duration {
        self.next_tick.saturating_duration_since(now)
    }

    /// Schedule the tick after the one that just finished at `now`.
    ///
    /// Returns `true` if the finished tick ran past its successor's deadline, in
    /// which case the successor is deferred to `now`.
    pub fn advance(&mut self, now: Instant) -> bool {
        self.next_tick += self.period;
        if self.next_tick < now {
            self.next_tick = now;
            true
        } else {
            false
        }
    }

    /// Restart the schedule with a tick due at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.next_tick = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(10);

    #[test]
    fn first_tick_due_immediately() {
        let t0 = Instant::now();
        let clock = TickClock::new(PERIOD, t0);
        assert!(clock.is_due(t0));
        assert_eq!(clock.time_until_tick(t0), Duration::ZERO);
    }

    #[test]
    fn on_time_ticks_keep_the_grid() {
        let t0 = Instant::now();
        let mut clock = TickClock::new(PERIOD, t0);

        assert!(!clock.advance(t0 + Duration::from_millis(3)));
        assert_eq!(clock.next_tick(), t0 + PERIOD);
        assert!(!clock.is_due(t0 + Duration::from_millis(5)));
        assert_eq!(
            clock.time_until_tick(t0 + Duration::from_millis(4)),
            Duration::from_millis(6)
        );

        assert!(!clock.advance(t0 + Duration::from_millis(12)));
        assert_eq!(clock.next_tick(), t0 + 2 * PERIOD);
    }

    #[test]
    fn overrun_defers_next_tick_without_bursting() {
        let t0 = Instant::now();
        let mut clock = TickClock::new(PERIOD, t0);

        // Tick took 35ms: next tick is due right away, not three times in a row.
        let finished = t0 + Duration::from_millis(35);
        assert!(clock.advance(finished));
        assert_eq!(clock.next_tick(), finished);
        assert!(clock.is_due(finished));

        assert!(!clock.advance(finished + Duration::from_millis(1)));
        assert_eq!(clock.next_tick(), finished + PERIOD);
    }

    #[test]
    fn reset_rebases() {
        let t0 = Instant::now();
        let mut clock = TickClock::new(PERIOD, t0);
        clock.advance(t0);
        let later = t0 + Duration::from_secs(1);
        clock.reset(later);
        assert_eq!(clock.next_tick(), later);
        assert_eq!(clock.period(), PERIOD);
    }
}
