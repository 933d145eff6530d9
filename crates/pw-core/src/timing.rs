//! Tick timing statistics.
//!
//! Records how long each tick took against its configured period, so a caller
//! can see when the plant model falls behind real time.

use std::time::Duration;

/// Accumulated wall-clock statistics for a tick loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Number of ticks recorded.
    pub ticks: u64,
    /// Ticks that took longer than the period (the next tick was deferred).
    pub overruns: u64,
    /// Total time spent inside ticks.
    pub busy: Duration,
    /// Longest single tick.
    pub longest: Duration,
}

impl TickStats {
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            overruns: 0,
            busy: Duration::ZERO,
            longest: Duration::ZERO,
        }
    }

    /// Record one tick. Returns `true` if it overran `period`.
    pub fn record(&mut self, elapsed: Duration, period: Duration) -> bool {
        self.ticks += 1;
        self.busy += elapsed;
        self.longest = self.longest.max(elapsed);
        let overran = elapsed > period;
        if overran {
            self.overruns += 1;
        }
        overran
    }

    /// Average time per tick.
    pub fn average(&self) -> Duration {
        match u32::try_from(self.ticks) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.busy / n,
            Err(_) => Duration::from_secs_f64(self.busy.as_secs_f64() / self.ticks as f64),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
