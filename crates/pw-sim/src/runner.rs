//! Background tick driver.
//!
//! The tick thread owns the [`Simulation`] and the tag interface exclusively
//! (moved in via `thread::spawn`), so registration cannot happen while the loop
//! runs. Reports stream out through a bounded crossbeam channel; stopping the
//! runner joins the thread and hands the simulation back.
//!
//! ```text
//! Caller                         Tick Thread
//!   |                                |
//!   |--spawn(sim, tags)------------->| clock due?
//!   |                                | sim.tick(tags)
//!   |<--TickReport via reports()-----| stats.record()
//!   |                                | clock.advance()
//!   |--stop()----------------------->| shutdown flag seen
//!   |<--RunSummary { sim, stats }----|
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use pw_core::{TagInterface, TickStats};
use tracing::{info, warn};

use crate::clock::TickClock;
use crate::engine::Simulation;
use crate::error::{SimError, SimResult};
use crate::report::TickReport;

/// Reports buffered for the caller before new ones are discarded.
pub const REPORT_BUFFER: usize = 256;

/// Longest single sleep, so a stop request is noticed promptly.
const MAX_SLEEP: Duration = Duration::from_millis(5);

/// What the tick thread hands back when it stops.
#[derive(Debug)]
pub struct RunSummary {
    pub simulation: Simulation,
    pub stats: TickStats,
    /// Reports discarded because the caller did not drain the channel.
    pub dropped_reports: u64,
}

struct TickThread<T> {
    simulation: Simulation,
    tags: T,
    reports: Sender<TickReport>,
    shutdown: Arc<AtomicBool>,
}

impl<T: TagInterface> TickThread<T> {
    fn run(mut self) -> RunSummary {
        let period = self.simulation.tick_period();
        let mut clock = TickClock::new(period, Instant::now());
        let mut stats = TickStats::new();
        let mut dropped_reports = 0;

        while !self.shutdown.load(Ordering::Acquire) {
            let wait = clock.time_until_tick(Instant::now());
            if !wait.is_zero() {
                thread::sleep(wait.min(MAX_SLEEP));
                continue;
            }

            let started = Instant::now();
            let report = self.simulation.tick(&mut self.tags);
            let elapsed = started.elapsed();
            stats.record(elapsed, period);
            if clock.advance(Instant::now()) {
                warn!(
                    tick = report.tick,
                    elapsed_ms = elapsed.as_secs_f64() * 1e3,
                    "tick overran its period; next tick deferred"
                );
            }

            match self.reports.try_send(report) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => {}
                Err(TrySendError::Full(_)) => dropped_reports += 1,
            }
        }

        info!(ticks = stats.ticks, overruns = stats.overruns, "tick thread stopped");
        RunSummary {
            simulation: self.simulation,
            stats,
            dropped_reports,
        }
    }
}

/// Handle onto a simulation ticking on its own thread.
pub struct TickRunner {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<RunSummary>>,
    reports: Receiver<TickReport>,
}

impl TickRunner {
    /// Move `simulation` and `tags` onto a new tick thread and start ticking.
    ///
    /// # Errors
    ///
    /// Returns error if the thread cannot be spawned.
    pub fn spawn<T>(simulation: Simulation, tags: T) -> SimResult<Self>
    where
        T: TagInterface + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let (tx, rx) = crossbeam_channel::bounded(REPORT_BUFFER);
        let period = simulation.tick_period();
        let tick_thread = TickThread {
            simulation,
            tags,
            reports: tx,
            shutdown: Arc::clone(&shutdown),
        };
        let handle = thread::Builder::new()
            .name("plantwin-tick".into())
            .spawn(move || tick_thread.run())?;
        info!(period_ms = period.as_millis() as u64, "tick thread started");
        Ok(Self {
            shutdown,
            handle: Some(handle),
            reports: rx,
        })
    }

    /// Reports of completed ticks, oldest first.
    pub fn reports(&self) -> &Receiver<TickReport> {
        &self.reports
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop after the tick in flight (if any) and recover the simulation.
    ///
    /// # Errors
    ///
    /// Returns error if the tick thread panicked.
    pub fn stop(mut self) -> SimResult<RunSummary> {
        self.shutdown.store(true, Ordering::Release);
        let handle = self.handle.take().ok_or(SimError::RunnerPanicked)?;
        handle.join().map_err(|_| SimError::RunnerPanicked)
    }
}

impl Drop for TickRunner {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
