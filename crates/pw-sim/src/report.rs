//! Outcome of a single tick.

use std::time::Duration;

use pw_elements::Diagnostic;

/// What happened during one tick, handed back to the caller of the tick driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// 1-based tick number within the run.
    pub tick: u64,
    /// Conflicts and tag I/O failures, in the order they occurred.
    pub diagnostics: Vec<Diagnostic>,
    /// Actuator tags read into the snapshot.
    pub actuators_read: usize,
    /// Actuator reads that failed.
    pub failed_reads: usize,
    /// Sensor values accepted by the tag interface.
    pub sensors_published: usize,
    /// Wall-clock time spent in the tick.
    pub elapsed: Duration,
}

impl TickReport {
    pub fn conflicts(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_conflict())
    }

    pub fn io_failures(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_io_failure())
    }

    /// No diagnostics at all.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
