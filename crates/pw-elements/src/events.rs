//! Structured diagnostics raised while ticking the plant.

use core::fmt;

use pw_core::{TagError, TagId};

/// Non-fatal observation reported during a tick.
///
/// Diagnostics are returned to the caller in the tick report and logged through
/// `tracing`; none of them stops the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Both opposing actuators of an element were commanded on.
    Conflict {
        tick: u64,
        element: String,
        forward: TagId,
        reverse: TagId,
    },

    /// An actuator could not be read; the element skipped this tick.
    ActuatorUnavailable {
        tick: u64,
        element: String,
        tag: TagId,
        error: TagError,
    },

    /// A sensor value could not be published; it is retried next tick.
    SensorWriteFailed {
        tick: u64,
        tag: TagId,
        value: bool,
        error: TagError,
    },
}

impl Diagnostic {
    pub fn tick(&self) -> u64 {
        match self {
            Self::Conflict { tick, .. }
            | Self::ActuatorUnavailable { tick, .. }
            | Self::SensorWriteFailed { tick, .. } => *tick,
        }
    }

    /// Element the diagnostic belongs to, if any.
    pub fn element(&self) -> Option<&str> {
        match self {
            Self::Conflict { element, .. } | Self::ActuatorUnavailable { element, .. } => {
                Some(element)
            }
            Self::SensorWriteFailed { .. } => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_io_failure(&self) -> bool {
        matches!(
            self,
            Self::ActuatorUnavailable { .. } | Self::SensorWriteFailed { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict {
                tick,
                element,
                forward,
                reverse,
            } => write!(
                f,
                "tick {tick}: {element} driven in both directions ({forward} and {reverse}); \
                 a real drive could be destroyed"
            ),
            Self::ActuatorUnavailable {
                tick,
                element,
                tag,
                error,
            } => write!(f, "tick {tick}: {element} skipped, actuator {tag} unreadable: {error}"),
            Self::SensorWriteFailed {
                tick,
                tag,
                value,
                error,
            } => write!(f, "tick {tick}: sensor {tag}={value} not published: {error}"),
        }
    }
}
