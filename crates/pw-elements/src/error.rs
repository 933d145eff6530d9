//! Error types for plant element setup.

use thiserror::Error;

/// Result type for element operations.
pub type ElementResult<T> = Result<T, ElementError>;

/// Errors raised while configuring elements. Runtime outcomes such as endpoint
/// hits or actuator conflicts are not errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ElementError {
    /// Invalid argument provided to an element constructor.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Reset position does not lie on the travel range.
    #[error("Reset position {reset_position} outside travel range [0, {distance}]")]
    ResetOutOfRange { reset_position: u32, distance: u32 },

    /// Storage module has no free slot.
    #[error("Storage full: all {capacity} slots occupied")]
    StorageFull { capacity: usize },

    /// Storage slot index does not exist.
    #[error("Storage slot {slot} out of range (capacity {capacity})")]
    SlotOutOfRange { slot: usize, capacity: usize },
}
