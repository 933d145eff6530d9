//! Error types for simulation setup and the tick runner.

use pw_core::TagId;
use thiserror::Error;

/// Errors raised before the tick loop starts or while controlling the runner.
/// Nothing inside a tick is an error: hazards and tag failures become diagnostics.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Duplicate tag {tag}: claimed by '{owner}' and '{claimant}'")]
    DuplicateTag {
        tag: TagId,
        owner: String,
        claimant: String,
    },

    #[error("Duplicate element name: {name}")]
    DuplicateElement { name: String },

    #[error("Sensor registered as {id} but wired to {tag}")]
    SensorTagMismatch { id: TagId, tag: TagId },

    #[error("Failed to spawn tick thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Tick thread panicked")]
    RunnerPanicked,
}

pub type SimResult<T> = Result<T, SimError>;
