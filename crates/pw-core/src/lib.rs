//! pw-core: stable foundation for plantwin.
//!
//! Contains:
//! - ids (tag identifiers shared with the external controller)
//! - tags (the read/write tag interface and an in-memory tag table)
//! - timing (tick duration and overrun statistics)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod tags;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PwError, PwResult};
pub use ids::TagId;
pub use tags::{SharedTagTable, TagError, TagInterface};
pub use timing::TickStats;
