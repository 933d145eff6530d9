//! Tick engine for plantwin.
//!
//! Provides:
//! - the [`Simulation`] registry of updateable elements and standalone sensors
//! - the three-phase tick: snapshot actuators, update elements, publish sensors
//! - a fixed-period [`TickClock`] that defers late ticks instead of dropping them
//! - a background [`TickRunner`] owning the simulation while it runs

pub mod clock;
pub mod engine;
pub mod error;
pub mod report;
pub mod runner;

pub use clock::TickClock;
pub use engine::Simulation;
pub use error::{SimError, SimResult};
pub use report::TickReport;
pub use runner::{RunSummary, TickRunner};
