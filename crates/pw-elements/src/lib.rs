//! Physical plant elements for plantwin.
//!
//! This crate holds the state machines of the simulated plant: the elements an
//! external controller drives through actuator tags and observes through sensor tags.
//!
//! # Architecture
//!
//! - Tags are booleans: [`Actuator`]s are commanded by the controller, [`Sensor`]s
//!   are computed by the model
//! - Every element is [`Updateable`]: once per tick it reads its actuators from a
//!   consistent [`ActuatorSnapshot`] and updates its sensors
//! - [`MovingElement`] is the one clamped-position state machine; [`GateDoor`] and
//!   [`Turntable`] compose it with their own endpoint names
//! - Hazards and tag failures are reported as [`Diagnostic`] values, never as errors
//!
//! Elements never talk to the tag interface directly; the engine snapshots
//! actuators before a tick and flushes sensors after it.

pub mod context;
pub mod conveyor;
pub mod error;
pub mod events;
pub mod gate;
pub mod moving;
pub mod state;
pub mod storage;
pub mod tag;
pub mod turntable;

pub use context::{ActuatorRead, ActuatorSnapshot, TickContext};
pub use conveyor::{BeltState, Conveyor};
pub use error::{ElementError, ElementResult};
pub use events::Diagnostic;
pub use gate::{Gate, GateDoor, GateDoorTags};
pub use moving::{Motion, MovingElement, TravelConfig};
pub use state::{DoorState, ElementState, Updateable};
pub use storage::StorageModule;
pub use tag::{Actuator, Sensor};
pub use turntable::{Turntable, TurntableTags};
