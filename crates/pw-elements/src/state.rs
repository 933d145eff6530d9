//! The updateable-element seam and the observable element states.

use pw_core::TagId;
use serde::Serialize;

use crate::context::TickContext;
use crate::conveyor::BeltState;
use crate::tag::Sensor;

/// Element driven by the simulation tick.
///
/// Implementations read actuators only through the [`TickContext`] and write only
/// their own sensors; the engine publishes sensors after every element has run.
pub trait Updateable: Send {
    /// Element name for diagnostics and identification.
    fn name(&self) -> &str;

    /// Advance the element by one tick.
    fn update(&mut self, ctx: &mut TickContext<'_>);

    /// Restore reset state, recursively for owned elements.
    fn reset(&mut self);

    /// Every assigned actuator tag the element reads.
    fn actuator_tags(&self) -> Vec<&TagId>;

    /// Every sensor the element owns.
    fn sensors(&self) -> Vec<&Sensor>;

    fn sensors_mut(&mut self) -> Vec<&mut Sensor>;

    /// Snapshot for display layers.
    fn state(&self) -> ElementState;
}

/// Observable state of a gate leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DoorState {
    pub position: u32,
    pub distance: u32,
    pub open: bool,
    pub closed: bool,
}

/// Observable state of one registered element, polled after a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementState {
    Conveyor {
        name: String,
        length: u32,
        belt: BeltState,
    },
    Gate {
        name: String,
        left: DoorState,
        right: DoorState,
    },
    Turntable {
        name: String,
        position: u32,
        distance: u32,
        horizontal: bool,
        vertical: bool,
        conveyor: BeltState,
    },
}

impl ElementState {
    pub fn name(&self) -> &str {
        match self {
            Self::Conveyor { name, .. } | Self::Gate { name, .. } | Self::Turntable { name, .. } => {
                name
            }
        }
    }
}
