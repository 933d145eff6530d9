//! Bidirectional belt conveyor.
//!
//! Only the drive is modelled: the belt state is derived from the two actuators
//! every tick. Moving workpieces along the belt is left to the caller.

use pw_core::TagId;
use serde::Serialize;

use crate::context::TickContext;
use crate::error::{ElementError, ElementResult};
use crate::state::{ElementState, Updateable};
use crate::tag::{Actuator, Sensor};

/// Drive state of a belt for the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BeltState {
    #[default]
    Stopped,
    RunningLeft,
    RunningRight,
}

impl BeltState {
    pub fn is_running(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

#[derive(Debug, Clone)]
pub struct Conveyor {
    name: String,
    left: Actuator,
    right: Actuator,
    length: u32,
    belt: BeltState,
}

impl Conveyor {
    /// # Errors
    ///
    /// Returns error if `length` is zero.
    pub fn new(
        name: impl Into<String>,
        left: Actuator,
        right: Actuator,
        length: u32,
    ) -> ElementResult<Self> {
        if length == 0 {
            return Err(ElementError::InvalidArg {
                what: "conveyor length must be positive",
            });
        }
        Ok(Self {
            name: name.into(),
            left,
            right,
            length,
            belt: BeltState::Stopped,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn belt(&self) -> BeltState {
        self.belt
    }

    pub fn left(&self) -> &Actuator {
        &self.left
    }

    pub fn right(&self) -> &Actuator {
        &self.right
    }

    pub fn update_belt(&mut self, ctx: &mut TickContext<'_>) {
        if !ctx.latch_pair(&self.name, &mut self.left, &mut self.right) {
            self.belt = BeltState::Stopped;
            return;
        }
        self.belt = match (self.left.is_on(), self.right.is_on()) {
            (true, true) => {
                ctx.report_conflict(&self.name, &self.left, &self.right);
                BeltState::Stopped
            }
            (true, false) => BeltState::RunningLeft,
            (false, true) => BeltState::RunningRight,
            (false, false) => BeltState::Stopped,
        };
    }

    pub fn stop(&mut self) {
        self.belt = BeltState::Stopped;
    }
}

impl Updateable for Conveyor {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        self.update_belt(ctx);
    }

    fn reset(&mut self) {
        self.stop();
    }

    fn actuator_tags(&self) -> Vec<&TagId> {
        [&self.left, &self.right]
            .into_iter()
            .filter_map(Actuator::tag)
            .collect()
    }

    fn sensors(&self) -> Vec<&Sensor> {
        Vec::new()
    }

    fn sensors_mut(&mut self) -> Vec<&mut Sensor> {
        Vec::new()
    }

    fn state(&self) -> ElementState {
        ElementState::Conveyor {
            name: self.name.clone(),
            length: self.length,
            belt: self.belt,
        }
    }
}
