//! Two-leaf gate.

use pw_core::TagId;

use crate::context::TickContext;
use crate::moving::{Motion, MovingElement, TravelConfig};
use crate::state::{DoorState, ElementState, Updateable};
use crate::tag::{Actuator, Sensor};

/// Tags wired to one gate leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDoorTags {
    pub open: TagId,
    pub close: TagId,
    pub open_sensor: TagId,
    pub closed_sensor: TagId,
}

/// One gate leaf: closed at position 0, open at `distance`.
#[derive(Debug, Clone)]
pub struct GateDoor {
    motion: MovingElement,
}

impl GateDoor {
    pub fn new(name: impl Into<String>, travel: TravelConfig, tags: GateDoorTags) -> Self {
        Self {
            motion: MovingElement::new(
                name,
                travel,
                Actuator::new(tags.open),
                Actuator::new(tags.close),
                Sensor::new(tags.closed_sensor),
                Sensor::new(tags.open_sensor),
            ),
        }
    }

    pub fn name(&self) -> &str {
        self.motion.name()
    }

    pub fn position(&self) -> u32 {
        self.motion.position()
    }

    pub fn is_closed(&self) -> bool {
        self.motion.is_at_min()
    }

    pub fn is_open(&self) -> bool {
        self.motion.is_at_max()
    }

    pub fn open_sensor(&self) -> &Sensor {
        self.motion.max_sensor()
    }

    pub fn closed_sensor(&self) -> &Sensor {
        self.motion.min_sensor()
    }

    /// Setup-time access, used to report a door that rests closed.
    pub fn closed_sensor_mut(&mut self) -> &mut Sensor {
        self.motion.min_sensor_mut()
    }

    pub fn motion(&self) -> &MovingElement {
        &self.motion
    }

    pub fn update(&mut self, ctx: &mut TickContext<'_>) -> Motion {
        self.motion.update(ctx)
    }

    pub fn reset(&mut self) {
        self.motion.reset();
    }

    pub fn state(&self) -> DoorState {
        DoorState {
            position: self.position(),
            distance: self.motion.distance(),
            open: self.is_open(),
            closed: self.is_closed(),
        }
    }
}

/// Gate made of two independent leaves.
#[derive(Debug, Clone)]
pub struct Gate {
    name: String,
    left: GateDoor,
    right: GateDoor,
}

impl Gate {
    pub fn new(name: impl Into<String>, left: GateDoor, right: GateDoor) -> Self {
        Self {
            name: name.into(),
            left,
            right,
        }
    }

    pub fn left(&self) -> &GateDoor {
        &self.left
    }

    pub fn right(&self) -> &GateDoor {
        &self.right
    }

    pub fn is_open(&self) -> bool {
        self.left.is_open() && self.right.is_open()
    }

    pub fn is_closed(&self) -> bool {
        self.left.is_closed() && self.right.is_closed()
    }
}

impl Updateable for Gate {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        self.left.update(ctx);
        self.right.update(ctx);
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    fn actuator_tags(&self) -> Vec<&TagId> {
        [&self.left, &self.right]
            .into_iter()
            .flat_map(|door| [door.motion.forward(), door.motion.reverse()])
            .filter_map(Actuator::tag)
            .collect()
    }

    fn sensors(&self) -> Vec<&Sensor> {
        vec![
            self.left.closed_sensor(),
            self.left.open_sensor(),
            self.right.closed_sensor(),
            self.right.open_sensor(),
        ]
    }

    fn sensors_mut(&mut self) -> Vec<&mut Sensor> {
        let mut sensors = Vec::with_capacity(4);
        sensors.extend(self.left.motion.sensors_mut());
        sensors.extend(self.right.motion.sensors_mut());
        sensors
    }

    fn state(&self) -> ElementState {
        ElementState::Gate {
            name: self.name.clone(),
            left: self.left.state(),
            right: self.right.state(),
        }
    }
}
