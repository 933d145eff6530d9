//! Rotating turntable carrying its own conveyor.
//!
//! Position 0 is horizontal, `distance` is vertical. Turning clockwise drives
//! toward vertical, counter-clockwise toward horizontal. The nested conveyor is
//! created with the turntable, ticked before the rotation, and reset with it.

use pw_core::TagId;

use crate::context::TickContext;
use crate::conveyor::Conveyor;
use crate::error::ElementResult;
use crate::moving::{Motion, MovingElement, TravelConfig};
use crate::state::{ElementState, Updateable};
use crate::tag::{Actuator, Sensor};

/// Default reset position: part-way through the rotation.
pub const DEFAULT_RESET_POSITION: u32 = 40;

/// Tags wired to a turntable and its conveyor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurntableTags {
    pub turn_clockwise: TagId,
    pub turn_counter_clockwise: TagId,
    pub horizontal_sensor: TagId,
    pub vertical_sensor: TagId,
    pub conveyor_left: Option<TagId>,
    pub conveyor_right: Option<TagId>,
}

#[derive(Debug, Clone)]
pub struct Turntable {
    rotation: MovingElement,
    conveyor: Conveyor,
}

impl Turntable {
    /// Length of the conveyor mounted on a turntable of the given diameter.
    pub fn conveyor_length(diameter: u32) -> u32 {
        let length = u64::from(diameter) * 4 / 5;
        u32::try_from(length).unwrap_or(u32::MAX).max(1)
    }

    /// Create a turntable whose travel distance is its diameter.
    ///
    /// # Errors
    ///
    /// Returns error if the derived conveyor is invalid.
    pub fn new(
        name: impl Into<String>,
        travel: TravelConfig,
        tags: TurntableTags,
    ) -> ElementResult<Self> {
        let name = name.into();
        let conveyor = Conveyor::new(
            format!("{name}.conveyor"),
            Actuator::from_optional(tags.conveyor_left),
            Actuator::from_optional(tags.conveyor_right),
            Self::conveyor_length(travel.distance()),
        )?;
        let rotation = MovingElement::new(
            name,
            travel,
            Actuator::new(tags.turn_clockwise),
            Actuator::new(tags.turn_counter_clockwise),
            Sensor::new(tags.horizontal_sensor),
            Sensor::new(tags.vertical_sensor),
        );
        Ok(Self { rotation, conveyor })
    }

    pub fn position(&self) -> u32 {
        self.rotation.position()
    }

    pub fn is_horizontal(&self) -> bool {
        self.rotation.is_at_min()
    }

    pub fn is_vertical(&self) -> bool {
        self.rotation.is_at_max()
    }

    pub fn horizontal_sensor(&self) -> &Sensor {
        self.rotation.min_sensor()
    }

    pub fn vertical_sensor(&self) -> &Sensor {
        self.rotation.max_sensor()
    }

    pub fn conveyor(&self) -> &Conveyor {
        &self.conveyor
    }

    pub fn conveyor_mut(&mut self) -> &mut Conveyor {
        &mut self.conveyor
    }

    pub fn rotation(&self) -> &MovingElement {
        &self.rotation
    }

    /// Tick the conveyor, then the rotation.
    pub fn turn(&mut self, ctx: &mut TickContext<'_>) -> Motion {
        self.conveyor.update_belt(ctx);
        self.rotation.update(ctx)
    }
}

impl Updateable for Turntable {
    fn name(&self) -> &str {
        self.rotation.name()
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        self.turn(ctx);
    }

    fn reset(&mut self) {
        self.conveyor.reset();
        self.rotation.reset();
    }

    fn actuator_tags(&self) -> Vec<&TagId> {
        let mut tags = self.conveyor.actuator_tags();
        tags.extend(
            [self.rotation.forward(), self.rotation.reverse()]
                .into_iter()
                .filter_map(Actuator::tag),
        );
        tags
    }

    fn sensors(&self) -> Vec<&Sensor> {
        vec![self.horizontal_sensor(), self.vertical_sensor()]
    }

    fn sensors_mut(&mut self) -> Vec<&mut Sensor> {
        self.rotation.sensors_mut().into_iter().collect()
    }

    fn state(&self) -> ElementState {
        ElementState::Turntable {
            name: self.rotation.name().to_string(),
            position: self.position(),
            distance: self.rotation.distance(),
            horizontal: self.is_horizontal(),
            vertical: self.is_vertical(),
            conveyor: self.conveyor.belt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ActuatorSnapshot;
    use crate::conveyor::BeltState;

    fn turntable() -> Turntable {
        Turntable::new(
            "turntable",
            TravelConfig::new(75, 5, DEFAULT_RESET_POSITION).unwrap(),
            TurntableTags {
                turn_clockwise: "B1_A22".into(),
                turn_counter_clockwise: "B1_A21".into(),
                horizontal_sensor: "B1_S22".into(),
                vertical_sensor: "B1_S21".into(),
                conveyor_left: Some("B1_A20".into()),
                conveyor_right: None,
            },
        )
        .unwrap()
    }

    fn snapshot(cw: bool, ccw: bool, belt: bool) -> ActuatorSnapshot {
        ActuatorSnapshot::from_values([("B1_A22", cw), ("B1_A21", ccw), ("B1_A20", belt)])
    }

    #[test]
    fn conveyor_sized_from_diameter() {
        let t = turntable();
        assert_eq!(t.conveyor().length(), 60);
        assert_eq!(t.conveyor().name(), "turntable.conveyor");
        assert_eq!(Turntable::conveyor_length(1), 1);
    }

    #[test]
    fn clockwise_reaches_vertical() {
        let mut t = turntable();
        let snap = snapshot(true, false, false);
        let mut ticks = 0;
        while !t.is_vertical() {
            let mut ctx = TickContext::new(ticks, &snap);
            assert_eq!(t.turn(&mut ctx), Motion::Forward);
            ticks += 1;
            assert!(ticks <= 7, "turntable never reached vertical");
        }
        assert_eq!(ticks, 7);
        assert_eq!(t.position(), 75);
        assert!(t.vertical_sensor().is_on());
        assert!(!t.horizontal_sensor().is_on());
    }

    #[test]
    fn conveyor_runs_while_turning() {
        let mut t = turntable();
        let snap = snapshot(false, true, true);
        let mut ctx = TickContext::new(0, &snap);
        assert_eq!(t.turn(&mut ctx), Motion::Reverse);
        assert_eq!(t.conveyor().belt(), BeltState::RunningLeft);
        assert_eq!(t.position(), 35);
    }

    #[test]
    fn conveyor_failure_does_not_block_rotation() {
        let mut t = turntable();
        let mut snap = snapshot(true, false, false);
        snap.insert(
            "B1_A20".into(),
            Err(pw_core::TagError::Unavailable {
                tag: "B1_A20".into(),
            }),
        );
        let mut ctx = TickContext::new(0, &snap);
        assert_eq!(t.turn(&mut ctx), Motion::Forward);
        assert_eq!(t.position(), 45);
        assert_eq!(ctx.diagnostics().len(), 1);
    }

    #[test]
    fn reset_returns_to_mid_travel_and_stops_conveyor() {
        let mut t = turntable();
        let snap = snapshot(false, true, true);
        for tick in 0..10 {
            let mut ctx = TickContext::new(tick, &snap);
            t.update(&mut ctx);
        }
        assert!(t.is_horizontal());
        assert!(t.horizontal_sensor().is_on());

        t.reset();
        assert_eq!(t.position(), DEFAULT_RESET_POSITION);
        assert!(!t.horizontal_sensor().is_on());
        assert!(!t.vertical_sensor().is_on());
        assert_eq!(t.conveyor().belt(), BeltState::Stopped);
    }

    #[test]
    fn registry_view() {
        let t = turntable();
        let tags: Vec<&str> = t.actuator_tags().into_iter().map(TagId::as_str).collect();
        assert_eq!(tags, ["B1_A20", "B1_A22", "B1_A21"]);
        assert_eq!(t.sensors().len(), 2);
    }
}
