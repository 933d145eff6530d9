//! Clamped-position state machine shared by every moving plant element.
//!
//! A [`MovingElement`] travels an integer position between `0` and `distance`,
//! `step_size` per tick, driven by two opposing actuators:
//!
//! 1. both on: conflict reported, position held
//! 2. forward only: `position = min(distance, position + step_size)`
//! 3. reverse only: `position = max(0, position - step_size)`
//! 4. neither: position held
//!
//! Endpoint sensors are only touched by the branch that moved. After a forward
//! move the max sensor is on exactly when `position == distance`; after a reverse
//! move the min sensor is on exactly when `position == 0`. A move that leaves an
//! endpoint also clears that endpoint's sensor.

use crate::context::TickContext;
use crate::error::{ElementError, ElementResult};
use crate::tag::{Actuator, Sensor};

/// Travel range and step of a moving element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelConfig {
    distance: u32,
    step_size: u32,
    reset_position: u32,
}

impl TravelConfig {
    /// Create a travel configuration.
    ///
    /// # Errors
    ///
    /// Returns error if `distance` or `step_size` is zero, or if
    /// `reset_position > distance`.
    pub fn new(distance: u32, step_size: u32, reset_position: u32) -> ElementResult<Self> {
        if distance == 0 {
            return Err(ElementError::InvalidArg {
                what: "distance must be positive",
            });
        }
        if step_size == 0 {
            return Err(ElementError::InvalidArg {
                what: "step_size must be positive",
            });
        }
        if reset_position > distance {
            return Err(ElementError::ResetOutOfRange {
                reset_position,
                distance,
            });
        }
        Ok(Self {
            distance,
            step_size,
            reset_position,
        })
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn step_size(&self) -> u32 {
        self.step_size
    }

    pub fn reset_position(&self) -> u32 {
        self.reset_position
    }
}

/// What a moving element did during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// No actuator on.
    Idle,
    /// Moved (or pushed against the max endpoint) in the forward direction.
    Forward,
    /// Moved (or pushed against the min endpoint) in the reverse direction.
    Reverse,
    /// Both actuators on; position held.
    Conflict,
    /// An actuator was unreadable; the tick was skipped.
    Skipped,
}

impl Motion {
    /// Whether a drive was running this tick.
    pub fn is_driving(self) -> bool {
        matches!(self, Self::Forward | Self::Reverse)
    }
}

/// Generic two-actuator, two-endpoint moving element.
#[derive(Debug, Clone)]
pub struct MovingElement {
    name: String,
    travel: TravelConfig,
    position: u32,
    forward: Actuator,
    reverse: Actuator,
    min_sensor: Sensor,
    max_sensor: Sensor,
}

impl MovingElement {
    /// Create an element resting at its reset position.
    pub fn new(
        name: impl Into<String>,
        travel: TravelConfig,
        forward: Actuator,
        reverse: Actuator,
        min_sensor: Sensor,
        max_sensor: Sensor,
    ) -> Self {
        Self {
            name: name.into(),
            travel,
            position: travel.reset_position,
            forward,
            reverse,
            min_sensor,
            max_sensor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn travel(&self) -> TravelConfig {
        self.travel
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn distance(&self) -> u32 {
        self.travel.distance
    }

    pub fn is_at_min(&self) -> bool {
        self.position == 0
    }

    pub fn is_at_max(&self) -> bool {
        self.position == self.travel.distance
    }

    pub fn forward(&self) -> &Actuator {
        &self.forward
    }

    pub fn reverse(&self) -> &Actuator {
        &self.reverse
    }

    pub fn min_sensor(&self) -> &Sensor {
        &self.min_sensor
    }

    pub fn max_sensor(&self) -> &Sensor {
        &self.max_sensor
    }

    /// Setup-time access, e.g. to pre-activate a sensor for the resting state.
    pub fn min_sensor_mut(&mut self) -> &mut Sensor {
        &mut self.min_sensor
    }

    pub fn max_sensor_mut(&mut self) -> &mut Sensor {
        &mut self.max_sensor
    }

    pub fn sensors_mut(&mut self) -> [&mut Sensor; 2] {
        [&mut self.min_sensor, &mut self.max_sensor]
    }

    /// Run one tick of the state machine.
    pub fn update(&mut self, ctx: &mut TickContext<'_>) -> Motion {
        if !ctx.latch_pair(&self.name, &mut self.forward, &mut self.reverse) {
            return Motion::Skipped;
        }
        match (self.forward.is_on(), self.reverse.is_on()) {
            (true, true) => {
                ctx.report_conflict(&self.name, &self.forward, &self.reverse);
                Motion::Conflict
            }
            (true, false) => {
                self.step_forward();
                Motion::Forward
            }
            (false, true) => {
                self.step_reverse();
                Motion::Reverse
            }
            (false, false) => Motion::Idle,
        }
    }

    fn step_forward(&mut self) {
        let left_min = self.is_at_min();
        self.position = self
            .position
            .saturating_add(self.travel.step_size)
            .min(self.travel.distance);
        let at_max = self.is_at_max();
        self.max_sensor.set(at_max);
        if left_min {
            self.min_sensor.deactivate();
        }
    }

    fn step_reverse(&mut self) {
        let left_max = self.is_at_max();
        self.position = self.position.saturating_sub(self.travel.step_size);
        let at_min = self.is_at_min();
        self.min_sensor.set(at_min);
        if left_max {
            self.max_sensor.deactivate();
        }
    }

    /// Restore the reset position and both endpoint sensors.
    pub fn reset(&mut self) {
        self.position = self.travel.reset_position;
        self.min_sensor.reset();
        self.max_sensor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ActuatorSnapshot;

    fn element(distance: u32, step: u32, reset: u32) -> MovingElement {
        MovingElement::new(
            "slide",
            TravelConfig::new(distance, step, reset).unwrap(),
            Actuator::new("FWD"),
            Actuator::new("REV"),
            Sensor::new("MIN"),
            Sensor::new("MAX"),
        )
    }

    fn tick(el: &mut MovingElement, fwd: bool, rev: bool) -> (Motion, usize) {
        let snapshot = ActuatorSnapshot::from_values([("FWD", fwd), ("REV", rev)]);
        let mut ctx = TickContext::new(0, &snapshot);
        let motion = el.update(&mut ctx);
        (motion, ctx.diagnostics().len())
    }

    #[test]
    fn invalid_travel() {
        assert!(TravelConfig::new(0, 1, 0).is_err());
        assert!(TravelConfig::new(10, 0, 0).is_err());
        assert_eq!(
            TravelConfig::new(10, 1, 11),
            Err(ElementError::ResetOutOfRange {
                reset_position: 11,
                distance: 10
            })
        );
        assert!(TravelConfig::new(10, 1, 10).is_ok());
    }

    #[test]
    fn starts_at_reset_position() {
        let el = element(75, 5, 40);
        assert_eq!(el.position(), 40);
        assert!(!el.is_at_min());
        assert!(!el.is_at_max());
    }

    #[test]
    fn forward_clamps_and_activates_max_exactly_at_endpoint() {
        let mut el = element(10, 4, 0);

        assert_eq!(tick(&mut el, true, false).0, Motion::Forward);
        assert_eq!(el.position(), 4);
        assert!(!el.max_sensor().is_on());

        tick(&mut el, true, false);
        assert_eq!(el.position(), 8);
        assert!(!el.max_sensor().is_on());

        tick(&mut el, true, false);
        assert_eq!(el.position(), 10);
        assert!(el.max_sensor().is_on());
        assert!(!el.min_sensor().is_on());
    }

    #[test]
    fn reverse_clamps_and_activates_min() {
        let mut el = element(10, 4, 6);
        tick(&mut el, false, true);
        assert_eq!(el.position(), 2);
        assert!(!el.min_sensor().is_on());
        tick(&mut el, false, true);
        assert_eq!(el.position(), 0);
        assert!(el.min_sensor().is_on());
    }

    #[test]
    fn leaving_an_endpoint_clears_its_sensor() {
        let mut el = element(10, 5, 0);
        el.min_sensor_mut().activate();

        tick(&mut el, true, false);
        assert_eq!(el.position(), 5);
        assert!(!el.min_sensor().is_on());
        assert!(!el.max_sensor().is_on());

        tick(&mut el, true, false);
        assert!(el.max_sensor().is_on());

        tick(&mut el, false, true);
        assert_eq!(el.position(), 5);
        assert!(!el.max_sensor().is_on());
        assert!(!el.min_sensor().is_on());
    }

    #[test]
    fn mid_travel_moves_leave_the_opposite_sensor_alone() {
        let mut el = element(20, 5, 10);
        // Stale max sensor from setup: a reverse move mid-travel does not touch it.
        el.max_sensor_mut().activate();
        tick(&mut el, false, true);
        assert_eq!(el.position(), 5);
        assert!(el.max_sensor().is_on());

        // The next forward move short of the end clears it.
        tick(&mut el, true, false);
        assert_eq!(el.position(), 10);
        assert!(!el.max_sensor().is_on());
    }

    #[test]
    fn conflict_holds_position_and_reports() {
        let mut el = element(75, 5, 40);
        for _ in 0..3 {
            let (motion, diags) = tick(&mut el, true, true);
            assert_eq!(motion, Motion::Conflict);
            assert_eq!(diags, 1);
        }
        assert_eq!(el.position(), 40);
    }

    #[test]
    fn idle_leaves_sensors_untouched() {
        let mut el = element(10, 1, 0);
        el.min_sensor_mut().activate();
        el.max_sensor_mut().activate();
        assert_eq!(tick(&mut el, false, false), (Motion::Idle, 0));
        assert!(el.min_sensor().is_on());
        assert!(el.max_sensor().is_on());
    }

    #[test]
    fn unreadable_actuator_skips_tick() {
        let mut el = element(10, 1, 5);
        let mut snapshot = ActuatorSnapshot::from_values([("FWD", true)]);
        snapshot.insert(
            "REV".into(),
            Err(pw_core::TagError::Unavailable { tag: "REV".into() }),
        );
        let mut ctx = TickContext::new(0, &snapshot);
        assert_eq!(el.update(&mut ctx), Motion::Skipped);
        assert_eq!(el.position(), 5);
        assert_eq!(ctx.diagnostics().len(), 1);
    }

    #[test]
    fn reset_restores_position_and_sensors() {
        let mut el = MovingElement::new(
            "door",
            TravelConfig::new(100, 10, 0).unwrap(),
            Actuator::new("FWD"),
            Actuator::new("REV"),
            Sensor::with_initial("MIN", true),
            Sensor::new("MAX"),
        );
        for _ in 0..10 {
            tick(&mut el, true, false);
        }
        el.min_sensor_mut().deactivate();
        assert!(el.is_at_max());

        el.reset();
        assert_eq!(el.position(), 0);
        assert!(el.min_sensor().is_on());
        assert!(!el.max_sensor().is_on());
    }
}
