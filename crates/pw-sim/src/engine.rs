//! Simulation registry and the tick.
//!
//! A tick runs in three phases so that a controller changing tags concurrently
//! can never be observed half-way:
//!
//! 1. read every registered actuator tag into one [`ActuatorSnapshot`]
//! 2. update every element, in registration order, against that snapshot
//! 3. publish every sensor whose value the controller has not seen yet
//!
//! A failed read only skips the elements wired to that tag, and a failed write is
//! retried on the next tick. Neither stops the loop.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use pw_core::{TagId, TagInterface};
use pw_elements::{
    ActuatorSnapshot, Diagnostic, ElementState, Sensor, StorageModule, TickContext, Updateable,
};
use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};
use crate::report::TickReport;

/// Owner name used for standalone sensors in duplicate-tag errors.
const ENGINE_OWNER: &str = "<engine>";

/// Plant simulation: registered elements, standalone sensors and storage.
pub struct Simulation {
    tick_period: Duration,
    elements: Vec<Box<dyn Updateable>>,
    sensors: Vec<Sensor>,
    storage: Option<StorageModule>,
    /// Tag -> owning element (or the engine for standalone sensors).
    claimed: HashMap<TagId, String>,
    /// Actuator tags in registration order, read once per tick.
    actuator_tags: Vec<TagId>,
    tick: u64,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick_period", &self.tick_period)
            .field(
                "elements",
                &self.elements.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field("sensors", &self.sensors.len())
            .field("tick", &self.tick)
            .finish()
    }
}

impl Simulation {
    /// Create an empty simulation ticking every `tick_period_ms` milliseconds.
    ///
    /// # Errors
    ///
    /// Returns error if the period is zero.
    pub fn new(tick_period_ms: u64) -> SimResult<Self> {
        if tick_period_ms == 0 {
            return Err(SimError::InvalidArg {
                what: "tick period must be positive",
            });
        }
        Ok(Self {
            tick_period: Duration::from_millis(tick_period_ms),
            elements: Vec::new(),
            sensors: Vec::new(),
            storage: None,
            claimed: HashMap::new(),
            actuator_tags: Vec::new(),
            tick: 0,
        })
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Number of ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Register an element. Its update runs after every element registered before it.
    ///
    /// # Errors
    ///
    /// Returns error if the name is taken or any of its tags is already claimed.
    /// Nothing is registered on error.
    pub fn add_updateable(&mut self, element: impl Updateable + 'static) -> SimResult<()> {
        self.add_boxed(Box::new(element))
    }

    pub fn add_boxed(&mut self, element: Box<dyn Updateable>) -> SimResult<()> {
        let name = element.name().to_string();
        if self.elements.iter().any(|e| e.name() == name) {
            return Err(SimError::DuplicateElement { name });
        }

        let mut tags: Vec<TagId> = element.actuator_tags().into_iter().cloned().collect();
        let actuator_count = tags.len();
        tags.extend(element.sensors().into_iter().map(|s| s.tag().clone()));
        self.check_unclaimed(&tags, &name)?;

        for tag in &tags {
            self.claimed.insert(tag.clone(), name.clone());
        }
        self.actuator_tags.extend(tags.into_iter().take(actuator_count));
        debug!(element = %name, "registered element");
        self.elements.push(element);
        Ok(())
    }

    /// Register a sensor owned by the engine rather than by an element
    /// (light barriers, switches).
    ///
    /// # Errors
    ///
    /// Returns error if `id` differs from the sensor's tag or is already claimed.
    pub fn add_sensor(&mut self, id: TagId, sensor: Sensor) -> SimResult<()> {
        if *sensor.tag() != id {
            return Err(SimError::SensorTagMismatch {
                id,
                tag: sensor.tag().clone(),
            });
        }
        self.check_unclaimed(std::slice::from_ref(&id), ENGINE_OWNER)?;
        self.claimed.insert(id, ENGINE_OWNER.to_string());
        self.sensors.push(sensor);
        Ok(())
    }

    pub fn set_storage_module(&mut self, storage: StorageModule) {
        self.storage = Some(storage);
    }

    fn check_unclaimed(&self, tags: &[TagId], claimant: &str) -> SimResult<()> {
        for (i, tag) in tags.iter().enumerate() {
            let owner = self
                .claimed
                .get(tag)
                .map(String::as_str)
                .or_else(|| tags[..i].contains(tag).then_some(claimant));
            if let Some(owner) = owner {
                return Err(SimError::DuplicateTag {
                    tag: tag.clone(),
                    owner: owner.to_string(),
                    claimant: claimant.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn storage(&self) -> Option<&StorageModule> {
        self.storage.as_ref()
    }

    pub fn storage_mut(&mut self) -> Option<&mut StorageModule> {
        self.storage.as_mut()
    }

    /// Standalone sensor by tag.
    pub fn sensor(&self, tag: &TagId) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.tag() == tag)
    }

    /// Standalone sensor by tag, for the code that moves workpieces past it.
    pub fn sensor_mut(&mut self, tag: &TagId) -> Option<&mut Sensor> {
        self.sensors.iter_mut().find(|s| s.tag() == tag)
    }

    /// Any sensor, standalone or element-owned, by tag.
    pub fn find_sensor(&self, tag: &TagId) -> Option<&Sensor> {
        self.sensor(tag).or_else(|| {
            self.elements
                .iter()
                .flat_map(|e| e.sensors())
                .find(|s| s.tag() == tag)
        })
    }

    pub fn elements(&self) -> impl Iterator<Item = &dyn Updateable> {
        self.elements.iter().map(|e| e.as_ref())
    }

    pub fn element_states(&self) -> Vec<ElementState> {
        self.elements.iter().map(|e| e.state()).collect()
    }

    pub fn state_of(&self, name: &str) -> Option<ElementState> {
        self.elements
            .iter()
            .find(|e| e.name() == name)
            .map(|e| e.state())
    }

    /// Actuator tags read each tick, in registration order.
    pub fn actuator_tags(&self) -> &[TagId] {
        &self.actuator_tags
    }

    /// Run one tick against the tag interface.
    pub fn tick<T: TagInterface + ?Sized>(&mut self, tags: &mut T) -> TickReport {
        let started = Instant::now();
        self.tick += 1;
        let tick = self.tick;

        let snapshot = self.read_actuators(tags);

        let mut ctx = TickContext::new(tick, &snapshot);
        for element in &mut self.elements {
            element.update(&mut ctx);
        }
        let mut diagnostics = ctx.into_diagnostics();

        let sensors_published = self.publish_sensors(tags, tick, &mut diagnostics);

        let report = TickReport {
            tick,
            diagnostics,
            actuators_read: snapshot.len(),
            failed_reads: snapshot.failed_reads(),
            sensors_published,
            elapsed: started.elapsed(),
        };
        debug!(
            tick,
            published = report.sensors_published,
            diagnostics = report.diagnostics.len(),
            "tick complete"
        );
        report
    }

    /// Run `count` ticks back to back, without waiting for the period.
    pub fn run_ticks<T: TagInterface + ?Sized>(
        &mut self,
        tags: &mut T,
        count: usize,
    ) -> Vec<TickReport> {
        (0..count).map(|_| self.tick(tags)).collect()
    }

    fn read_actuators<T: TagInterface + ?Sized>(&self, tags: &mut T) -> ActuatorSnapshot {
        let mut snapshot = ActuatorSnapshot::new();
        for tag in &self.actuator_tags {
            snapshot.insert(tag.clone(), tags.read(tag));
        }
        snapshot
    }

    fn publish_sensors<T: TagInterface + ?Sized>(
        &mut self,
        tags: &mut T,
        tick: u64,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> usize {
        let mut published = 0;
        let element_sensors = self.elements.iter_mut().flat_map(|e| e.sensors_mut());
        for sensor in element_sensors.chain(self.sensors.iter_mut()) {
            let Some(value) = sensor.pending() else {
                continue;
            };
            match tags.write(sensor.tag(), value) {
                Ok(()) => {
                    sensor.mark_published(value);
                    published += 1;
                }
                Err(error) => {
                    let diagnostic = Diagnostic::SensorWriteFailed {
                        tick,
                        tag: sensor.tag().clone(),
                        value,
                        error,
                    };
                    warn!(tick, "{diagnostic}");
                    diagnostics.push(diagnostic);
                }
            }
        }
        published
    }

    /// Reset every element, every standalone sensor and the storage module.
    ///
    /// Reset values are published by the next tick.
    pub fn reset(&mut self) {
        for element in &mut self.elements {
            element.reset();
        }
        for sensor in &mut self.sensors {
            sensor.reset();
        }
        if let Some(storage) = &mut self.storage {
            storage.reset();
        }
        info!(tick = self.tick, "simulation reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_core::SharedTagTable;
    use pw_elements::{Actuator, Conveyor, TravelConfig, Turntable, TurntableTags};

    fn turntable(name: &str, prefix: &str) -> Turntable {
        Turntable::new(
            name,
            TravelConfig::new(75, 5, 40).unwrap(),
            TurntableTags {
                turn_clockwise: format!("{prefix}_CW").into(),
                turn_counter_clockwise: format!("{prefix}_CCW").into(),
                horizontal_sensor: format!("{prefix}_H").into(),
                vertical_sensor: format!("{prefix}_V").into(),
                conveyor_left: Some(format!("{prefix}_BELT").into()),
                conveyor_right: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn zero_period_rejected() {
        assert!(matches!(
            Simulation::new(0),
            Err(SimError::InvalidArg { .. })
        ));
    }

    #[test]
    fn duplicate_tag_across_elements_rejected() {
        let mut sim = Simulation::new(10).unwrap();
        sim.add_updateable(turntable("t1", "T")).unwrap();
        let err = sim.add_updateable(turntable("t2", "T")).unwrap_err();
        match err {
            SimError::DuplicateTag {
                tag,
                owner,
                claimant,
            } => {
                assert_eq!(tag.as_str(), "T_BELT");
                assert_eq!(owner, "t1");
                assert_eq!(claimant, "t2");
            }
            other => panic!("unexpected error: {other}"),
        }
        // Nothing from the rejected element was registered.
        assert_eq!(sim.elements().count(), 1);
        assert_eq!(sim.actuator_tags().len(), 3);
    }

    #[test]
    fn duplicate_tag_within_one_element_rejected() {
        let mut sim = Simulation::new(10).unwrap();
        let conveyor =
            Conveyor::new("loop", Actuator::new("X"), Actuator::new("X"), 100).unwrap();
        assert!(matches!(
            sim.add_updateable(conveyor),
            Err(SimError::DuplicateTag { .. })
        ));
    }

    #[test]
    fn duplicate_element_name_rejected() {
        let mut sim = Simulation::new(10).unwrap();
        sim.add_updateable(turntable("t", "A")).unwrap();
        assert!(matches!(
            sim.add_updateable(turntable("t", "B")),
            Err(SimError::DuplicateElement { .. })
        ));
    }

    #[test]
    fn standalone_sensor_must_match_and_be_unique() {
        let mut sim = Simulation::new(10).unwrap();
        sim.add_updateable(turntable("t", "A")).unwrap();

        assert!(matches!(
            sim.add_sensor("B1_S06".into(), Sensor::new("B1_S07")),
            Err(SimError::SensorTagMismatch { .. })
        ));
        assert!(matches!(
            sim.add_sensor("A_V".into(), Sensor::new("A_V")),
            Err(SimError::DuplicateTag { .. })
        ));
        sim.add_sensor("B1_S06".into(), Sensor::new("B1_S06")).unwrap();
        assert!(sim.sensor(&"B1_S06".into()).is_some());
        assert!(sim.find_sensor(&"A_H".into()).is_some());
    }

    #[test]
    fn first_tick_publishes_every_sensor_then_only_changes() {
        let mut sim = Simulation::new(10).unwrap();
        sim.add_updateable(turntable("t", "A")).unwrap();
        sim.add_sensor("B1_S06".into(), Sensor::with_initial("B1_S06", true))
            .unwrap();
        let mut tags = SharedTagTable::new();

        let first = sim.tick(&mut tags);
        assert_eq!(first.tick, 1);
        assert_eq!(first.actuators_read, 3);
        assert_eq!(first.sensors_published, 3);
        assert_eq!(tags.get(&"B1_S06".into()), Some(true));
        assert_eq!(tags.get(&"A_V".into()), Some(false));

        let second = sim.tick(&mut tags);
        assert_eq!(second.sensors_published, 0);
        assert!(second.is_clean());
    }

    #[test]
    fn failed_write_is_retried_next_tick() {
        let mut sim = Simulation::new(10).unwrap();
        sim.add_sensor("B1_S06".into(), Sensor::with_initial("B1_S06", true))
            .unwrap();
        let mut tags = SharedTagTable::new();
        tags.fail_next_write("B1_S06");

        let first = sim.tick(&mut tags);
        assert_eq!(first.io_failures().count(), 1);
        assert_eq!(tags.get(&"B1_S06".into()), None);

        let second = sim.tick(&mut tags);
        assert_eq!(second.sensors_published, 1);
        assert_eq!(tags.get(&"B1_S06".into()), Some(true));
    }

    #[test]
    fn reset_restores_elements_sensors_and_storage() {
        let mut sim = Simulation::new(10).unwrap();
        sim.add_updateable(turntable("t", "A")).unwrap();
        sim.add_sensor("B1_S01".into(), Sensor::new("B1_S01")).unwrap();
        sim.set_storage_module(StorageModule::new(4).unwrap());
        let mut tags = SharedTagTable::new();
        tags.set("A_CW", true);
        sim.run_ticks(&mut tags, 3);
        if let Some(light_barrier) = sim.sensor_mut(&"B1_S01".into()) {
            light_barrier.activate();
        }
        if let Some(storage) = sim.storage_mut() {
            storage.store("red").unwrap();
        }

        sim.reset();

        assert!(matches!(
            sim.state_of("t"),
            Some(ElementState::Turntable { position: 40, .. })
        ));
        assert!(sim.sensor(&"B1_S01".into()).is_some_and(|s| !s.is_on()));
        assert_eq!(sim.storage().map(StorageModule::occupied), Some(0));
        assert_eq!(sim.tick_count(), 3);
    }
}
