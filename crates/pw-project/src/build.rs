//! Turn a validated plant layout into a ready-to-tick [`Simulation`].

use pw_elements::{
    Actuator, Conveyor, Gate, GateDoor, GateDoorTags, Sensor, StorageModule, TravelConfig,
    Turntable, TurntableTags,
};
use pw_sim::Simulation;
use tracing::info;

use crate::schema::{ConveyorDef, GateDef, GateDoorDef, PlantDef, TurntableDef};
use crate::validate::{parse_tag, validate_plant};
use crate::ProjectResult;

/// Build the simulation described by `plant`.
///
/// Elements are registered conveyors first, then gates, then turntables, each in
/// file order; that is also their update order within a tick.
///
/// # Errors
///
/// Returns error if the layout does not validate or the engine rejects an element.
pub fn build_simulation(plant: &PlantDef) -> ProjectResult<Simulation> {
    validate_plant(plant)?;

    let mut sim = Simulation::new(plant.tick_period_ms)?;
    for def in &plant.sensors {
        let tag = parse_tag("sensor", &def.tag)?;
        sim.add_sensor(tag.clone(), Sensor::with_initial(tag, def.initial))?;
    }
    if let Some(storage) = &plant.storage {
        sim.set_storage_module(StorageModule::new(storage.capacity)?);
    }

    for def in &plant.conveyors {
        sim.add_updateable(build_conveyor(def)?)?;
    }
    for def in &plant.gates {
        sim.add_updateable(build_gate(def)?)?;
    }
    for def in &plant.turntables {
        sim.add_updateable(build_turntable(def)?)?;
    }

    info!(
        plant = %plant.name,
        elements = plant.element_count(),
        sensors = plant.sensors.len(),
        tick_period_ms = plant.tick_period_ms,
        "plant simulation built"
    );
    Ok(sim)
}

fn optional_actuator(field: &str, tag: Option<&str>) -> ProjectResult<Actuator> {
    let tag = tag.map(|t| parse_tag(field, t)).transpose()?;
    Ok(Actuator::from_optional(tag))
}

fn build_conveyor(def: &ConveyorDef) -> ProjectResult<Conveyor> {
    Ok(Conveyor::new(
        def.name.clone(),
        optional_actuator("left", def.left.as_deref())?,
        optional_actuator("right", def.right.as_deref())?,
        def.length,
    )?)
}

fn build_door(name: String, def: &GateDoorDef) -> ProjectResult<GateDoor> {
    let tags = GateDoorTags {
        open: parse_tag("open", &def.open)?,
        close: parse_tag("close", &def.close)?,
        open_sensor: parse_tag("open_sensor", &def.open_sensor)?,
        closed_sensor: parse_tag("closed_sensor", &def.closed_sensor)?,
    };
    let mut door = GateDoor::new(name, TravelConfig::new(def.distance, def.step_size, 0)?, tags);
    // Only the starting value: a reset brings the sensor back to off.
    if def.closed_at_start {
        door.closed_sensor_mut().activate();
    }
    Ok(door)
}

fn build_gate(def: &GateDef) -> ProjectResult<Gate> {
    let left = build_door(format!("{}.left", def.name), &def.left)?;
    let right = build_door(format!("{}.right", def.name), &def.right)?;
    Ok(Gate::new(def.name.clone(), left, right))
}

fn build_turntable(def: &TurntableDef) -> ProjectResult<Turntable> {
    let travel = TravelConfig::new(def.diameter, def.step_size, def.reset_position)?;
    let tags = TurntableTags {
        turn_clockwise: parse_tag("turn_clockwise", &def.turn_clockwise)?,
        turn_counter_clockwise: parse_tag("turn_counter_clockwise", &def.turn_counter_clockwise)?,
        horizontal_sensor: parse_tag("horizontal_sensor", &def.horizontal_sensor)?,
        vertical_sensor: parse_tag("vertical_sensor", &def.vertical_sensor)?,
        conveyor_left: def
            .conveyor_left
            .as_deref()
            .map(|t| parse_tag("conveyor_left", t))
            .transpose()?,
        conveyor_right: def
            .conveyor_right
            .as_deref()
            .map(|t| parse_tag("conveyor_right", t))
            .transpose()?,
    };
    Ok(Turntable::new(def.name.clone(), travel, tags)?)
}
