//! Plant layout schema definitions.

use serde::{Deserialize, Serialize};

/// Schema version understood by this crate.
pub const PLANT_VERSION: u32 = 1;

/// Default tick period of the plant simulation.
pub const DEFAULT_TICK_PERIOD_MS: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlantDef {
    pub version: u32,
    pub name: String,
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
    /// Sensors owned by the engine (light barriers, switches).
    #[serde(default)]
    pub sensors: Vec<SensorDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageDef>,
    #[serde(default)]
    pub conveyors: Vec<ConveyorDef>,
    #[serde(default)]
    pub gates: Vec<GateDef>,
    #[serde(default)]
    pub turntables: Vec<TurntableDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SensorDef {
    pub tag: String,
    #[serde(default)]
    pub initial: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageDef {
    #[serde(default = "default_storage_capacity")]
    pub capacity: usize,
}

/// Conveyor belt. A missing direction tag leaves that direction unassigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConveyorDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    pub length: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateDef {
    pub name: String,
    pub left: GateDoorDef,
    pub right: GateDoorDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateDoorDef {
    pub open: String,
    pub close: String,
    pub open_sensor: String,
    pub closed_sensor: String,
    pub distance: u32,
    #[serde(default = "default_step_size")]
    pub step_size: u32,
    /// Report the leaf as closed before the first tick.
    #[serde(default = "default_true")]
    pub closed_at_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurntableDef {
    pub name: String,
    pub diameter: u32,
    #[serde(default = "default_step_size")]
    pub step_size: u32,
    #[serde(default = "default_turntable_reset")]
    pub reset_position: u32,
    pub turn_clockwise: String,
    pub turn_counter_clockwise: String,
    pub horizontal_sensor: String,
    pub vertical_sensor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conveyor_left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conveyor_right: Option<String>,
}

fn default_tick_period_ms() -> u64 {
    DEFAULT_TICK_PERIOD_MS
}

fn default_storage_capacity() -> usize {
    pw_elements::storage::DEFAULT_CAPACITY
}

fn default_step_size() -> u32 {
    1
}

fn default_turntable_reset() -> u32 {
    pw_elements::turntable::DEFAULT_RESET_POSITION
}

fn default_true() -> bool {
    true
}

impl PlantDef {
    /// Number of elements the plant registers with the engine.
    pub fn element_count(&self) -> usize {
        self.conveyors.len() + self.gates.len() + self.turntables.len()
    }
}
