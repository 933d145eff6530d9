//! Plant layout validation.
//!
//! Everything the engine would reject at registration is caught here first, with
//! the offending field named, so a bad layout file never half-builds a simulation.

use std::collections::{HashMap, HashSet};

use pw_core::{PwError, TagId};

use crate::schema::{
    ConveyorDef, GateDef, GateDoorDef, PLANT_VERSION, PlantDef, StorageDef, TurntableDef,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Duplicate tag: {tag} used by {first} and {second}")]
    DuplicateTag {
        tag: String,
        first: String,
        second: String,
    },

    #[error("Invalid tag: {field} = '{value}' ({reason})")]
    InvalidTag {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

/// Parse a tag name from a layout file, naming the field on failure.
pub(crate) fn parse_tag(field: &str, value: &str) -> Result<TagId, ValidationError> {
    TagId::parse(value).map_err(|PwError::InvalidTagName { reason, .. }| {
        ValidationError::InvalidTag {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    })
}

/// Tracks which field claimed each tag.
#[derive(Default)]
struct TagClaims {
    owners: HashMap<TagId, String>,
}

impl TagClaims {
    fn claim(&mut self, field: String, value: &str) -> Result<(), ValidationError> {
        let tag = parse_tag(&field, value)?;
        if let Some(first) = self.owners.get(&tag) {
            return Err(ValidationError::DuplicateTag {
                tag: tag.to_string(),
                first: first.clone(),
                second: field,
            });
        }
        self.owners.insert(tag, field);
        Ok(())
    }

    fn claim_optional(&mut self, field: String, value: Option<&str>) -> Result<(), ValidationError> {
        match value {
            Some(value) => self.claim(field, value),
            None => Ok(()),
        }
    }
}

fn positive(field: String, value: u64) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::InvalidValue {
            field,
            value: value.to_string(),
            reason: "must be positive".to_string(),
        });
    }
    Ok(())
}

pub fn validate_plant(plant: &PlantDef) -> Result<(), ValidationError> {
    if plant.version != PLANT_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: plant.version,
        });
    }
    positive("tick_period_ms".to_string(), plant.tick_period_ms)?;

    let mut claims = TagClaims::default();
    for sensor in &plant.sensors {
        claims.claim(format!("sensor '{}'", sensor.tag), &sensor.tag)?;
    }

    if let Some(storage) = &plant.storage {
        validate_storage(storage)?;
    }

    let mut names = HashSet::new();
    let element_names = plant
        .conveyors
        .iter()
        .map(|c| &c.name)
        .chain(plant.gates.iter().map(|g| &g.name))
        .chain(plant.turntables.iter().map(|t| &t.name));
    for name in element_names {
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "element name".to_string(),
                value: format!("'{name}'"),
                reason: "must not be empty".to_string(),
            });
        }
        if !names.insert(name) {
            return Err(ValidationError::DuplicateName {
                name: name.clone(),
                context: "elements".to_string(),
            });
        }
    }

    for conveyor in &plant.conveyors {
        validate_conveyor(conveyor, &mut claims)?;
    }
    for gate in &plant.gates {
        validate_gate(gate, &mut claims)?;
    }
    for turntable in &plant.turntables {
        validate_turntable(turntable, &mut claims)?;
    }

    Ok(())
}

fn validate_storage(storage: &StorageDef) -> Result<(), ValidationError> {
    positive("storage capacity".to_string(), storage.capacity as u64)
}

fn validate_conveyor(conveyor: &ConveyorDef, claims: &mut TagClaims) -> Result<(), ValidationError> {
    let name = &conveyor.name;
    positive(format!("conveyor '{name}' length"), conveyor.length.into())?;
    claims.claim_optional(format!("conveyor '{name}' left"), conveyor.left.as_deref())?;
    claims.claim_optional(format!("conveyor '{name}' right"), conveyor.right.as_deref())?;
    Ok(())
}

fn validate_gate(gate: &GateDef, claims: &mut TagClaims) -> Result<(), ValidationError> {
    validate_door(&format!("gate '{}' left", gate.name), &gate.left, claims)?;
    validate_door(&format!("gate '{}' right", gate.name), &gate.right, claims)
}

fn validate_door(
    context: &str,
    door: &GateDoorDef,
    claims: &mut TagClaims,
) -> Result<(), ValidationError> {
    positive(format!("{context} distance"), door.distance.into())?;
    positive(format!("{context} step_size"), door.step_size.into())?;
    claims.claim(format!("{context} open"), &door.open)?;
    claims.claim(format!("{context} close"), &door.close)?;
    claims.claim(format!("{context} open_sensor"), &door.open_sensor)?;
    claims.claim(format!("{context} closed_sensor"), &door.closed_sensor)
}

fn validate_turntable(
    turntable: &TurntableDef,
    claims: &mut TagClaims,
) -> Result<(), ValidationError> {
    let context = format!("turntable '{}'", turntable.name);
    positive(format!("{context} diameter"), turntable.diameter.into())?;
    positive(format!("{context} step_size"), turntable.step_size.into())?;
    if turntable.reset_position > turntable.diameter {
        return Err(ValidationError::InvalidValue {
            field: format!("{context} reset_position"),
            value: turntable.reset_position.to_string(),
            reason: format!("must lie within [0, {}]", turntable.diameter),
        });
    }

    claims.claim(format!("{context} turn_clockwise"), &turntable.turn_clockwise)?;
    claims.claim(
        format!("{context} turn_counter_clockwise"),
        &turntable.turn_counter_clockwise,
    )?;
    claims.claim(format!("{context} horizontal_sensor"), &turntable.horizontal_sensor)?;
    claims.claim(format!("{context} vertical_sensor"), &turntable.vertical_sensor)?;
    claims.claim_optional(
        format!("{context} conveyor_left"),
        turntable.conveyor_left.as_deref(),
    )?;
    claims.claim_optional(
        format!("{context} conveyor_right"),
        turntable.conveyor_right.as_deref(),
    )
}
