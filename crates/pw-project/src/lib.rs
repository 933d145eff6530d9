//! pw-project: plant layout file format, validation and simulation setup.

pub mod build;
pub mod schema;
pub mod validate;

pub use build::build_simulation;
pub use schema::*;
pub use validate::{ValidationError, validate_plant};

/// Layout of the fischertechnik-style sorting plant the simulator was built for.
pub const DEFAULT_PLANT_YAML: &str = include_str!("../plants/ft_plant.yaml");

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Element error: {0}")]
    Element(#[from] pw_elements::ElementError),

    #[error("Simulation error: {0}")]
    Sim(#[from] pw_sim::SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Parse and validate a plant layout from YAML text.
pub fn parse_yaml(content: &str) -> ProjectResult<PlantDef> {
    let plant: PlantDef = serde_yaml::from_str(content)?;
    validate_plant(&plant)?;
    Ok(plant)
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<PlantDef> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content)
}

pub fn save_yaml(path: &std::path::Path, plant: &PlantDef) -> ProjectResult<()> {
    validate_plant(plant)?;
    let content = serde_yaml::to_string(plant)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// The bundled default plant layout.
pub fn default_plant() -> ProjectResult<PlantDef> {
    parse_yaml(DEFAULT_PLANT_YAML)
}
