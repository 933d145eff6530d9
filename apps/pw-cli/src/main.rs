use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use pw_core::{PwError, SharedTagTable, TagId};
use pw_elements::ElementState;
use pw_project::{PlantDef, ProjectError};
use pw_sim::{SimError, Simulation, TickReport, TickRunner};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "pw-cli")]
#[command(about = "plantwin CLI - Digital twin of a sorting plant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a plant layout file
    Validate {
        /// Path to the plant YAML file (defaults to the bundled plant)
        plant_path: Option<PathBuf>,
    },
    /// List elements and the tags they use
    Describe {
        /// Path to the plant YAML file (defaults to the bundled plant)
        plant_path: Option<PathBuf>,
    },
    /// Run the plant against an in-memory tag table
    Run {
        /// Path to the plant YAML file (defaults to the bundled plant)
        plant_path: Option<PathBuf>,
        /// Number of ticks to run
        #[arg(long, default_value_t = 10)]
        ticks: usize,
        /// Actuator command held for the whole run, e.g. B1_A22=1
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(TagId, bool)>,
        /// Tick on a background thread at the plant's tick period
        #[arg(long)]
        realtime: bool,
        /// Print final element states and tags as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tick thread stopped after {received} of {expected} ticks")]
    RunnerStopped { received: usize, expected: usize },
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { plant_path } => cmd_validate(plant_path.as_deref()),
        Commands::Describe { plant_path } => cmd_describe(plant_path.as_deref()),
        Commands::Run {
            plant_path,
            ticks,
            set,
            realtime,
            json,
        } => cmd_run(plant_path.as_deref(), ticks, &set, realtime, json),
    }
}

fn parse_assignment(arg: &str) -> Result<(TagId, bool), String> {
    let (tag, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=VALUE, got '{arg}'"))?;
    let tag: TagId = tag.parse().map_err(|e: PwError| e.to_string())?;
    let value = match value.trim() {
        "1" | "true" | "on" => true,
        "0" | "false" | "off" => false,
        other => return Err(format!("expected 0/1, true/false or on/off, got '{other}'")),
    };
    Ok((tag, value))
}

fn load_plant(plant_path: Option<&Path>) -> CliResult<PlantDef> {
    let plant = match plant_path {
        Some(path) => pw_project::load_yaml(path)?,
        None => pw_project::default_plant()?,
    };
    Ok(plant)
}

fn plant_label(plant_path: Option<&Path>) -> String {
    plant_path.map_or_else(|| "<bundled>".to_string(), |p| p.display().to_string())
}

fn cmd_validate(plant_path: Option<&Path>) -> CliResult<()> {
    println!("Validating plant: {}", plant_label(plant_path));
    let plant = load_plant(plant_path)?;
    pw_project::build_simulation(&plant)?;
    println!("✓ Plant '{}' is valid", plant.name);
    Ok(())
}

fn cmd_describe(plant_path: Option<&Path>) -> CliResult<()> {
    let plant = load_plant(plant_path)?;
    let sim = pw_project::build_simulation(&plant)?;

    println!(
        "Plant '{}' ({} ms tick, {} elements)",
        plant.name,
        sim.tick_period().as_millis(),
        plant.element_count()
    );
    for element in sim.elements() {
        let actuators: Vec<&str> = element
            .actuator_tags()
            .into_iter()
            .map(TagId::as_str)
            .collect();
        let sensors: Vec<&str> = element
            .sensors()
            .into_iter()
            .map(|s| s.tag().as_str())
            .collect();
        println!("  {}", element.name());
        println!("    actuators: {}", actuators.join(", "));
        if !sensors.is_empty() {
            println!("    sensors:   {}", sensors.join(", "));
        }
    }
    if !plant.sensors.is_empty() {
        let tags: Vec<&str> = plant.sensors.iter().map(|s| s.tag.as_str()).collect();
        println!("  standalone sensors: {}", tags.join(", "));
    }
    if let Some(storage) = sim.storage() {
        println!("  storage: {} slots", storage.capacity());
    }
    Ok(())
}

#[derive(Serialize)]
struct RunOutput {
    ticks: u64,
    conflicts: usize,
    io_failures: usize,
    elements: Vec<ElementState>,
    tags: BTreeMap<TagId, bool>,
}

fn cmd_run(
    plant_path: Option<&Path>,
    ticks: usize,
    set: &[(TagId, bool)],
    realtime: bool,
    json: bool,
) -> CliResult<()> {
    let plant = load_plant(plant_path)?;
    let sim = pw_project::build_simulation(&plant)?;
    let controller = SharedTagTable::new();
    for (tag, value) in set {
        controller.set(tag.clone(), *value);
    }

    let (sim, reports) = if realtime {
        run_realtime(sim, &controller, ticks)?
    } else {
        let mut sim = sim;
        let mut io = controller.clone();
        let reports = sim.run_ticks(&mut io, ticks);
        (sim, reports)
    };

    let output = RunOutput {
        ticks: sim.tick_count(),
        conflicts: reports.iter().map(|r| r.conflicts().count()).sum(),
        io_failures: reports.iter().map(|r| r.io_failures().count()).sum(),
        elements: sim.element_states(),
        tags: controller.snapshot(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Ran '{}' for {} ticks", plant.name, output.ticks);
    for report in &reports {
        for diagnostic in &report.diagnostics {
            println!("  ! {diagnostic}");
        }
    }
    for state in &output.elements {
        println!("  {}", describe_state(state));
    }
    println!("Tags:");
    for (tag, value) in &output.tags {
        println!("  {tag:<8} {}", u8::from(*value));
    }
    Ok(())
}

fn run_realtime(
    sim: Simulation,
    controller: &SharedTagTable,
    ticks: usize,
) -> CliResult<(Simulation, Vec<TickReport>)> {
    let timeout = sim.tick_period() * 10 + Duration::from_secs(1);
    let runner = TickRunner::spawn(sim, controller.clone())?;
    let mut reports = Vec::with_capacity(ticks);
    while reports.len() < ticks {
        match runner.reports().recv_timeout(timeout) {
            Ok(report) => reports.push(report),
            Err(_) => {
                return Err(CliError::RunnerStopped {
                    received: reports.len(),
                    expected: ticks,
                });
            }
        }
    }
    let summary = runner.stop()?;
    tracing::info!(
        ticks = summary.stats.ticks,
        overruns = summary.stats.overruns,
        avg_ms = summary.stats.average().as_secs_f64() * 1e3,
        dropped_reports = summary.dropped_reports,
        "tick thread summary"
    );
    Ok((summary.simulation, reports))
}

fn describe_state(state: &ElementState) -> String {
    match state {
        ElementState::Conveyor { name, belt, .. } => format!("{name}: belt {belt:?}"),
        ElementState::Gate { name, left, right } => format!(
            "{name}: left {}/{} right {}/{}",
            left.position, left.distance, right.position, right.distance
        ),
        ElementState::Turntable {
            name,
            position,
            distance,
            horizontal,
            vertical,
            conveyor,
        } => format!(
            "{name}: {position}/{distance} (horizontal={horizontal}, vertical={vertical}), belt {conveyor:?}"
        ),
    }
}
