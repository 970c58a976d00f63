//! Replay driver for the kill bounty engine.
//!
//! Loads `bounty-config.yaml` (or the path given as the second argument),
//! replays a scenario file through a fresh engine, and prints the resulting
//! grant report as JSON on stdout. Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration
//! 2. Initialize structured logging (tracing)
//! 3. Load the scenario
//! 4. Build the engine and replay
//! 5. Print the report

mod error;
mod scenario;

use std::path::{Path, PathBuf};

use bounty_core::config::BountyConfig;
use bounty_core::engine::Engine;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::scenario::Scenario;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "bounty-config.yaml";

/// Application entry point for the replay driver.
///
/// # Errors
///
/// Returns an error if configuration or the scenario cannot be loaded, or the
/// report cannot be written.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args_os().skip(1);
    let scenario_path = PathBuf::from(args.next().ok_or(EngineError::Usage)?);
    let config_path = args.next().map(PathBuf::from);

    // 1. Load configuration.
    let config = load_config(config_path.as_deref())?;

    // 2. Initialize structured logging. RUST_LOG wins over the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        cycle_interval_ms = config.engine.cycle_interval_ms,
        damage_window_seconds = config.engine.damage_window_seconds,
        bounty_key = %config.admission.bounty_key,
        "Configuration loaded"
    );

    // 3. Load the scenario.
    let scenario = Scenario::from_file(&scenario_path)?;
    info!(
        path = %scenario_path.display(),
        entities = scenario.world.entities.len(),
        players = scenario.world.roster.len(),
        events = scenario.events.len(),
        "Scenario loaded"
    );

    // 4. Replay.
    let mut engine = Engine::from_config(&config.engine).map_err(EngineError::from)?;
    let report = scenario::replay(scenario, &mut engine, &config.admission)?;
    info!(
        cycles = report.cycles.len(),
        grants = report.grants.len(),
        awarded = report.grants.iter().map(|g| g.amount).fold(0_i64, i64::saturating_add),
        "Replay complete"
    );

    // 5. Print the report.
    let json = serde_json::to_string_pretty(&report).map_err(EngineError::from)?;
    println!("{json}");
    Ok(())
}

/// Load configuration from `path`, or from `bounty-config.yaml` if present.
///
/// Falls back to defaults when no path is given and the default file does
/// not exist.
fn load_config(path: Option<&Path>) -> Result<BountyConfig, EngineError> {
    if let Some(path) = path {
        return Ok(BountyConfig::from_file(path)?);
    }
    let default_path = Path::new(CONFIG_FILE);
    if default_path.exists() {
        Ok(BountyConfig::from_file(default_path)?)
    } else {
        Ok(BountyConfig::parse("")?)
    }
}
