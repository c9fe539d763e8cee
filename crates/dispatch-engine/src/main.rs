//! Headless dispatch engine.
//!
//! Loads configuration, spawns the roster, and runs the tick loop with the
//! autopilot director until the tick limit is reached, Ctrl-C is
//! pressed, or `stop` is typed. While it runs, `pause`, `resume`,
//! `speed <ms>` and `status` are read from stdin.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the path given as the first argument, or
//!    `dispatch-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the simulation state (catalog, roster, coordinator)
//! 4. Create collaborators: movement, seeded random source, event sink
//! 5. Create run control, hook Ctrl-C to a clean stop, and start the
//!    stdin console
//! 6. Run the simulation loop
//! 7. Log the result

mod autopilot;
mod console;
mod error;
mod movement;
mod report;
mod sink;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dispatch_core::config::{DispatchConfig, LogFormat, LoggingConfig};
use dispatch_core::control::RunControl;
use dispatch_core::random::RngSource;
use dispatch_core::runner;
use dispatch_core::services::Services;
use dispatch_core::tick::SimulationState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::autopilot::AutoDispatcher;
use crate::error::EngineError;
use crate::movement::LinearMovement;
use crate::report::ProgressReport;
use crate::sink::LoggingSink;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "dispatch-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so the outcome is
    //    reported after step 2.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, loaded_from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("dispatch-engine starting");
    if !loaded_from_file {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        seconds_per_tick = config.world.seconds_per_tick,
        agents = config.agents.len(),
        calls = config.calls.len(),
        "Configuration loaded"
    );
    if config.agents.is_empty() || config.calls.is_empty() {
        warn!("No agents or no call definitions configured; nothing will be dispatched");
    }

    // 3. Build the simulation state.
    let mut state = SimulationState::from_config(&config)?;

    // 4. Collaborators.
    let base = config.resolution.base_location;
    let mut movement = LinearMovement::new(base);
    for agent in state.coordinator.roster().iter() {
        movement.place(agent.id(), base);
    }
    let mut random = RngSource::seeded(config.world.seed);
    let mut events = LoggingSink::new();
    let mut director = AutoDispatcher::new(config.spawning.clone(), config.world.seed.wrapping_add(1));
    let mut report = ProgressReport::new();

    // 5. Run control.
    let control = Arc::new(RunControl::new(
        config.world.tick_interval_ms,
        &config.simulation,
    ));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, stopping after the current tick");
                control.request_stop();
            }
        });
    }
    console::spawn_stdin_console(Arc::clone(&control));
    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = control.tick_interval_ms(),
        "Run control initialized, entering tick loop"
    );

    // 6. Run the simulation.
    let mut services = Services::new(&mut movement, &mut random, &mut events);
    let result = runner::run_simulation(
        &mut state,
        &mut director,
        &mut services,
        &control,
        &mut report,
    )
    .await?;

    // 7. Log results.
    runner::log_simulation_end(&result, &state);
    let tally = report.tally();
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        resolved = tally.resolved(),
        success = tally.success,
        partial = tally.partial,
        failure = tally.failure,
        expired = tally.expired,
        events = events.emitted(),
        resolved_events = events.resolved(),
        expired_events = events.expired(),
        still_travelling = movement.travelling(),
        elapsed_seconds = control.elapsed_seconds(),
        "dispatch-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. Returns whether the file was read.
fn load_config(path: &Path) -> Result<(DispatchConfig, bool), EngineError> {
    if path.exists() {
        Ok((DispatchConfig::from_file(path)?, true))
    } else {
        let mut config = DispatchConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = match logging.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}
