//! # Proximity Simulator
//!
//! Drives a [`proximity_grid::ProximityGrid`] the way a game server tick loop
//! would: a swarm of wandering entities is snapshotted every tick, the grid is
//! rebuilt from the snapshot, and a batch of sphere and box queries is issued
//! against it before the next tick.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with default configuration (creates proximity.toml if missing)
//! proximity-sim
//!
//! # 50k entities for 600 ticks on 8 dedicated rebuild workers
//! proximity-sim --objects 50000 --ticks 600 --workers 8
//!
//! # JSON logging
//! proximity-sim --json-logs --log-level debug
//! ```
//!
//! ## Signal Handling
//!
//! With `max_ticks = 0` the loop runs until SIGINT (Ctrl+C) or SIGTERM, then
//! reports final statistics and releases the grid.

use tracing::error;

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod shutdown;
pub mod signals;
pub mod swarm;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Entry point used by the `proximity-sim` binary.
///
/// Parses the command line, sets up logging from the configuration file (with
/// CLI overrides applied) and runs the application until it stops.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();
    app::apply_overrides(&mut config, &args);

    logging::setup_logging(&config.logging, args.json_logs)
        .map_err(|e| format!("Failed to setup logging: {e}"))?;

    let app = Application::new(args).await.map_err(|e| {
        error!("❌ Failed to start application: {e}");
        e
    })?;

    if let Err(e) = app.run().await {
        error!("❌ Application error: {e}");
        return Err(e);
    }

    Ok(())
}

pub use app::TickReport;
pub use config::{LoggingSettings, SimulationSettings};
pub use shutdown::ShutdownState;
pub use swarm::Swarm;
