//! Configuration management for the proximity simulator.
//!
//! Loads the `[grid]`, `[simulation]` and `[logging]` tables from a TOML file
//! and validates them before the tick loop starts.

use proximity_grid::{GridConfig, GridSettings, Vec3};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

fn default_object_count() -> usize {
    5_000
}
fn default_tick_interval() -> u64 {
    50 // 20 ticks per second
}
fn default_queries_per_tick() -> usize {
    64
}
fn default_query_radius() -> f64 {
    25.0
}
fn default_box_half_extents() -> Vec3 {
    Vec3::new(20.0, 5.0, 20.0)
}
fn default_stats_interval_ticks() -> u64 {
    100
}
fn default_max_speed() -> f64 {
    8.0 // units per second
}
fn default_stray_margin() -> f64 {
    50.0
}
fn default_seed() -> u64 {
    0x5eed
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Proximity grid settings
    #[serde(default)]
    pub grid: GridSettings,
    /// Swarm and tick loop settings
    #[serde(default)]
    pub simulation: SimulationSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Synthetic workload driven through the grid each tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Number of moving entities in the swarm
    #[serde(default = "default_object_count")]
    pub object_count: usize,
    /// Tick interval in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Ticks to run before exiting; 0 runs until a shutdown signal
    #[serde(default)]
    pub max_ticks: u64,
    /// Queries issued after every rebuild, alternating sphere and box
    #[serde(default = "default_queries_per_tick")]
    pub queries_per_tick: usize,
    /// Sphere query radius
    #[serde(default = "default_query_radius")]
    pub query_radius: f64,
    /// Box query half-extents
    #[serde(default = "default_box_half_extents")]
    pub box_half_extents: Vec3,
    /// Ticks between periodic statistics reports
    #[serde(default = "default_stats_interval_ticks")]
    pub stats_interval_ticks: u64,
    /// Entity speed in world units per second
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    /// How far outside the world bounds entities may wander
    #[serde(default = "default_stray_margin")]
    pub stray_margin: f64,
    /// Seed for the swarm's movement
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            object_count: default_object_count(),
            tick_interval_ms: default_tick_interval(),
            max_ticks: 0,
            queries_per_tick: default_queries_per_tick(),
            query_radius: default_query_radius(),
            box_half_extents: default_box_half_extents(),
            stats_interval_ticks: default_stats_interval_ticks(),
            max_speed: default_max_speed(),
            stray_margin: default_stray_margin(),
            seed: default_seed(),
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
    /// Optional file that receives a copy of the log output
    #[serde(default)]
    pub file_path: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file, creating a default one if it
    /// doesn't exist.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// The grid table is checked by building a [`GridConfig`] from it, so
    /// the rules match what the grid itself enforces.
    pub fn validate(&self) -> Result<(), String> {
        GridConfig::from_settings(&self.grid).map_err(|e| format!("Invalid grid settings: {e}"))?;

        let sim = &self.simulation;
        if sim.tick_interval_ms == 0 {
            return Err("simulation.tick_interval_ms must be greater than 0".to_string());
        }
        if sim.stats_interval_ticks == 0 {
            return Err("simulation.stats_interval_ticks must be greater than 0".to_string());
        }
        if !sim.query_radius.is_finite() || sim.query_radius < 0.0 {
            return Err(format!(
                "simulation.query_radius must be a non-negative number, got {}",
                sim.query_radius
            ));
        }
        if !sim.box_half_extents.is_finite() {
            return Err("simulation.box_half_extents must be finite".to_string());
        }
        if !sim.max_speed.is_finite() || sim.max_speed < 0.0 {
            return Err(format!(
                "simulation.max_speed must be a non-negative number, got {}",
                sim.max_speed
            ));
        }
        if !sim.stray_margin.is_finite() || sim.stray_margin < 0.0 {
            return Err(format!(
                "simulation.stray_margin must be a non-negative number, got {}",
                sim.stray_margin
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}
