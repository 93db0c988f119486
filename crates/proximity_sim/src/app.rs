//! Main application logic and lifecycle management.
//!
//! The `Application` owns the grid and the swarm and drives them from a fixed
//! tick interval: step the swarm, rebuild the grid from the fresh snapshot,
//! then issue a batch of read-only queries against it.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    shutdown::ShutdownState,
    signals::setup_signal_handlers,
    swarm::Swarm,
};
use proximity_grid::{EntityId, GridStats, ProximityGrid, QueryScratch, RebuildSummary};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Outcome of a single simulation tick.
#[derive(Debug, Clone, Copy)]
pub struct TickReport {
    /// 1-based tick number
    pub tick: u64,
    /// Result of this tick's rebuild
    pub rebuild: RebuildSummary,
    /// Sphere queries issued this tick
    pub sphere_queries: usize,
    /// Box queries issued this tick
    pub box_queries: usize,
    /// Total entities returned across all queries
    pub hits: usize,
}

/// Tick-loop driver around a [`ProximityGrid`].
pub struct Application {
    config: AppConfig,
    grid: ProximityGrid<EntityId>,
    swarm: Swarm,
    scratch: QueryScratch<EntityId>,
    ticks: u64,
    total_hits: u64,
}

impl Application {
    /// Loads configuration, applies CLI overrides and builds the application.
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;
        info!("✅ Configuration loaded successfully from {}", args.config_path.display());

        apply_overrides(&mut config, &args);

        display_banner();
        Self::from_config(config)
    }

    /// Builds the application from an already assembled configuration.
    pub fn from_config(mut config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration validated successfully");

        let sim = &config.simulation;
        config.grid.expected_objects = config.grid.expected_objects.max(sim.object_count);

        let grid = ProximityGrid::from_settings(&config.grid)?;
        let swarm = Swarm::new(
            sim.object_count,
            &config.grid.world_bounds,
            sim.stray_margin,
            sim.max_speed,
            sim.seed,
        );
        let scratch = QueryScratch::with_capacity(sim.object_count.min(4096));

        Ok(Self {
            config,
            grid,
            swarm,
            scratch,
            ticks: 0,
            total_hits: 0,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn grid(&self) -> &ProximityGrid<EntityId> {
        &self.grid
    }

    /// Runs one tick: move the swarm, rebuild, then query.
    ///
    /// Queries alternate between spheres and boxes, each centred on a
    /// randomly chosen agent.
    pub fn tick(&mut self, delta_seconds: f64) -> TickReport {
        self.ticks += 1;
        self.swarm.step(delta_seconds);

        let snapshot = self.swarm.snapshot();
        let rebuild = self.grid.rebuild(snapshot);

        let sim = &self.config.simulation;
        let mut report = TickReport {
            tick: self.ticks,
            rebuild,
            sphere_queries: 0,
            box_queries: 0,
            hits: 0,
        };

        for query in 0..sim.queries_per_tick {
            let Some(center) = self.swarm.probe() else {
                break;
            };
            let hits = if query % 2 == 0 {
                report.sphere_queries += 1;
                self.grid
                    .query_sphere_into(center, sim.query_radius, &mut self.scratch)
                    .len()
            } else {
                report.box_queries += 1;
                self.grid
                    .query_box_into(center, sim.box_half_extents, &mut self.scratch)
                    .len()
            };
            report.hits += hits;
        }
        self.total_hits += report.hits as u64;

        debug!(
            tick = report.tick,
            indexed = report.rebuild.indexed,
            rebuild_us = report.rebuild.elapsed.as_micros() as u64,
            hits = report.hits,
            "tick complete"
        );
        report
    }

    /// Runs the tick loop until `max_ticks` is reached or a shutdown signal
    /// arrives, then reports final statistics and releases the grid.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting proximity simulation");
        self.log_configuration_summary();

        let shutdown_state = ShutdownState::new();
        let signal_handle = {
            let shutdown_state = shutdown_state.clone();
            tokio::spawn(async move {
                if let Err(e) = setup_signal_handlers(shutdown_state).await {
                    error!("❌ Failed to install signal handlers: {e}");
                }
            })
        };

        let tick_interval = Duration::from_millis(self.config.simulation.tick_interval_ms);
        let delta_seconds = tick_interval.as_secs_f64();
        let max_ticks = self.config.simulation.max_ticks;
        let stats_every = self.config.simulation.stats_interval_ticks;

        let mut interval = tokio::time::interval(tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!("✅ Simulation is now running!");
        if max_ticks == 0 {
            info!("🛑 Press Ctrl+C to gracefully shutdown");
        } else {
            info!("⏱️ Running for {} ticks", max_ticks);
        }

        let mut last_queries = 0u64;
        loop {
            interval.tick().await;
            if shutdown_state.is_shutdown_initiated() {
                break;
            }
            if max_ticks > 0 && self.ticks >= max_ticks {
                shutdown_state.initiate_shutdown();
                break;
            }

            let report = self.tick(delta_seconds);
            if report.rebuild.elapsed > tick_interval {
                warn!(
                    "🐢 Rebuild took {:?}, longer than the {:?} tick interval",
                    report.rebuild.elapsed, tick_interval
                );
            }

            if report.tick % stats_every == 0 {
                let stats = self.grid.stats();
                let queries = stats.total_queries - last_queries;
                last_queries = stats.total_queries;
                info!(
                    "📊 Tick {} - {} objects in {}/{} cells | {:.1} per cell | rebuild {}µs | {} queries since last report",
                    report.tick,
                    stats.objects_indexed,
                    stats.occupied_cells,
                    stats.total_cells,
                    stats.avg_objects_per_cell,
                    stats.last_rebuild_us,
                    queries
                );
            }
        }

        signal_handle.abort();
        info!("🛑 Tick loop stopped after {} ticks", self.ticks);

        log_final_statistics(&self.grid.stats(), self.ticks, self.total_hits);
        self.grid.dispose();
        shutdown_state.complete_shutdown();

        info!("✅ Proximity simulation shutdown complete");
        Ok(())
    }

    fn log_configuration_summary(&self) {
        let grid = self.grid.config();
        let dims = grid.dims();
        let sim = &self.config.simulation;
        info!("📋 Configuration Summary:");
        info!("  🗺️ Grid: {}x{}x{} cells of {} units", dims[0], dims[1], dims[2], grid.cell_size());
        info!("  🧭 Disabled axes: {:?}", grid.disabled_axes());
        match grid.worker_threads() {
            Some(threads) => info!("  🧵 Rebuild workers: {} (batch {})", threads, grid.batch_size()),
            None => info!("  🧵 Rebuild workers: global pool (batch {})", grid.batch_size()),
        }
        info!("  👥 Entities: {} (speed {} u/s, stray margin {})", sim.object_count, sim.max_speed, sim.stray_margin);
        info!("  ⏱️ Tick interval: {}ms", sim.tick_interval_ms);
        info!(
            "  🔍 Queries per tick: {} (radius {}, box ±{:?})",
            sim.queries_per_tick, sim.query_radius, sim.box_half_extents
        );
    }
}

/// Applies command-line overrides on top of the loaded configuration.
pub fn apply_overrides(config: &mut AppConfig, args: &CliArgs) {
    if let Some(objects) = args.objects {
        config.simulation.object_count = objects;
    }
    if let Some(ticks) = args.ticks {
        config.simulation.max_ticks = ticks;
    }
    if let Some(workers) = args.workers {
        config.grid.worker_threads = Some(workers);
    }
    if let Some(log_level) = &args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
}

fn log_final_statistics(stats: &GridStats, ticks: u64, total_hits: u64) {
    info!("📊 Final Statistics:");
    info!("  - Ticks run: {}", ticks);
    info!("  - Rebuilds: {}", stats.total_rebuilds);
    info!("  - Queries answered: {}", stats.total_queries);
    info!("  - Entities returned: {}", total_hits);
    info!("  - Objects skipped (non-finite): {}", stats.total_objects_skipped);
    info!("  - Last rebuild: {}µs", stats.last_rebuild_us);
}
