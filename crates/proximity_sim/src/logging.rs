//! Logging system setup and configuration.
//!
//! Human-readable or JSON output to stdout, optionally mirrored to a file.

use crate::config::LoggingSettings;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initializes the global tracing subscriber.
///
/// # Arguments
///
/// * `config` - Logging section of the configuration file
/// * `json_format` - CLI override forcing JSON output
///
/// # Returns
///
/// `Ok(())` once the subscriber is installed. Fails if `file_path` cannot be
/// opened for appending or a global subscriber is already set.
///
/// # Features
///
/// * **Environment variable support** - `RUST_LOG` takes precedence over `config.level`
/// * **Flexible formatting** - human-readable or JSON, on stdout and the optional file
/// * **Thread information** - rebuild workers show up as `grid-rebuild-N`
///
/// # Example
///
/// ```rust,no_run
/// use lib_proximity_sim::config::LoggingSettings;
/// use lib_proximity_sim::logging::setup_logging;
///
/// let settings = LoggingSettings {
///     level: "debug".to_string(),
///     json_format: false,
///     file_path: Some("proximity.log".to_string()),
/// };
/// setup_logging(&settings, false)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn setup_logging(
    config: &LoggingSettings,
    json_format: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = config.level.as_str();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));
    let json = json_format || config.json_format;

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    if json {
        layers.push(
            fmt::layer()
                .json()
                .with_file(false)
                .with_line_number(false)
                .with_thread_ids(true)
                .with_thread_names(true)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_ansi(true)
                .with_file(false)
                .with_line_number(false)
                .with_thread_ids(true)
                .with_thread_names(true)
                .boxed(),
        );
    }

    if let Some(path) = &config.file_path {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let writer = Mutex::new(file);
        if json {
            layers.push(fmt::layer().json().with_writer(writer).boxed());
        } else {
            layers.push(fmt::layer().with_ansi(false).with_writer(writer).boxed());
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    info!("🔧 Logging initialized with level: {}", log_level);
    if let Some(path) = &config.file_path {
        info!("📝 Mirroring logs to {}", path);
    }
    Ok(())
}

/// Displays the startup banner.
pub fn display_banner() {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════════════╗");
    info!("║         🗺️  PROXIMITY SIMULATOR           ║");
    info!("║                 v{:<8}                ║", version);
    info!("║                                          ║");
    info!("║  Uniform-grid broad phase                ║");
    info!("║  ⚡ Parallel per-tick rebuild            ║");
    info!("║  🔍 Sphere + box neighbour queries       ║");
    info!("║                                          ║");
    info!("╚══════════════════════════════════════════╝");
}
