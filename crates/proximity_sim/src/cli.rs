//! Command-line interface handling for the proximity simulator.
//!
//! Uses `clap` to parse overrides that take precedence over the TOML
//! configuration file.

use clap::{Arg, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Optional override for the number of simulated entities
    pub objects: Option<usize>,
    /// Optional override for the number of ticks to run (0 runs until Ctrl+C)
    pub ticks: Option<u64>,
    /// Optional override for the rebuild worker count
    pub workers: Option<usize>,
}

impl CliArgs {
    /// Parses command line arguments using clap.
    ///
    /// Invalid arguments print usage and exit the process.
    pub fn parse() -> Self {
        let matches = Command::new("Proximity Simulator")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Runs the proximity grid against a synthetic swarm, one rebuild per tick")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("proximity.toml"),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
            .arg(
                Arg::new("objects")
                    .short('n')
                    .long("objects")
                    .value_name("COUNT")
                    .help("Number of simulated entities")
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                Arg::new("ticks")
                    .short('t')
                    .long("ticks")
                    .value_name("COUNT")
                    .help("Ticks to run before exiting (0 runs until interrupted)")
                    .value_parser(clap::value_parser!(u64)),
            )
            .arg(
                Arg::new("workers")
                    .short('w')
                    .long("workers")
                    .value_name("THREADS")
                    .help("Dedicated rebuild worker threads (0 uses the global pool)")
                    .value_parser(clap::value_parser!(usize)),
            )
            .get_matches();

        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("proximity.toml")),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            objects: matches.get_one::<usize>("objects").copied(),
            ticks: matches.get_one::<u64>("ticks").copied(),
            workers: matches.get_one::<usize>("workers").copied(),
        }
    }
}
