//! Command-line front end for the Meridian time-zone database.
//!
//! Loads `meridian-config.yaml` (or the file named by `$MERIDIAN_CONFIG`),
//! builds a [`Resolver`] over the configured data directory, answers one
//! query and prints the answer as JSON on stdout. Logs go to stderr.
//!
//! ```text
//! meridian zone America/New_York 2024-07-04T16:00:00Z
//! meridian locate 40.7128 -74.0060
//! meridian spans Europe/London 2024-01-01T00:00:00Z 2025-01-01T00:00:00Z
//! ```

mod command;
mod error;

use std::path::PathBuf;

use chrono::Utc;
use meridian_core::{Resolver, ResolverConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::command::{Command, USAGE};
use crate::error::CliError;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "MERIDIAN_CONFIG";

/// Config file used when `$MERIDIAN_CONFIG` is unset.
const DEFAULT_CONFIG_FILE: &str = "meridian-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the arguments, the configuration, the data directory
/// or the query itself fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = command::parse_args(&args, Utc::now())?;
    if command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = load_config()?;

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        data_directory = %config.data.directory.display(),
        max_distance_km = config.geolocation.max_distance_km,
        "configuration loaded"
    );

    let resolver = Resolver::from_config(&config)?;
    let output = run(&resolver, command)?;
    println!("{output}");
    Ok(())
}

/// Read the config file if there is one, otherwise use defaults. Either
/// way environment overrides apply.
fn load_config() -> Result<ResolverConfig, CliError> {
    let path = std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
    if path.is_file() {
        return Ok(ResolverConfig::from_file(&path)?);
    }
    let mut config = ResolverConfig::default();
    config.apply_env_overrides();
    Ok(config)
}

/// Answer `command` as pretty-printed JSON.
fn run(resolver: &Resolver, command: Command) -> Result<String, CliError> {
    let json = match command {
        Command::Zone { name, at } => {
            let result = resolver
                .resolve_local_time(&name, at)?
                .ok_or(CliError::UnknownZone(name))?;
            serde_json::to_string_pretty(&result)?
        }
        Command::Locate { coordinate, at } => {
            let result = resolver
                .resolve_local_time_at(coordinate, at)?
                .ok_or_else(|| CliError::Usage(format!("coordinate {coordinate} is not a finite position")))?;
            serde_json::to_string_pretty(&result)?
        }
        Command::Spans { name, begin, end } => {
            let spans = resolver
                .rule_spans(&name, begin, end)?
                .ok_or(CliError::UnknownZone(name))?;
            serde_json::to_string_pretty(&spans)?
        }
        Command::Help => USAGE.to_owned(),
    };
    Ok(json)
}
