//! CLI argument definitions for alertrelay-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use alertrelay_core::config::RelayConfig;
use clap::Parser;

/// Push-to-pull alert relay daemon.
///
/// Accepts alerts pushed by an external monitoring service, normalizes
/// them into check results, optionally forwards them to an NSCA daemon,
/// and buffers them until a pull-based collector drains them.
#[derive(Parser, Debug)]
#[command(name = "alertrelay-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to alertrelay.toml configuration file.
    #[arg(short, long, default_value = "/etc/alertrelay/alertrelay.toml")]
    pub config: PathBuf,

    /// Enable debug logging (same as `--log-level debug`).
    #[arg(short, long)]
    pub verbose: bool,

    /// Write every accepted request body to a new file in this directory.
    ///
    /// Takes precedence over `server.dump_requests_dir`.
    #[arg(long, value_name = "DIR")]
    pub dump_requests_dir: Option<String>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Apply command-line overrides on top of the loaded configuration.
    ///
    /// `--log-level` wins over `--verbose` when both are given.
    pub fn apply_overrides(&self, config: &mut RelayConfig) {
        if self.verbose {
            config.general.log_level = "debug".to_owned();
        }
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if let Some(dir) = &self.dump_requests_dir {
            config.server.dump_requests_dir = dir.clone();
        }
    }
}
