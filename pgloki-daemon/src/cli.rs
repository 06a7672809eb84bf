//! CLI argument definitions for pgloki-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/pgloki/pgloki.toml";

/// PostgreSQL log shipper.
///
/// Scans the PostgreSQL log directory once, reassembles multi-line
/// entries and pushes each entry to a Loki-compatible endpoint.
#[derive(Parser, Debug)]
#[command(name = "pgloki-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to pgloki.toml configuration file.
    ///
    /// If the default path does not exist, built-in defaults are used.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

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

    /// Override the PostgreSQL log directory to scan.
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Override the push endpoint URL.
    #[arg(long)]
    pub sink_url: Option<String>,

    /// Validate configuration and exit without scanning.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Whether `--config` still points at the built-in default path.
    pub fn uses_default_config(&self) -> bool {
        self.config.as_os_str() == DEFAULT_CONFIG_PATH
    }
}
