//! Configuration resolution and the one-shot scan.
//!
//! Precedence, lowest to highest: built-in defaults, config file,
//! `PGLOKI_*` environment variables, command-line flags.

use anyhow::{Context, Result};
use tracing::info;

use pgloki_core::config::PglokiConfig;
use pgloki_core::error::{ConfigError, PglokiError};
use pgloki_shipper::{LokiClient, ScanReport, Shipper, ShipperBuilder};

use crate::cli::DaemonCli;

/// Resolves the effective configuration for this run.
///
/// A missing file at the default path falls back to built-in defaults.
/// A missing file at an explicitly given path is an error.
pub async fn load_config(cli: &DaemonCli) -> Result<PglokiConfig> {
    let mut config = match PglokiConfig::from_file(&cli.config).await {
        Ok(config) => config,
        Err(PglokiError::Config(ConfigError::FileNotFound { .. })) if cli.uses_default_config() => {
            PglokiConfig::default()
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to load config from {}", cli.config.display()));
        }
    };

    config.apply_env_overrides();
    apply_cli_overrides(&mut config, cli);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Applies command-line overrides on top of file and env values.
pub fn apply_cli_overrides(config: &mut PglokiConfig, cli: &DaemonCli) {
    if let Some(level) = &cli.log_level {
        config.general.log_level.clone_from(level);
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format.clone_from(format);
    }
    if let Some(dir) = &cli.log_dir {
        config.source.log_dir.clone_from(dir);
    }
    if let Some(url) = &cli.sink_url {
        config.sink.url.clone_from(url);
    }
}

/// Builds the shipper, compiling patterns and the HTTP client.
pub fn build_shipper(config: &PglokiConfig) -> Result<Shipper<LokiClient>> {
    ShipperBuilder::new()
        .config(config.clone())
        .build()
        .context("failed to build log shipper")
}

/// Runs a single scan of the source directory.
///
/// Rejected or undeliverable entries are reported in the returned
/// [`ScanReport`]; only a failure to list the source directory is an error.
pub async fn run(config: &PglokiConfig) -> Result<ScanReport> {
    let shipper = build_shipper(config)?;
    info!(
        log_dir = %shipper.log_dir().display(),
        sink = config.sink.url.as_str(),
        clamp_policy = ?config.sink.clamp_policy,
        "pgloki-daemon scanning"
    );
    let report = shipper.scan_once().await.context("scan failed")?;
    Ok(report)
}
