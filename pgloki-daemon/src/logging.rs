//! Logging initialization for pgloki-daemon.
//!
//! Driven by the `[general]` section of `PglokiConfig`. The configured level
//! applies to the pgloki crates only; HTTP client internals stay at `warn`
//! unless `RUST_LOG` says otherwise.

use std::str::FromStr;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pgloki_core::config::GeneralConfig;

/// Crates whose events follow `general.log_level`.
const OWN_TARGETS: [&str; 3] = ["pgloki_core", "pgloki_shipper", "pgloki_daemon"];

/// Output format of the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => anyhow::bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
        }
    }
}

/// Filter directives used when `RUST_LOG` is unset.
///
/// `info` becomes `warn,pgloki_core=info,pgloki_shipper=info,pgloki_daemon=info`.
pub fn default_directives(level: &str) -> String {
    OWN_TARGETS
        .iter()
        .fold(String::from("warn"), |mut acc, target| {
            acc.push_str(&format!(",{target}={level}"));
            acc
        })
}

/// Installs the global tracing subscriber. Call once, before the scan starts.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let format: LogFormat = config.log_format.parse()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(&config.log_level)))
        .with_context(|| format!("invalid log level '{}'", config.log_level))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };
    installed.context("failed to install tracing subscriber")
}
