//! Logging setup for binaries.
//!
//! Libraries in this workspace only emit `tracing` events; binaries call
//! `init` once to install a subscriber.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`EnvFilter` syntax).
pub const LOG_ENV: &str = "THREADVIEW_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Installs a `fmt` subscriber writing to stderr.
///
/// The filter comes from `THREADVIEW_LOG`, then `default_filter`, then `warn`.
pub fn init(default_filter: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_filter.unwrap_or(DEFAULT_FILTER)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))
}
