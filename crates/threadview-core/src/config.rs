//! Configuration for thread views.
//!
//! Loads configuration from `$THREADVIEW_CONFIG` (or `./threadview.toml`)
//! with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bus::DEFAULT_BUS_CAPACITY;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "THREADVIEW_CONFIG";

/// Returns the path of the config file.
///
/// Checks `THREADVIEW_CONFIG` first, falls back to `threadview.toml` in the
/// working directory.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    PathBuf::from("threadview.toml")
}

/// View configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Delay before a load in progress shows the spinner, in milliseconds.
    pub loader_delay_ms: u64,

    /// Capacity of the hint-processed broadcast channel.
    pub hint_bus_capacity: usize,

    /// Whether new views auto-scroll when a message is received.
    pub auto_scroll_on_message_received: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            loader_delay_ms: Self::DEFAULT_LOADER_DELAY_MS,
            hint_bus_capacity: DEFAULT_BUS_CAPACITY,
            auto_scroll_on_message_received: true,
        }
    }
}

impl ViewConfig {
    const DEFAULT_LOADER_DELAY_MS: u64 = 400;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(ViewConfig::default())
        }
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn loader_delay(&self) -> Duration {
        Duration::from_millis(self.loader_delay_ms)
    }
}
