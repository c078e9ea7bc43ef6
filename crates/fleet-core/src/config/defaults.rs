//! Default values for configuration types.

use crate::config::types::{Config, RefreshSettings};
use std::path::PathBuf;
use std::time::Duration;

/// Default polling interval (one minute).
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 60_000;

/// Timed refreshes are on unless a config turns them off.
pub const DEFAULT_REFRESH_ENABLED: bool = true;

impl Default for Config {
    fn default() -> Self {
        let console_dir = match dirs::home_dir() {
            Some(home) => home.join(".fleet-console"),
            None => {
                eprintln!(
                    "Warning: Could not find home directory. Set HOME environment variable. \
                    Using fallback directory."
                );
                std::env::temp_dir().join(".fleet-console")
            }
        };

        Self { console_dir }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_config_path(&self) -> PathBuf {
        self.console_dir.join("config.toml")
    }
}

impl RefreshSettings {
    /// Returns the polling interval in milliseconds, defaulting to 60000.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms.unwrap_or(DEFAULT_REFRESH_INTERVAL_MS)
    }

    /// Returns the polling interval, defaulting to one minute.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms())
    }

    /// Returns whether timed refreshes are enabled, defaulting to true.
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(DEFAULT_REFRESH_ENABLED)
    }
}
