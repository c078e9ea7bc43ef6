//! Configuration type definitions for the fleet console.
//!
//! These types are serialized/deserialized from TOML config files.
//!
//! # Example Configuration
//!
//! ```toml
//! [refresh]
//! interval_ms = 30000
//! enabled = true
//!
//! [[sources]]
//! key = "vehicles"
//! latency_ms = 150
//!
//! [[sources]]
//! key = "incidents"
//! latency_ms = 400
//! fail = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime paths derived from the environment, not from config files.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for console data (default: ~/.fleet-console)
    pub console_dir: PathBuf,
}

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.fleet-console/config.toml`
/// 2. Project config: `./.fleet-console/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConsoleConfig {
    /// Shared refresh cadence for dashboard widgets
    #[serde(default)]
    pub refresh: RefreshSettings,

    /// Simulated data sources registered with the coordinator
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceConfig>,
}

/// Refresh cadence settings as written in the config file.
///
/// Fields are optional so that a project config can override a single value
/// without restating the rest.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RefreshSettings {
    /// Polling interval in milliseconds.
    /// Default: 60000 (one minute).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,

    /// Whether timed refreshes run at all.
    /// Default: true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// One simulated data source, standing in for a dashboard widget's reload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Registry key, unique across sources.
    pub key: String,

    /// How long the simulated reload takes.
    #[serde(default)]
    pub latency_ms: u64,

    /// When true the reload always fails.
    #[serde(default)]
    pub fail: bool,
}
