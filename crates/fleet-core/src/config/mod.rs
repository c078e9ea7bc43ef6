//! # Configuration System
//!
//! Hierarchical TOML configuration for the fleet console.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.fleet-console/config.toml` (global user preferences)
//! 3. **Project config** - `./.fleet-console/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use fleet_core::config::ConsoleConfig;
//! use fleet_core::refresh::RefreshConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConsoleConfig::load_hierarchy()?;
//!     let refresh = RefreshConfig::from(&config.refresh);
//!     println!("polling every {:?}", refresh.interval);
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{Config, ConsoleConfig, RefreshSettings, SourceConfig};
pub use validation::validate_config;

impl ConsoleConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
