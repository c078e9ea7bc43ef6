//! Configuration loading and merging logic.
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.fleet-console/config.toml`
//! 3. **Project config** - `./.fleet-console/config.toml`
//! 4. **CLI arguments** - Command-line flags (applied by the caller)

use crate::config::types::{Config, ConsoleConfig, RefreshSettings, SourceConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load configuration from the user and project config files.
///
/// # Errors
///
/// Returns an error if a file exists but cannot be read or parsed, or if the
/// merged result fails validation. Missing config files are not errors.
pub fn load_hierarchy() -> Result<ConsoleConfig, ConfigError> {
    let user_path = Config::new().user_config_path();
    let project_path = project_config_path(&std::env::current_dir()?);

    load_hierarchy_from(Some(&user_path), Some(&project_path))
}

/// Load and merge the given config files in order, user first.
pub fn load_hierarchy_from(
    user_path: Option<&Path>,
    project_path: Option<&Path>,
) -> Result<ConsoleConfig, ConfigError> {
    let mut config = ConsoleConfig::default();

    for path in [user_path, project_path].into_iter().flatten() {
        if let Some(file_config) = load_config_file(path)? {
            config = merge_configs(config, file_config);
        }
    }

    validate_config(&config)?;

    Ok(config)
}

/// Load a configuration file, returning `None` when it does not exist.
fn load_config_file(path: &Path) -> Result<Option<ConsoleConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(
                event = "core.config.file_not_found",
                path = %path.display()
            );
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let config = toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    debug!(event = "core.config.file_loaded", path = %path.display());
    Ok(Some(config))
}

/// Merge two configurations, with `override_config` taking precedence.
///
/// Refresh settings merge per field. Sources merge by key: an override entry
/// replaces a base entry with the same key, new keys are appended.
pub fn merge_configs(base: ConsoleConfig, override_config: ConsoleConfig) -> ConsoleConfig {
    ConsoleConfig {
        refresh: RefreshSettings {
            interval_ms: override_config
                .refresh
                .interval_ms
                .or(base.refresh.interval_ms),
            enabled: override_config.refresh.enabled.or(base.refresh.enabled),
        },
        sources: merge_sources(base.sources, override_config.sources),
    }
}

fn merge_sources(base: Vec<SourceConfig>, overrides: Vec<SourceConfig>) -> Vec<SourceConfig> {
    let mut merged = base;
    for source in overrides {
        match merged.iter_mut().find(|existing| existing.key == source.key) {
            Some(existing) => *existing = source,
            None => merged.push(source),
        }
    }
    merged
}

/// Path of the project config relative to `dir`.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(".fleet-console").join("config.toml")
}
