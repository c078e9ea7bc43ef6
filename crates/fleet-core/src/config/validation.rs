//! Configuration validation.

use crate::config::types::ConsoleConfig;
use crate::errors::ConfigError;
use std::collections::HashSet;

/// Validate a merged configuration.
///
/// # Errors
///
/// Returns `ConfigError::InvalidConfiguration` when the refresh interval is
/// zero, or a source key is empty or used twice.
pub fn validate_config(config: &ConsoleConfig) -> Result<(), ConfigError> {
    if config.refresh.interval_ms() == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "refresh.interval_ms must be greater than 0".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for source in &config.sources {
        if source.key.trim().is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: "source key cannot be empty".to_string(),
            });
        }
        if !seen.insert(source.key.as_str()) {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("duplicate source key '{}'", source.key),
            });
        }
    }

    Ok(())
}
