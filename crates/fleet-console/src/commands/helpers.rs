use fleet_core::{ConsoleConfig, RefreshConfig, RefreshCoordinator, events};
use tracing::error;

use crate::sources::register_sources;

/// Load the merged config, logging before handing the error to the caller.
pub fn load_config() -> Result<ConsoleConfig, Box<dyn std::error::Error>> {
    let config = ConsoleConfig::load_hierarchy().map_err(|e| {
        error!(event = "cli.config.load_failed", error = %e);
        Box::new(e) as Box<dyn std::error::Error>
    })?;
    events::log_config_loaded(&config);
    Ok(config)
}

/// Build a coordinator with every configured source registered.
pub fn build_coordinator(
    config: &ConsoleConfig,
    refresh_config: RefreshConfig,
) -> Result<RefreshCoordinator, Box<dyn std::error::Error>> {
    let coordinator = RefreshCoordinator::new(refresh_config)?;
    register_sources(&coordinator, &config.sources);
    Ok(coordinator)
}

/// Pluralize "source" for summary lines.
pub fn sources_label(count: usize) -> &'static str {
    if count == 1 { "source" } else { "sources" }
}
