use clap::ArgMatches;
use tracing::info;

use fleet_core::ConsoleConfig;

use super::helpers::load_config;

pub(crate) fn handle_config_command(_matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.config_started");

    let config = with_defaults_filled(load_config()?);
    print!("{}", toml::to_string_pretty(&config)?);

    info!(
        event = "cli.config_completed",
        source_count = config.sources.len()
    );
    Ok(())
}

/// Write defaulted refresh settings out explicitly so the output shows what is in effect.
fn with_defaults_filled(mut config: ConsoleConfig) -> ConsoleConfig {
    config.refresh.interval_ms = Some(config.refresh.interval_ms());
    config.refresh.enabled = Some(config.refresh.enabled());
    config
}
