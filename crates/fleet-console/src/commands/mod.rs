use clap::ArgMatches;
use tracing::error;

use fleet_core::events;

pub mod helpers;
mod json_types;

mod config;
mod refresh;
mod watch;

pub async fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let command = matches.subcommand_name().unwrap_or("none");
    events::log_app_startup(command);

    let result = match matches.subcommand() {
        Some(("refresh", sub_matches)) => refresh::handle_refresh_command(sub_matches).await,
        Some(("watch", sub_matches)) => watch::handle_watch_command(sub_matches).await,
        Some(("config", sub_matches)) => config::handle_config_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    if let Err(e) = &result {
        events::log_app_error(&**e);
    }
    events::log_app_shutdown(command, result.is_ok());

    result
}
