//! Application lifecycle log events shared by console commands.

use std::error::Error;

use tracing::{error, info};

use crate::config::ConsoleConfig;
use crate::errors::{ConfigError, FleetError};
use crate::refresh::RefreshError;

pub fn log_app_startup(command: &str) {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION"),
        command = command
    );
}

pub fn log_app_shutdown(command: &str, succeeded: bool) {
    info!(
        event = "core.app.shutdown_started",
        command = command,
        succeeded = succeeded
    );
}

pub fn log_config_loaded(config: &ConsoleConfig) {
    info!(
        event = "core.config.load_completed",
        interval_ms = config.refresh.interval_ms(),
        enabled = config.refresh.enabled(),
        source_count = config.sources.len()
    );
}

pub fn log_app_error(error: &(dyn Error + 'static)) {
    let fleet_error = fleet_error_of(error);
    error!(
        event = "core.app.error_occurred",
        error = %error,
        error_code = fleet_error.map(|e| e.error_code()).unwrap_or("UNKNOWN"),
        user_error = fleet_error.is_some_and(|e| e.is_user_error())
    );
}

/// The crate error behind a boxed command error, if it is one of ours.
fn fleet_error_of<'a>(error: &'a (dyn Error + 'static)) -> Option<&'a dyn FleetError> {
    if let Some(e) = error.downcast_ref::<ConfigError>() {
        return Some(e);
    }
    if let Some(e) = error.downcast_ref::<RefreshError>() {
        return Some(e);
    }
    None
}
