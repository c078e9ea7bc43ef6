//! fleet-core: Core library for the fleet operations console
//!
//! Provides the data refresh coordination shared by the console's dashboard
//! widgets, plus the configuration, error and logging plumbing around it.
//!
//! # Main Entry Points
//!
//! - [`refresh`] - Register widget reloads and run them on a shared cadence
//! - [`config`] - Configuration management

pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod refresh;

// Re-export commonly used types at crate root for convenience
pub use config::{ConsoleConfig, SourceConfig};
pub use errors::{ConfigError, FleetError};
pub use refresh::{
    LiveStatus, RefreshConfig, RefreshCoordinator, RefreshError, RefreshOutcome, RefreshReport,
    RefreshSnapshot, SourceError,
};

// Re-export logging initialization
pub use logging::init_logging;
