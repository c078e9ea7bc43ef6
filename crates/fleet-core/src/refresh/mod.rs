//! Shared data refresh coordination for dashboard widgets.
//!
//! Widgets register a keyed async reload operation with a
//! [`RefreshCoordinator`]. The coordinator runs every registered operation in
//! parallel on a fixed interval or on demand, keeps at most one cycle in
//! flight, and records when the last cycle completed. Individual failures are
//! logged and reported per source; they never fail the cycle.
//!
//! ```rust,no_run
//! use fleet_core::refresh::{RefreshConfig, RefreshCoordinator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coordinator = RefreshCoordinator::new(RefreshConfig::default())?;
//! coordinator.register("vehicles", || async {
//!     // reload vehicle data here
//!     Ok::<(), String>(())
//! });
//!
//! let outcome = coordinator.refresh().await;
//! println!("{:?}, updated {}", outcome, coordinator.time_since_last_update());
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod errors;
pub mod status;
pub mod types;

pub use coordinator::RefreshCoordinator;
pub use errors::{RefreshError, SourceError};
pub use status::{LiveStatus, STALE_AFTER_SECS, format_time_since};
pub use types::{
    RefreshCallback, RefreshConfig, RefreshFuture, RefreshOutcome, RefreshReport,
    RefreshSnapshot, SourceOutcome,
};
