//! Simulated data sources standing in for dashboard widgets.
//!
//! Each configured source becomes one registered callback that waits for its
//! latency and then succeeds, or fails when configured to.

use std::time::Duration;

use fleet_core::{RefreshCoordinator, SourceConfig};
use tracing::debug;

/// Register one callback per configured source.
pub fn register_sources(coordinator: &RefreshCoordinator, sources: &[SourceConfig]) {
    for source in sources {
        let key = source.key.clone();
        let latency = Duration::from_millis(source.latency_ms);
        let fail = source.fail;

        coordinator.register(source.key.clone(), move || {
            let key = key.clone();
            async move {
                tokio::time::sleep(latency).await;
                debug!(
                    event = "cli.source.reload_finished",
                    key = %key,
                    failed = fail
                );
                if fail {
                    return Err(format!("simulated failure after {}ms", latency.as_millis()));
                }
                Ok(())
            }
        });
    }
}
