use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::ArgMatches;
use tracing::{info, warn};

use fleet_core::{LiveStatus, RefreshConfig, RefreshCoordinator, RefreshSnapshot};

use super::helpers::{build_coordinator, load_config, sources_label};

pub(crate) async fn handle_watch_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let cycles = matches.get_one::<u32>("cycles").copied().unwrap_or(3);
    let interval_override = matches.get_one::<u64>("interval-ms").copied();

    let config = load_config()?;
    let mut refresh_config = RefreshConfig::from(&config.refresh);
    if let Some(ms) = interval_override {
        refresh_config.interval = Duration::from_millis(ms);
    }
    // Watching only makes sense with the timer running.
    refresh_config.enabled = true;

    info!(
        event = "cli.watch_started",
        cycles = cycles,
        interval_ms = refresh_config.interval.as_millis() as u64
    );

    if config.sources.is_empty() {
        println!("No sources configured - nothing to watch (the refresh timer stays idle).");
        return Ok(());
    }

    let coordinator = build_coordinator(&config, refresh_config)?;
    println!(
        "Watching {} {} every {}ms",
        config.sources.len(),
        sources_label(config.sources.len()),
        refresh_config.interval.as_millis()
    );

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(event = "cli.watch_signal_unavailable", error = %e);
            std::future::pending::<()>().await;
        }
    };
    let seen = watch_cycles(&coordinator, cycles, interrupt).await;

    info!(event = "cli.watch_completed", cycles_seen = seen);
    coordinator.shutdown();
    Ok(())
}

/// Print one line per completed cycle until `cycles` have been seen or
/// `interrupt` resolves. Returns the number of cycles seen.
async fn watch_cycles(
    coordinator: &RefreshCoordinator,
    cycles: u32,
    interrupt: impl Future<Output = ()>,
) -> u32 {
    let mut rx = coordinator.subscribe();
    tokio::pin!(interrupt);

    let mut seen = 0;
    let mut last_seen: Option<DateTime<Utc>> = None;
    while seen < cycles {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *rx.borrow_and_update();
                if let Some(completed) = completed_cycle(&snapshot, last_seen) {
                    last_seen = Some(completed);
                    seen += 1;
                    let status = LiveStatus::from_snapshot(&snapshot, Utc::now());
                    println!(
                        "[cycle {}] {} - updated {}",
                        seen,
                        status,
                        coordinator.time_since_last_update()
                    );
                }
            }
            _ = &mut interrupt => {
                warn!(event = "cli.watch_interrupted", cycles_seen = seen);
                break;
            }
        }
    }
    seen
}

/// Completion time of a cycle not yet reported, if the snapshot shows one.
fn completed_cycle(
    snapshot: &RefreshSnapshot,
    last_seen: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    if snapshot.is_refreshing {
        return None;
    }
    snapshot.last_update.filter(|&last| Some(last) != last_seen)
}
