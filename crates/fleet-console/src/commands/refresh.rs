use clap::ArgMatches;
use tracing::info;

use fleet_core::{RefreshConfig, RefreshOutcome, RefreshReport};

use super::helpers::{build_coordinator, load_config, sources_label};
use super::json_types::RefreshReportJson;

pub(crate) async fn handle_refresh_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.refresh_started", json = json_output);

    let config = load_config()?;
    // One manual cycle; the timer never needs to fire.
    let refresh_config = RefreshConfig {
        enabled: false,
        ..RefreshConfig::from(&config.refresh)
    };
    let coordinator = build_coordinator(&config, refresh_config)?;

    let report = match coordinator.refresh().await {
        RefreshOutcome::Completed(report) => report,
        RefreshOutcome::Skipped => return Err("A refresh cycle is already in progress".into()),
    };

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&RefreshReportJson::from(&report))?
        );
    } else {
        print_report(&report);
        println!("Updated {}", coordinator.time_since_last_update());
    }

    info!(
        event = "cli.refresh_completed",
        succeeded = report.succeeded(),
        failed = report.failed()
    );
    coordinator.shutdown();
    Ok(())
}

fn print_report(report: &RefreshReport) {
    let total = report.outcomes.len();
    println!(
        "Refreshed {} {} ({} ok, {} failed)",
        total,
        sources_label(total),
        report.succeeded(),
        report.failed()
    );

    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!("  ok      {}", outcome.key),
            Some(error) => println!("  FAILED  {} - {}", outcome.key, error),
        }
    }
}
