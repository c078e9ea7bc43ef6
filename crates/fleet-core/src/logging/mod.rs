use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with optional quiet mode.
///
/// When `quiet` is true, only error-level events are emitted.
/// When `quiet` is false, info-level and above events are emitted (default).
/// Logs are JSON lines on stderr so stdout stays clean for command output.
pub fn init_logging(quiet: bool) {
    let directive = if quiet { "fleet=error" } else { "fleet=info" };

    // try_init: a second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(EnvFilter::from_default_env().add_directive(log_directive(directive)))
        .try_init();
}

fn log_directive(directive: &str) -> Directive {
    directive
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into())
}
