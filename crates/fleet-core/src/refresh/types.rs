use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

use crate::config::RefreshSettings;
use crate::config::defaults::{DEFAULT_REFRESH_ENABLED, DEFAULT_REFRESH_INTERVAL_MS};
use crate::refresh::errors::SourceError;

/// Future returned by a registered callback. The error is already rendered
/// to a message; the coordinator attaches the registry key.
pub type RefreshFuture = BoxFuture<'static, Result<(), String>>;

/// A registered zero-argument reload operation.
pub type RefreshCallback = Arc<dyn Fn() -> RefreshFuture + Send + Sync>;

/// Read-only cadence parameters for a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    pub interval: Duration,
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
            enabled: DEFAULT_REFRESH_ENABLED,
        }
    }
}

impl RefreshConfig {
    pub fn new(interval: Duration, enabled: bool) -> Self {
        Self { interval, enabled }
    }
}

impl From<&RefreshSettings> for RefreshConfig {
    fn from(settings: &RefreshSettings) -> Self {
        Self {
            interval: settings.interval(),
            enabled: settings.enabled(),
        }
    }
}

/// Observable coordinator state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshSnapshot {
    pub is_refreshing: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub source_count: usize,
}

/// Result of one registered source within a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub key: String,
    pub error: Option<SourceError>,
}

impl SourceOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a completed refresh cycle. Outcomes are sorted by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub outcomes: Vec<SourceOutcome>,
}

impl RefreshReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn errors(&self) -> impl Iterator<Item = &SourceError> {
        self.outcomes.iter().filter_map(|o| o.error.as_ref())
    }
}

/// What a call to `refresh()` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A cycle ran to completion.
    Completed(RefreshReport),
    /// Another cycle was already in progress; nothing ran.
    Skipped,
}

impl RefreshOutcome {
    pub fn report(&self) -> Option<&RefreshReport> {
        match self {
            RefreshOutcome::Completed(report) => Some(report),
            RefreshOutcome::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RefreshOutcome::Skipped)
    }
}
