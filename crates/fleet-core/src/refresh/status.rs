//! Display helpers for the "last updated" indicator.

use chrono::{DateTime, Utc};

use crate::refresh::types::RefreshSnapshot;

/// Seconds after which a completed refresh is considered stale.
pub const STALE_AFTER_SECS: i64 = 120;

/// Format time since the last completed refresh (e.g., "42s ago", "5m ago").
///
/// Returns "Never" when no refresh has completed. A timestamp in the future
/// (clock skew) reads as "0s ago".
pub fn format_time_since(last_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(last_update) = last_update else {
        return "Never".to_string();
    };

    let seconds = now.signed_duration_since(last_update).num_seconds().max(0);
    if seconds < 60 {
        return format!("{}s ago", seconds);
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }

    format!("{}h ago", minutes / 60)
}

/// Indicator state derived from a coordinator snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveStatus {
    Syncing,
    Never,
    Stale,
    Live,
}

impl LiveStatus {
    pub fn from_snapshot(snapshot: &RefreshSnapshot, now: DateTime<Utc>) -> Self {
        if snapshot.is_refreshing {
            return LiveStatus::Syncing;
        }
        match snapshot.last_update {
            None => LiveStatus::Never,
            Some(last)
                if now.signed_duration_since(last).num_milliseconds() > STALE_AFTER_SECS * 1000 =>
            {
                LiveStatus::Stale
            }
            Some(_) => LiveStatus::Live,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LiveStatus::Syncing => "Syncing...",
            LiveStatus::Never => "Never updated",
            LiveStatus::Stale => "Stale",
            LiveStatus::Live => "Live",
        }
    }
}

impl std::fmt::Display for LiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
