use chrono::{DateTime, Utc};
use serde::Serialize;

use fleet_core::RefreshReport;

/// JSON view of one completed refresh cycle.
#[derive(Debug, Serialize)]
pub struct RefreshReportJson {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub succeeded: usize,
    pub failed: usize,
    pub sources: Vec<SourceOutcomeJson>,
}

#[derive(Debug, Serialize)]
pub struct SourceOutcomeJson {
    pub key: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RefreshReport> for RefreshReportJson {
    fn from(report: &RefreshReport) -> Self {
        Self {
            started_at: report.started_at,
            completed_at: report.completed_at,
            duration_ms: (report.completed_at - report.started_at).num_milliseconds(),
            succeeded: report.succeeded(),
            failed: report.failed(),
            sources: report
                .outcomes
                .iter()
                .map(|outcome| SourceOutcomeJson {
                    key: outcome.key.clone(),
                    ok: outcome.is_success(),
                    error: outcome.error.as_ref().map(|e| e.to_string()),
                })
                .collect(),
        }
    }
}
