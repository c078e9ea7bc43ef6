use crate::errors::FleetError;

/// Errors raised while setting up or reconfiguring a coordinator.
///
/// A refresh cycle itself never fails; see [`SourceError`] for the
/// per-source outcomes it records instead.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Refresh coordinator must be created inside a tokio runtime")]
    NoRuntime,

    #[error("Refresh interval must be greater than zero")]
    InvalidInterval,
}

impl FleetError for RefreshError {
    fn error_code(&self) -> &'static str {
        match self {
            RefreshError::NoRuntime => "REFRESH_NO_RUNTIME",
            RefreshError::InvalidInterval => "REFRESH_INVALID_INTERVAL",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, RefreshError::InvalidInterval)
    }
}

/// Why a single registered source did not refresh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("source '{key}' failed: {message}")]
    Failed { key: String, message: String },

    #[error("source '{key}' panicked: {message}")]
    Panicked { key: String, message: String },
}

impl SourceError {
    pub fn key(&self) -> &str {
        match self {
            SourceError::Failed { key, .. } | SourceError::Panicked { key, .. } => key,
        }
    }

    /// Build a `Panicked` error from a caught panic payload.
    pub(crate) fn from_panic(key: &str, payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        SourceError::Panicked {
            key: key.to_string(),
            message,
        }
    }
}

impl FleetError for SourceError {
    fn error_code(&self) -> &'static str {
        match self {
            SourceError::Failed { .. } => "SOURCE_FAILED",
            SourceError::Panicked { .. } => "SOURCE_PANICKED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_error_codes() {
        assert_eq!(RefreshError::NoRuntime.error_code(), "REFRESH_NO_RUNTIME");
        assert!(!RefreshError::NoRuntime.is_user_error());
        assert!(RefreshError::InvalidInterval.is_user_error());
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Failed {
            key: "vehicles".to_string(),
            message: "timed out".to_string(),
        };
        assert_eq!(err.to_string(), "source 'vehicles' failed: timed out");
        assert_eq!(err.key(), "vehicles");
        assert_eq!(err.error_code(), "SOURCE_FAILED");
    }

    #[test]
    fn test_from_panic_payloads() {
        let err = SourceError::from_panic("a", Box::new("boom"));
        assert_eq!(
            err,
            SourceError::Panicked {
                key: "a".to_string(),
                message: "boom".to_string()
            }
        );

        let err = SourceError::from_panic("b", Box::new(String::from("owned boom")));
        assert_eq!(err.to_string(), "source 'b' panicked: owned boom");

        let err = SourceError::from_panic("c", Box::new(7_u32));
        assert!(err.to_string().contains("non-string panic payload"));
    }
}
