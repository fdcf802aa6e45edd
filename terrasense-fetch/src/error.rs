//! Fetch error types.
//!
//! The taxonomy distinguishes errors that are worth retrying from errors
//! that are not, and errors the area-task workflow must escalate from errors
//! the point path absorbs through its fallback chain.

use thiserror::Error;

// ============================================================================
// Fetch Error
// ============================================================================

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request itself is wrong (bad input, unknown resource, bad date
    /// range). Never retried.
    #[error("Terminal request error: {0}")]
    TerminalRequest(String),

    /// A transient upstream failure that was retried to exhaustion.
    #[error("Transient provider error after {attempts} attempts: {reason}")]
    TransientProvider {
        /// Last observed failure reason.
        reason: String,
        /// Number of attempts made before escalation.
        attempts: u32,
    },

    /// Rate limited by the provider.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, when advertised.
        retry_after: Option<u64>,
    },

    /// Session token or credential rejected.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The extraction task reported failure upstream.
    #[error("Extraction task failed: {0}")]
    TaskFailed(String),

    /// The extraction task did not finish within the poll budget.
    #[error("Extraction task timed out after {polls} polls")]
    TaskTimeout {
        /// Number of polls performed before giving up.
        polls: u32,
    },

    /// Polling was cancelled by the caller. The submitted upstream task is
    /// not retracted.
    #[error("Polling cancelled")]
    Cancelled,

    /// The provider answered with something unparseable or unexpected.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] terrasense_core::CoreError),

    /// Every tier of a fallback pipeline was exhausted.
    #[error("All fallback tiers exhausted")]
    AllTiersExhausted,
}

impl FetchError {
    /// Returns true if retrying the same call may succeed.
    ///
    /// Connection failures, timeouts, rate limiting, and upstream 5xx-class
    /// failures are retryable; malformed requests and rejected credentials
    /// are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::TransientProvider { .. } | Self::RateLimited { .. } => true,
            _ => false,
        }
    }

    /// Short classification label used in logs.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::TerminalRequest(_) => "terminal",
            Self::TransientProvider { .. } => "transient",
            Self::RateLimited { .. } => "rate_limited",
            Self::AuthenticationFailed(_) => "auth",
            Self::TaskFailed(_) => "task_failed",
            Self::TaskTimeout { .. } => "task_timeout",
            Self::Cancelled => "cancelled",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Json(_) => "json",
            Self::Core(_) => "core",
            Self::AllTiersExhausted => "tiers_exhausted",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let transient = FetchError::TransientProvider {
            reason: "HTTP 503".to_string(),
            attempts: 3,
        };
        assert!(transient.is_retryable());
        assert!(FetchError::RateLimited { retry_after: None }.is_retryable());

        assert!(!FetchError::TerminalRequest("bad bbox".to_string()).is_retryable());
        assert!(!FetchError::AuthenticationFailed("expired".to_string()).is_retryable());
        assert!(!FetchError::TaskTimeout { polls: 60 }.is_retryable());
    }

    #[test]
    fn test_class_labels() {
        assert_eq!(FetchError::Cancelled.class(), "cancelled");
        assert_eq!(FetchError::AllTiersExhausted.class(), "tiers_exhausted");
    }
}
