//! Core error types for `Terrasense`.

use thiserror::Error;

/// Core error type for `Terrasense` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A request was constructed with invalid parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Observation data violated a model invariant.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
