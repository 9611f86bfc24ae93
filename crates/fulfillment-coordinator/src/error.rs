//! Error types for the fulfillment coordinator
//!
//! A timeout is not an error here; it is a [`crate::WaitOutcome`] variant.

use thiserror::Error;

/// Boxed error returned by a failed submission action.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coordinator errors
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The triggering action failed before any event could be awaited.
    /// Not retried; blindly resubmitting could create a duplicate request.
    #[error("Submission failed: {0}")]
    SubmissionFailed(#[source] BoxError),

    /// Coordinator was built with an invalid configuration
    #[error("Invalid coordinator configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for coordinator operations
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Configuration validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}
