//! Error types for taskeval.
//!
//! This module provides a comprehensive error hierarchy using `thiserror`.
//! All errors include context and are designed to be actionable.

use thiserror::Error;

/// Result type alias using `EvalError`.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Main error type for all taskeval operations.
#[derive(Debug, Error)]
pub enum EvalError {
    // ═══════════════════════════════════════════════════════════════════════════
    // TASK & STORE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// No task exists with the given identifier.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// No evaluation exists for the given task.
    #[error("Evaluation not found for task: {0}")]
    EvaluationNotFound(String),

    /// The task already has an evaluation; a second one is rejected.
    #[error("Task has already been evaluated: {0}")]
    DuplicateEvaluation(String),

    /// Store-level failure (corruption, capacity).
    #[error("Store error: {0}")]
    StoreError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // PROCESSING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The identifier is already being processed; do not start duplicate work.
    #[error("Evaluation {0} is already being processed")]
    AlreadyInProgress(String),

    /// The tracked operation exceeded its wall-clock timeout. Retryable.
    #[error("Processing timeout for {id} after {seconds}s")]
    ProcessingTimeout {
        /// Identifier of the timed-out operation.
        id: String,
        /// Configured timeout that was exceeded.
        seconds: u64,
    },

    /// The caller cancelled the operation before it settled.
    #[error("Processing cancelled for {0}")]
    Cancelled(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // MODEL / EVALUATOR ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The evaluation service could not be reached or returned a server error.
    #[error("Evaluation service unavailable: {0}")]
    EvaluatorUnavailable(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The model API rejected the request due to rate limiting.
    #[error("Evaluation service rate limited: {0}")]
    RateLimited(String),

    /// The model produced output that does not match the expected report shape.
    #[error("Invalid model response: {0}")]
    InvalidModelResponse(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The supplied task identifier is not a valid UUID.
    #[error("Invalid task ID: {0}")]
    InvalidTaskId(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION & IO ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl EvalError {
    /// Returns true if this error is recoverable (the caller can retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EvalError::HttpError(_)
                | EvalError::EvaluatorUnavailable(_)
                | EvalError::RateLimited(_)
                | EvalError::ProcessingTimeout { .. }
        )
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            EvalError::ValidationError(_)
                | EvalError::InvalidTaskId(_)
                | EvalError::InvalidModelResponse(_)
        )
    }

    /// Returns true if this error reports a conflict with existing state.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            EvalError::AlreadyInProgress(_) | EvalError::DuplicateEvaluation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EvalError::ProcessingTimeout {
            id: "abc".into(),
            seconds: 30,
        };
        assert!(err.to_string().contains("abc"));
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_error_classification() {
        assert!(EvalError::HttpError("test".into()).is_recoverable());
        assert!(EvalError::RateLimited("test".into()).is_recoverable());
        assert!(!EvalError::TaskNotFound("test".into()).is_recoverable());

        assert!(EvalError::AlreadyInProgress("test".into()).is_conflict());
        assert!(EvalError::DuplicateEvaluation("test".into()).is_conflict());
        assert!(!EvalError::HttpError("test".into()).is_conflict());

        assert!(EvalError::ValidationError("test".into()).is_validation_error());
        assert!(!EvalError::Cancelled("test".into()).is_validation_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let eval_result: Result<serde_json::Value> = json_result.map_err(EvalError::from);
        assert!(matches!(eval_result, Err(EvalError::JsonError(_))));
    }
}
