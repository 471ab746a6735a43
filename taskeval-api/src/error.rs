//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use taskeval_core::error::EvalError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// Conflict with existing state.
    pub fn conflict(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message, code)
    }

    /// Too many requests.
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, message, "RATE_LIMITED")
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message, "VALIDATION_ERROR")
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<EvalError> for ApiError {
    fn from(err: EvalError) -> Self {
        match &err {
            EvalError::ValidationError(_) => ApiError::validation(err.to_string()),
            EvalError::InvalidTaskId(_) => ApiError::bad_request(err.to_string()),
            EvalError::TaskNotFound(_) | EvalError::EvaluationNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            EvalError::DuplicateEvaluation(_) => {
                ApiError::conflict(err.to_string(), "ALREADY_EVALUATED")
            }
            EvalError::AlreadyInProgress(_) => {
                ApiError::conflict(err.to_string(), "ALREADY_IN_PROGRESS")
            }
            EvalError::ProcessingTimeout { .. } => ApiError::new(
                StatusCode::GATEWAY_TIMEOUT,
                "Evaluation timed out, try again",
                "PROCESSING_TIMEOUT",
            ),
            EvalError::Cancelled(_) => ApiError::new(
                StatusCode::REQUEST_TIMEOUT,
                err.to_string(),
                "CANCELLED",
            ),
            EvalError::RateLimited(_) => {
                ApiError::too_many_requests("Evaluation service is rate limited, try again later")
            }
            EvalError::EvaluatorUnavailable(_)
            | EvalError::HttpError(_)
            | EvalError::InvalidModelResponse(_) => {
                tracing::warn!(error = %err, "Upstream evaluation failure");
                ApiError::new(
                    StatusCode::BAD_GATEWAY,
                    "Evaluation service failed, try again",
                    "UPSTREAM_ERROR",
                )
            }
            _ => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}
