//! Error types for mushaf-align
//!
//! Two families live here:
//! - the alignment run taxonomy (`MissingInputError`, `AlignmentServiceError`,
//!   `PersistenceError`, and the umbrella `RunFailure`), which never escapes a
//!   run and ends up in its reported outcome;
//! - `ApiError`, returned by HTTP handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Audio URL or concatenated token text was empty
///
/// Detected before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing audio_url or text")]
pub struct MissingInputError {
    pub audio_url_missing: bool,
    pub text_missing: bool,
}

/// Forced-alignment service call failed
#[derive(Debug, Error)]
pub enum AlignmentServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Alignment request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Alignment service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed alignment response: {0}")]
    MalformedResponse(String),
}

/// Data store read or write failed
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

/// Typed cause carried by a failed run
#[derive(Debug, Error)]
pub enum RunFailure {
    #[error(transparent)]
    MissingInput(#[from] MissingInputError),

    #[error(transparent)]
    AlignmentService(#[from] AlignmentServiceError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Panic or other fault caught at the run boundary
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl RunFailure {
    /// Machine-readable category reported alongside the failure notification
    pub fn category(&self) -> &'static str {
        match self {
            RunFailure::MissingInput(_) => "missing_input",
            RunFailure::AlignmentService(_) => "alignment_service",
            RunFailure::Persistence(_) => "persistence",
            RunFailure::Unexpected(_) => "unexpected",
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Recitation, file or association not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Alignment already running for the pair (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Persistence(PersistenceError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::Persistence(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PERSISTENCE_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
