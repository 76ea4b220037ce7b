//! Error types for ybk-ui

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Roster load failure
///
/// Both kinds leave the service in a user-visible failed state until the
/// next load request.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Network error, unreadable file, or non-success HTTP status
    #[error("{0}")]
    Fetch(String),

    /// Payload parsed but is not a JSON array
    #[error("Invalid data format: {0}")]
    MalformedPayload(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Roster could not be loaded (502)
    #[error("Failed to load profiles: {0}")]
    Load(#[from] LoadError),

    /// ybk-common error
    #[error("Common error: {0}")]
    Common(#[from] ybk_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Load(_) => (StatusCode::BAD_GATEWAY, "LOAD_FAILED"),
            ApiError::Common(ybk_common::Error::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            ApiError::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
