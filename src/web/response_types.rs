//! # Web API Response Types
//!
//! The uniform response envelope and the error-to-HTTP mapping. Every
//! endpoint answers `{ success, data, error }`; business error kinds map to
//! their status codes here, in one place.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::error::TurneroError;

/// Uniform wire envelope for all endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Web-facing wrapper around the core error, carrying the HTTP mapping.
#[derive(Debug)]
pub struct ApiError(pub TurneroError);

impl From<TurneroError> for ApiError {
    fn from(error: TurneroError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, data, message) = match &self.0 {
            TurneroError::Validation(_) => (StatusCode::BAD_REQUEST, None, self.0.to_string()),
            TurneroError::NotFound(_) => (StatusCode::NOT_FOUND, None, self.0.to_string()),
            TurneroError::DuplicatePlate { turn_number } => (
                StatusCode::CONFLICT,
                Some(json!({ "numeroTurno": turn_number })),
                self.0.to_string(),
            ),
            TurneroError::StateConflict { .. } => {
                (StatusCode::CONFLICT, None, self.0.to_string())
            }
            TurneroError::Forbidden(_) => (StatusCode::FORBIDDEN, None, self.0.to_string()),
            TurneroError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, None, self.0.to_string())
            }
            TurneroError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, None, self.0.to_string()),
            TurneroError::DatabaseError(_)
            | TurneroError::ConfigurationError(_)
            | TurneroError::Internal(_) => {
                error!(error = %self.0, "Internal error surfaced to HTTP");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "data": data,
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for web API handlers
pub type ApiResult<T> = Result<T, ApiError>;
