//! # Authentication Middleware
//!
//! Bearer-token gate for the administrative endpoints. The session layer
//! proper lives outside this service; the engine never sees the caller.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::error::TurneroError;
use crate::web::response_types::ApiError;
use crate::web::state::AppState;

/// Authentication middleware for protected endpoints.
///
/// Checks `Authorization: Bearer <token>` against the configured API
/// token. With no token configured the gate is open (development mode).
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.api_token.as_deref() else {
        debug!("No API token configured - allowing request");
        return Ok(next.run(request).await);
    };

    let token = request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if token == expected => Ok(next.run(request).await),
        Some(_) => {
            warn!("Rejected request with invalid API token");
            Err(ApiError(TurneroError::Unauthenticated))
        }
        None => Err(ApiError(TurneroError::Unauthenticated)),
    }
}
