//! # Health Check Handlers
//!
//! Liveness endpoint for monitoring and load balancing.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::error;

use crate::web::response_types::{ApiError, ApiResponse, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Basic health check endpoint: GET /health
///
/// Pings the database; a failing pool makes the service report unhealthy.
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<HealthResponse>>> {
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Health check database ping failed");
            ApiError(e.into())
        })?;

    Ok(Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })))
}
