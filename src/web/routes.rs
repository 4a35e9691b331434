//! # HTTP Route Definitions
//!
//! Public routes carry customer-facing operations; protected routes are
//! the administrative surface behind the bearer-token gate.

use axum::routing::{get, post};
use axum::Router;

use crate::web::handlers;
use crate::web::state::AppState;

/// Customer-facing routes under /v1
pub fn public_v1_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/workshops/:workshop_id/turns",
            post(handlers::turns::create_turn),
        )
        .route(
            "/workshops/:workshop_id/status",
            get(handlers::status::get_status),
        )
        .route(
            "/workshops/:workshop_id/turns/cancel-by-plate",
            post(handlers::turns::cancel_by_plate),
        )
}

/// Administrative routes under /v1, auth required
pub fn protected_v1_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/workshops/:workshop_id/turns",
            get(handlers::turns::list_turns),
        )
        .route(
            "/turns/:turn_id/finalize",
            post(handlers::turns::finalize_turn),
        )
}
