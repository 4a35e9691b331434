//! # Web API Module
//!
//! Axum-based REST API over the queue engine.
//!
//! ## Core Components
//!
//! - [`routes`] - HTTP route definitions, public vs. auth-gated
//! - [`handlers`] - Request handlers per endpoint group
//! - [`middleware`] - Bearer-token auth and request-id tagging
//! - [`state`] - Shared application state (engine, directory, notifier)
//! - [`response_types`] - The `{success, data, error}` envelope and the
//!   error-to-status mapping
//! - [`openapi`] - Generated API document

pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response_types;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::routing::get;
use axum::Router;

use state::AppState;

/// Create the main Axum application with all routes and middleware.
pub fn create_app(app_state: AppState) -> Router {
    // The engine enforces the request deadline itself and commits past it;
    // the outer HTTP timeout is a backstop with room for that commit.
    let request_timeout =
        Duration::from_millis(app_state.config.request_deadline_ms) + Duration::from_secs(5);

    let v1_routes = routes::public_v1_routes().merge(
        routes::protected_v1_routes().route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::require_auth,
        )),
    );

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/docs/openapi.json", get(openapi::serve_openapi))
        .nest("/v1", v1_routes)
        .layer(axum::middleware::from_fn(
            middleware::request_id::add_request_id,
        ))
        .layer(tower_http::timeout::TimeoutLayer::new(request_timeout))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}
