//! # OpenAPI Documentation Schemas
//!
//! OpenAPI 3.0 document for the turnero web API, generated with utoipa and
//! served at `/docs/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use crate::web::handlers::status::{StatusResponse, TurnSummaryView};
use crate::web::handlers::turns::{
    CancelByPlateRequest, CancelByPlateResponse, CreateTurnRequest, CreateTurnResponse,
    MessageResponse, TurnDetail, TurnListResponse,
};

/// Main OpenAPI specification for the turnero web API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Turnero API",
        description = "Workshop turn queues: admission, status, finalization and cancellation",
    ),
    components(schemas(
        CreateTurnRequest,
        CreateTurnResponse,
        TurnDetail,
        TurnListResponse,
        MessageResponse,
        CancelByPlateRequest,
        CancelByPlateResponse,
        StatusResponse,
        TurnSummaryView,
    ))
)]
pub struct ApiDoc;

/// Serve the generated document: GET /docs/openapi.json
pub async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
