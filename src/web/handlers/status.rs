//! # Status Board Handler
//!
//! Public queue view: turn numbers and states only, no customer data.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::TurnSummary;
use crate::web::response_types::{ApiResponse, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnSummaryView {
    pub numero_turno: i32,
    pub estado: String,
}

impl From<TurnSummary> for TurnSummaryView {
    fn from(summary: TurnSummary) -> Self {
        Self {
            numero_turno: summary.turn_number,
            estado: summary.state.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub taller: String,
    pub capacidad: i32,
    pub en_taller: Vec<TurnSummaryView>,
    pub en_espera: Vec<TurnSummaryView>,
}

/// Queue status: GET /v1/workshops/:workshop_id/status
pub async fn get_status(
    State(state): State<AppState>,
    Path(workshop_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<StatusResponse>>> {
    let status = state.engine.status(workshop_id).await?;

    Ok(Json(ApiResponse::ok(StatusResponse {
        taller: status.workshop.name,
        capacidad: status.workshop.capacity,
        en_taller: status
            .in_service
            .into_iter()
            .map(TurnSummaryView::from)
            .collect(),
        en_espera: status
            .waiting
            .into_iter()
            .map(TurnSummaryView::from)
            .collect(),
    })))
}
