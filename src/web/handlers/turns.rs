//! # Turn Handlers
//!
//! HTTP handlers for turn creation, listing, finalization and public
//! cancellation by plate.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Turn;
use crate::validation::validate_create_turn;
use crate::web::response_types::{ApiResponse, ApiResult};
use crate::web::state::AppState;

/// Request body for turn creation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTurnRequest {
    pub nombre_cliente: String,
    pub telefono: String,
    pub modelo_vehiculo: String,
    pub patente: String,
    pub descripcion_problema: Option<String>,
}

/// Response for successful turn creation
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTurnResponse {
    pub id: i64,
    pub numero_turno: i32,
    pub estado: String,
}

/// Full turn view for the auth-gated listing. Timestamps are ISO-8601 at
/// seconds precision.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnDetail {
    pub id: i64,
    pub numero_turno: i32,
    pub nombre_cliente: String,
    pub telefono: String,
    pub modelo_vehiculo: String,
    pub patente: String,
    pub descripcion_problema: Option<String>,
    pub estado: String,
    pub creado_en: String,
    pub iniciado_en: Option<String>,
    pub finalizado_en: Option<String>,
    pub cancelado_en: Option<String>,
}

impl From<Turn> for TurnDetail {
    fn from(turn: Turn) -> Self {
        Self {
            id: turn.id,
            numero_turno: turn.turn_number,
            nombre_cliente: turn.customer_name,
            telefono: turn.phone,
            modelo_vehiculo: turn.vehicle_model,
            patente: turn.plate,
            descripcion_problema: turn.problem,
            estado: turn.state,
            creado_en: iso_seconds(turn.created_at),
            iniciado_en: turn.started_at.map(iso_seconds),
            finalizado_en: turn.finalized_at.map(iso_seconds),
            cancelado_en: turn.cancelled_at.map(iso_seconds),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TurnListResponse {
    pub turnos: Vec<TurnDetail>,
}

#[derive(Debug, Deserialize)]
pub struct TurnListQuery {
    pub patente: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CancelByPlateRequest {
    pub patente: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelByPlateResponse {
    pub numero_turno: i32,
    pub message: String,
}

fn iso_seconds(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Create a new turn: POST /v1/workshops/:workshop_id/turns
pub async fn create_turn(
    State(state): State<AppState>,
    Path(workshop_id): Path<i64>,
    Json(request): Json<CreateTurnRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CreateTurnResponse>>)> {
    let payload = validate_create_turn(
        &request.nombre_cliente,
        &request.telefono,
        &request.modelo_vehiculo,
        &request.patente,
        request.descripcion_problema.as_deref(),
    )?;

    let turn = state.engine.create_turn(workshop_id, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CreateTurnResponse {
            id: turn.id,
            numero_turno: turn.turn_number,
            estado: turn.state,
        })),
    ))
}

/// List turns: GET /v1/workshops/:workshop_id/turns?patente=
///
/// Without a plate filter only the live queue is returned; with one, the
/// search covers finished turns too.
pub async fn list_turns(
    State(state): State<AppState>,
    Path(workshop_id): Path<i64>,
    Query(query): Query<TurnListQuery>,
) -> ApiResult<Json<ApiResponse<TurnListResponse>>> {
    let turns = state
        .engine
        .list(workshop_id, query.patente.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok(TurnListResponse {
        turnos: turns.into_iter().map(TurnDetail::from).collect(),
    })))
}

/// Finalize a turn: POST /v1/turns/:turn_id/finalize
pub async fn finalize_turn(
    State(state): State<AppState>,
    Path(turn_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    let turn = state.engine.finalize_turn(turn_id).await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: format!("Turn #{} finalized", turn.turn_number),
    })))
}

/// Cancel the active turn for a plate:
/// POST /v1/workshops/:workshop_id/turns/cancel-by-plate
pub async fn cancel_by_plate(
    State(state): State<AppState>,
    Path(workshop_id): Path<i64>,
    Json(request): Json<CancelByPlateRequest>,
) -> ApiResult<Json<ApiResponse<CancelByPlateResponse>>> {
    let turn = state
        .engine
        .cancel_by_plate(workshop_id, &request.patente)
        .await?;

    Ok(Json(ApiResponse::ok(CancelByPlateResponse {
        numero_turno: turn.turn_number,
        message: format!("Turn #{} cancelled", turn.turn_number),
    })))
}
