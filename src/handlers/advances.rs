// src/handlers/advances.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::WorkerQuery,
    models::advance::{Advance, AdvancePayload, AdvanceSummary},
};

// GET /api/advances
#[utoipa::path(
    get,
    path = "/api/advances",
    tag = "Advances",
    responses((status = 200, description = "Advances, newest first", body = Vec<Advance>)),
    params(("workerId" = Option<String>, Query, description = "Only this worker"))
)]
pub async fn list_advances(
    State(app_state): State<AppState>,
    Query(query): Query<WorkerQuery>,
) -> Result<impl IntoResponse, AppError> {
    let advances = app_state
        .advance_service
        .list_advances(query.worker_id.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(advances)))
}

// GET /api/advances/summary
#[utoipa::path(
    get,
    path = "/api/advances/summary",
    tag = "Advances",
    responses((status = 200, description = "Totals per worker", body = Vec<AdvanceSummary>))
)]
pub async fn advance_summary(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.advance_service.advance_summary().await?;
    Ok((StatusCode::OK, Json(summary)))
}

// POST /api/advances
#[utoipa::path(
    post,
    path = "/api/advances",
    tag = "Advances",
    request_body = AdvancePayload,
    responses(
        (status = 201, description = "Advance recorded", body = Advance),
        (status = 404, description = "Unknown worker"),
        (status = 422, description = "Invalid fields")
    )
)]
pub async fn record_advance(
    State(app_state): State<AppState>,
    Json(payload): Json<AdvancePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let advance = app_state.advance_service.record_advance(payload).await?;
    Ok((StatusCode::CREATED, Json(advance)))
}

// DELETE /api/advances/{id}
#[utoipa::path(
    delete,
    path = "/api/advances/{advance_id}",
    tag = "Advances",
    responses(
        (status = 204, description = "Advance removed"),
        (status = 404, description = "Unknown advance")
    ),
    params(("advance_id" = String, Path, description = "Advance id"))
)]
pub async fn delete_advance(
    State(app_state): State<AppState>,
    Path(advance_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.advance_service.delete_advance(&advance_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
