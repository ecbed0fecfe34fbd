// src/handlers/work_logs.rs

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
    models::work_log::{BulkHourlyPayload, BulkUnitsPayload, WorkLog, WorkLogFilter, WorkLogPayload},
};

// GET /api/work-logs
#[utoipa::path(
    get,
    path = "/api/work-logs",
    tag = "Work Logs",
    responses((status = 200, description = "Matching logs, newest first", body = Vec<WorkLog>)),
    params(
        ("workerId" = Option<String>, Query, description = "Only this worker"),
        ("from" = Option<String>, Query, description = "First day, inclusive (YYYY-MM-DD)"),
        ("to" = Option<String>, Query, description = "Last day, inclusive (YYYY-MM-DD)")
    )
)]
pub async fn list_work_logs(
    State(app_state): State<AppState>,
    Query(filter): Query<WorkLogFilter>,
) -> Result<impl IntoResponse, AppError> {
    let logs = app_state.work_log_service.list_work_logs(&filter).await?;
    Ok((StatusCode::OK, Json(logs)))
}

// POST /api/work-logs
#[utoipa::path(
    post,
    path = "/api/work-logs",
    tag = "Work Logs",
    request_body = WorkLogPayload,
    responses(
        (status = 201, description = "Log created with its earnings stamp", body = WorkLog),
        (status = 404, description = "Unknown worker or contract"),
        (status = 422, description = "Invalid fields")
    )
)]
pub async fn log_work(
    State(app_state): State<AppState>,
    Json(payload): Json<WorkLogPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let log = app_state.work_log_service.log_work(payload).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

// POST /api/work-logs/bulk/hourly
#[utoipa::path(
    post,
    path = "/api/work-logs/bulk/hourly",
    tag = "Work Logs",
    request_body = BulkHourlyPayload,
    responses(
        (status = 201, description = "One log per selected worker", body = Vec<WorkLog>),
        (status = 400, description = "Hours out of range")
    )
)]
pub async fn log_bulk_hourly(
    State(app_state): State<AppState>,
    Json(payload): Json<BulkHourlyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let logs = app_state.work_log_service.log_bulk_hourly(payload).await?;
    Ok((StatusCode::CREATED, Json(logs)))
}

// POST /api/work-logs/bulk/units
#[utoipa::path(
    post,
    path = "/api/work-logs/bulk/units",
    tag = "Work Logs",
    request_body = BulkUnitsPayload,
    responses(
        (status = 201, description = "One log per worker with units", body = Vec<WorkLog>),
        (status = 400, description = "No worker had units")
    )
)]
pub async fn log_bulk_units(
    State(app_state): State<AppState>,
    Json(payload): Json<BulkUnitsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let logs = app_state.work_log_service.log_bulk_units(payload).await?;
    Ok((StatusCode::CREATED, Json(logs)))
}

// PUT /api/work-logs/{id}
#[utoipa::path(
    put,
    path = "/api/work-logs/{log_id}",
    tag = "Work Logs",
    request_body = WorkLogPayload,
    responses(
        (status = 200, description = "Log rewritten and re-stamped", body = WorkLog),
        (status = 404, description = "Unknown log, worker or contract")
    ),
    params(("log_id" = String, Path, description = "Work log id"))
)]
pub async fn update_work_log(
    State(app_state): State<AppState>,
    Path(log_id): Path<String>,
    Json(payload): Json<WorkLogPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let log = app_state
        .work_log_service
        .update_work_log(&log_id, payload)
        .await?;
    Ok((StatusCode::OK, Json(log)))
}

// DELETE /api/work-logs/{id}
#[utoipa::path(
    delete,
    path = "/api/work-logs/{log_id}",
    tag = "Work Logs",
    responses(
        (status = 204, description = "Log removed"),
        (status = 404, description = "Unknown log")
    ),
    params(("log_id" = String, Path, description = "Work log id"))
)]
pub async fn delete_work_log(
    State(app_state): State<AppState>,
    Path(log_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.work_log_service.delete_work_log(&log_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
