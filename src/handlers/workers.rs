// src/handlers/workers.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::worker::{Worker, WorkerPayload, WorkerRemoval},
};

// GET /api/workers
#[utoipa::path(
    get,
    path = "/api/workers",
    tag = "Workers",
    responses(
        (status = 200, description = "Roster in stored order", body = Vec<Worker>)
    )
)]
pub async fn list_workers(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let workers = app_state.worker_service.list_workers().await?;
    Ok((StatusCode::OK, Json(workers)))
}

// GET /api/workers/{id}
#[utoipa::path(
    get,
    path = "/api/workers/{worker_id}",
    tag = "Workers",
    responses(
        (status = 200, description = "Worker", body = Worker),
        (status = 404, description = "Unknown worker")
    ),
    params(("worker_id" = String, Path, description = "Worker id"))
)]
pub async fn get_worker(
    State(app_state): State<AppState>,
    Path(worker_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let worker = app_state.worker_service.get_worker(&worker_id).await?;
    Ok((StatusCode::OK, Json(worker)))
}

// POST /api/workers
#[utoipa::path(
    post,
    path = "/api/workers",
    tag = "Workers",
    request_body = WorkerPayload,
    responses(
        (status = 201, description = "Worker created", body = Worker),
        (status = 422, description = "Invalid fields")
    )
)]
pub async fn create_worker(
    State(app_state): State<AppState>,
    Json(payload): Json<WorkerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let worker = app_state.worker_service.create_worker(payload).await?;
    Ok((StatusCode::CREATED, Json(worker)))
}

// PUT /api/workers/{id}
#[utoipa::path(
    put,
    path = "/api/workers/{worker_id}",
    tag = "Workers",
    request_body = WorkerPayload,
    responses(
        (status = 200, description = "Worker updated", body = Worker),
        (status = 404, description = "Unknown worker")
    ),
    params(("worker_id" = String, Path, description = "Worker id"))
)]
pub async fn update_worker(
    State(app_state): State<AppState>,
    Path(worker_id): Path<String>,
    Json(payload): Json<WorkerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let worker = app_state
        .worker_service
        .update_worker(&worker_id, payload)
        .await?;
    Ok((StatusCode::OK, Json(worker)))
}

// DELETE /api/workers/{id}
#[utoipa::path(
    delete,
    path = "/api/workers/{worker_id}",
    tag = "Workers",
    responses(
        (status = 200, description = "Worker removed with their work logs and advances", body = WorkerRemoval),
        (status = 404, description = "Unknown worker")
    ),
    params(("worker_id" = String, Path, description = "Worker id"))
)]
pub async fn delete_worker(
    State(app_state): State<AppState>,
    Path(worker_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let removal = app_state.worker_service.delete_worker(&worker_id).await?;
    Ok((StatusCode::OK, Json(removal)))
}
