// src/handlers/jobs.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{common::error::AppError, config::AppState, models::batch::JobStatus};

// GET /api/jobs/{id}
#[utoipa::path(
    get,
    path = "/api/jobs/{job_id}",
    tag = "Jobs",
    responses(
        (status = 200, description = "Current state of the batch job", body = JobStatus),
        (status = 404, description = "Unknown job")
    ),
    params(("job_id" = String, Path, description = "Id returned when the batch was scheduled"))
)]
pub async fn get_job_status(
    State(app_state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let status = app_state.jobs.status(&job_id).await?;
    Ok((StatusCode::OK, Json(status)))
}

// POST /api/jobs/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/jobs/{job_id}/cancel",
    tag = "Jobs",
    responses(
        (status = 202, description = "Cancellation requested; takes effect before the next worker"),
        (status = 404, description = "Unknown job")
    ),
    params(("job_id" = String, Path, description = "Id returned when the batch was scheduled"))
)]
pub async fn cancel_job(
    State(app_state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.jobs.cancel(&job_id).await?;
    Ok(StatusCode::ACCEPTED)
}
