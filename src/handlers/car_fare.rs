// src/handlers/car_fare.rs

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
    models::car_fare::{BulkCarFareOutcome, BulkCarFarePayload, CarFareEntry, CarFarePayload},
};

// GET /api/car-fare
#[utoipa::path(
    get,
    path = "/api/car-fare",
    tag = "Car Fare",
    responses((status = 200, description = "Entries, newest first", body = Vec<CarFareEntry>)),
    params(("workerId" = Option<String>, Query, description = "Only this worker"))
)]
pub async fn list_car_fare(
    State(app_state): State<AppState>,
    Query(query): Query<WorkerQuery>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state
        .car_fare_service
        .list_car_fare(query.worker_id.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(entries)))
}

// POST /api/car-fare
#[utoipa::path(
    post,
    path = "/api/car-fare",
    tag = "Car Fare",
    request_body = CarFarePayload,
    responses(
        (status = 201, description = "Entry added", body = CarFareEntry),
        (status = 404, description = "Unknown worker"),
        (status = 409, description = "Worker already has an entry on that date")
    )
)]
pub async fn add_car_fare(
    State(app_state): State<AppState>,
    Json(payload): Json<CarFarePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let entry = app_state.car_fare_service.add_car_fare(payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

// POST /api/car-fare/bulk
#[utoipa::path(
    post,
    path = "/api/car-fare/bulk",
    tag = "Car Fare",
    request_body = BulkCarFarePayload,
    responses((status = 200, description = "Entries added for car-fare workers", body = BulkCarFareOutcome))
)]
pub async fn apply_bulk_car_fare(
    State(app_state): State<AppState>,
    Json(payload): Json<BulkCarFarePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let outcome = app_state.car_fare_service.apply_bulk_car_fare(payload).await?;
    Ok((StatusCode::OK, Json(outcome)))
}

// DELETE /api/car-fare/{id}
#[utoipa::path(
    delete,
    path = "/api/car-fare/{entry_id}",
    tag = "Car Fare",
    responses(
        (status = 204, description = "Entry removed"),
        (status = 404, description = "Unknown entry")
    ),
    params(("entry_id" = String, Path, description = "Car fare entry id"))
)]
pub async fn delete_car_fare(
    State(app_state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.car_fare_service.delete_car_fare(&entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
