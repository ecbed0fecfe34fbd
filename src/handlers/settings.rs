// src/handlers/settings.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState, models::settings::Settings};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses((status = 200, description = "Company and rendering settings", body = Settings))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_service.get_settings().await?;
    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = Settings,
    responses(
        (status = 200, description = "Settings replaced", body = Settings),
        (status = 400, description = "Malformed color")
    )
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    Json(payload): Json<Settings>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state.settings_service.update_settings(payload).await?;
    Ok((StatusCode::OK, Json(updated)))
}
