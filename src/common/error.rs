// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Worker not found: {0}")]
    WorkerNotFound(String),

    #[error("Invalid date range: week end {end} precedes week start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Rendering failed: {0}")]
    Rendering(String),

    #[error("Car fare entry already exists for worker {worker_id} on {date}")]
    DuplicateCarFare { worker_id: String, date: NaiveDate },

    // Contracts, work logs, advances, payslips, jobs
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound { entity, id: id.into() }
    }

    pub fn rendering(message: impl std::fmt::Display) -> Self {
        AppError::Rendering(message.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            e @ (AppError::WorkerNotFound(_) | AppError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            e @ (AppError::InvalidDateRange { .. } | AppError::BadRequest(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            e @ AppError::DuplicateCarFare { .. } => (StatusCode::CONFLICT, e.to_string()),
            e @ AppError::Rendering(_) => {
                tracing::error!("{}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }

            // Everything else is logged in full and surfaced as a generic 500.
            ref e => {
                tracing::error!("Internal server error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
