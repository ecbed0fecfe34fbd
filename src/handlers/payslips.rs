// src/handlers/payslips.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        batch::{BatchRequest, JobAccepted},
        payslip::{HistoryFilter, Payslip, PayslipRequest, SavedPayslip},
    },
    services::document_service::RenderedDocument,
};

fn pdf_response(document: RenderedDocument) -> Response {
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", document.filename),
        ),
    ];
    (headers, document.bytes).into_response()
}

// POST /api/payslips/preview
#[utoipa::path(
    post,
    path = "/api/payslips/preview",
    tag = "Payslips",
    request_body = PayslipRequest,
    responses(
        (status = 200, description = "Computed payslip, not saved", body = Payslip),
        (status = 400, description = "Week end precedes week start"),
        (status = 404, description = "Unknown worker")
    )
)]
pub async fn preview_payslip(
    State(app_state): State<AppState>,
    Json(request): Json<PayslipRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payslip = app_state.payslip_service.preview(&request).await?;
    Ok((StatusCode::OK, Json(payslip)))
}

// POST /api/payslips
#[utoipa::path(
    post,
    path = "/api/payslips",
    tag = "Payslips",
    request_body = Payslip,
    responses(
        (status = 201, description = "Payslip added to history", body = SavedPayslip),
        (status = 400, description = "Totals do not match the payslip's records"),
        (status = 404, description = "Unknown worker")
    )
)]
pub async fn save_payslip(
    State(app_state): State<AppState>,
    Json(payslip): Json<Payslip>,
) -> Result<impl IntoResponse, AppError> {
    let saved = app_state.payslip_service.save(payslip).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

// GET /api/payslips
#[utoipa::path(
    get,
    path = "/api/payslips",
    tag = "Payslips",
    responses((status = 200, description = "History, newest first", body = Vec<SavedPayslip>)),
    params(("workerId" = Option<String>, Query, description = "Only this worker"))
)]
pub async fn list_history(
    State(app_state): State<AppState>,
    Query(filter): Query<HistoryFilter>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state.payslip_service.list_history(&filter).await?;
    Ok((StatusCode::OK, Json(history)))
}

// GET /api/payslips/{id}
#[utoipa::path(
    get,
    path = "/api/payslips/{payslip_id}",
    tag = "Payslips",
    responses(
        (status = 200, description = "Saved payslip", body = SavedPayslip),
        (status = 404, description = "Unknown payslip")
    ),
    params(("payslip_id" = String, Path, description = "Saved payslip id"))
)]
pub async fn get_history(
    State(app_state): State<AppState>,
    Path(payslip_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let saved = app_state.payslip_service.get_history(&payslip_id).await?;
    Ok((StatusCode::OK, Json(saved)))
}

// DELETE /api/payslips/{id}
#[utoipa::path(
    delete,
    path = "/api/payslips/{payslip_id}",
    tag = "Payslips",
    responses(
        (status = 204, description = "Removed from history"),
        (status = 404, description = "Unknown payslip")
    ),
    params(("payslip_id" = String, Path, description = "Saved payslip id"))
)]
pub async fn delete_history(
    State(app_state): State<AppState>,
    Path(payslip_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.payslip_service.delete_history(&payslip_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/payslips/render
#[utoipa::path(
    post,
    path = "/api/payslips/render",
    tag = "Payslips",
    request_body = Payslip,
    responses(
        (status = 200, description = "PDF document (application/pdf)"),
        (status = 500, description = "Rendering failed")
    )
)]
pub async fn render_payslip(
    State(app_state): State<AppState>,
    Json(payslip): Json<Payslip>,
) -> Result<Response, AppError> {
    let document = app_state.payslip_service.render(&payslip).await?;
    Ok(pdf_response(document))
}

// GET /api/payslips/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/payslips/{payslip_id}/pdf",
    tag = "Payslips",
    responses(
        (status = 200, description = "PDF document (application/pdf)"),
        (status = 404, description = "Unknown payslip")
    ),
    params(("payslip_id" = String, Path, description = "Saved payslip id"))
)]
pub async fn render_saved(
    State(app_state): State<AppState>,
    Path(payslip_id): Path<String>,
) -> Result<Response, AppError> {
    let document = app_state.payslip_service.render_saved(&payslip_id).await?;
    Ok(pdf_response(document))
}

// POST /api/payslips/batch
#[utoipa::path(
    post,
    path = "/api/payslips/batch",
    tag = "Payslips",
    request_body = BatchRequest,
    responses(
        (status = 202, description = "Batch scheduled; poll /api/jobs/{job_id}", body = JobAccepted),
        (status = 400, description = "Week end precedes week start")
    )
)]
pub async fn generate_batch(
    State(app_state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let job_id = app_state
        .jobs
        .schedule_batch(app_state.batch_service.clone(), request)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(JobAccepted { job_id })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        db::{CollectionKey, MemoryRepository, RecordStore},
        services::{
            batch_service::tests::MemorySink,
            document_service::tests::FakeRenderer,
            payslip_service::tests::{day, week_snapshot},
        },
    };
    use std::sync::Arc;

    async fn state() -> AppState {
        let repo = Arc::new(MemoryRepository::new());
        let store = RecordStore::new(repo.clone());
        let snapshot = week_snapshot();
        store.save_records(CollectionKey::Workers, &snapshot.workers).await.unwrap();
        store.save_records(CollectionKey::WorkLogs, &snapshot.work_logs).await.unwrap();
        store.save_records(CollectionKey::Advances, &snapshot.advances).await.unwrap();

        let config = Config {
            database_url: "sqlite::memory:".into(),
            bind_addr: "127.0.0.1:0".into(),
            fonts_dir: "./fonts".into(),
            font_family: "Roboto".into(),
            output_dir: "./payslips".into(),
        };
        AppState::assemble(
            config,
            repo,
            Arc::new(FakeRenderer::default()),
            Arc::new(MemorySink::default()),
        )
    }

    #[tokio::test]
    async fn render_sets_download_headers() {
        let state = state().await;
        let payslip = state
            .payslip_service
            .preview(&PayslipRequest {
                worker_id: "w1".into(),
                week_start: day(1),
                week_end: day(7),
                include_advances: true,
            })
            .await
            .unwrap();

        let response = render_payslip(State(state), Json(payslip)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"payslip_Jane_Doe_2024-01-07.pdf\""
        );
    }

    #[tokio::test]
    async fn preview_errors_map_to_status_codes() {
        let state = state().await;
        let reversed = preview_payslip(
            State(state.clone()),
            Json(PayslipRequest {
                worker_id: "w1".into(),
                week_start: day(7),
                week_end: day(1),
                include_advances: true,
            }),
        )
        .await;
        let response = match reversed {
            Ok(_) => panic!("reversed window accepted"),
            Err(e) => e.into_response(),
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let missing = preview_payslip(
            State(state),
            Json(PayslipRequest {
                worker_id: "ghost".into(),
                week_start: day(1),
                week_end: day(7),
                include_advances: true,
            }),
        )
        .await;
        let response = match missing {
            Ok(_) => panic!("unknown worker accepted"),
            Err(e) => e.into_response(),
        };
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
