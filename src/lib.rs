// src/lib.rs

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod services;

use crate::{config::AppState, docs::ApiDoc};

pub fn build_router(app_state: AppState) -> Router {
    let worker_routes = Router::new()
        .route(
            "/",
            get(handlers::workers::list_workers).post(handlers::workers::create_worker),
        )
        .route(
            "/{worker_id}",
            get(handlers::workers::get_worker)
                .put(handlers::workers::update_worker)
                .delete(handlers::workers::delete_worker),
        );

    let contract_routes = Router::new()
        .route(
            "/",
            get(handlers::contracts::list_contracts).post(handlers::contracts::create_contract),
        )
        .route(
            "/{contract_id}",
            delete(handlers::contracts::delete_contract),
        );

    let work_log_routes = Router::new()
        .route(
            "/",
            get(handlers::work_logs::list_work_logs).post(handlers::work_logs::log_work),
        )
        .route("/bulk/hourly", post(handlers::work_logs::log_bulk_hourly))
        .route("/bulk/units", post(handlers::work_logs::log_bulk_units))
        .route(
            "/{log_id}",
            put(handlers::work_logs::update_work_log)
                .delete(handlers::work_logs::delete_work_log),
        );

    let advance_routes = Router::new()
        .route(
            "/",
            get(handlers::advances::list_advances).post(handlers::advances::record_advance),
        )
        .route("/summary", get(handlers::advances::advance_summary))
        .route(
            "/{advance_id}",
            delete(handlers::advances::delete_advance),
        );

    let car_fare_routes = Router::new()
        .route(
            "/",
            get(handlers::car_fare::list_car_fare).post(handlers::car_fare::add_car_fare),
        )
        .route("/bulk", post(handlers::car_fare::apply_bulk_car_fare))
        .route(
            "/{entry_id}",
            delete(handlers::car_fare::delete_car_fare),
        );

    let payslip_routes = Router::new()
        .route(
            "/",
            get(handlers::payslips::list_history).post(handlers::payslips::save_payslip),
        )
        .route("/preview", post(handlers::payslips::preview_payslip))
        .route("/render", post(handlers::payslips::render_payslip))
        .route("/batch", post(handlers::payslips::generate_batch))
        .route(
            "/{payslip_id}",
            get(handlers::payslips::get_history).delete(handlers::payslips::delete_history),
        )
        .route("/{payslip_id}/pdf", get(handlers::payslips::render_saved));

    let job_routes = Router::new()
        .route("/{job_id}", get(handlers::jobs::get_job_status))
        .route("/{job_id}/cancel", post(handlers::jobs::cancel_job));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .nest("/api/workers", worker_routes)
        .nest("/api/contracts", contract_routes)
        .nest("/api/work-logs", work_log_routes)
        .nest("/api/advances", advance_routes)
        .nest("/api/car-fare", car_fare_routes)
        .nest("/api/payslips", payslip_routes)
        .nest("/api/jobs", job_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        db::MemoryRepository,
        services::{batch_service::tests::MemorySink, document_service::tests::FakeRenderer},
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn router_builds_without_conflicting_routes() {
        let config = Config {
            database_url: "sqlite::memory:".into(),
            bind_addr: "127.0.0.1:0".into(),
            fonts_dir: "./fonts".into(),
            font_family: "Roboto".into(),
            output_dir: "./payslips".into(),
        };
        let state = AppState::assemble(
            config,
            Arc::new(MemoryRepository::new()),
            Arc::new(FakeRenderer::default()),
            Arc::new(MemorySink::default()),
        );

        let _router = build_router(state);
    }
}
