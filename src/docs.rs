// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Payroll Engine", description = "Local payroll backend: records, payslips and batch generation"),
    paths(
        // --- Workers ---
        handlers::workers::list_workers,
        handlers::workers::get_worker,
        handlers::workers::create_worker,
        handlers::workers::update_worker,
        handlers::workers::delete_worker,

        // --- Contracts ---
        handlers::contracts::list_contracts,
        handlers::contracts::create_contract,
        handlers::contracts::delete_contract,

        // --- Work Logs ---
        handlers::work_logs::list_work_logs,
        handlers::work_logs::log_work,
        handlers::work_logs::log_bulk_hourly,
        handlers::work_logs::log_bulk_units,
        handlers::work_logs::update_work_log,
        handlers::work_logs::delete_work_log,

        // --- Advances ---
        handlers::advances::list_advances,
        handlers::advances::advance_summary,
        handlers::advances::record_advance,
        handlers::advances::delete_advance,

        // --- Car Fare ---
        handlers::car_fare::list_car_fare,
        handlers::car_fare::add_car_fare,
        handlers::car_fare::apply_bulk_car_fare,
        handlers::car_fare::delete_car_fare,

        // --- Payslips ---
        handlers::payslips::preview_payslip,
        handlers::payslips::save_payslip,
        handlers::payslips::list_history,
        handlers::payslips::get_history,
        handlers::payslips::delete_history,
        handlers::payslips::render_payslip,
        handlers::payslips::render_saved,
        handlers::payslips::generate_batch,

        // --- Jobs ---
        handlers::jobs::get_job_status,
        handlers::jobs::cancel_job,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Workers ---
            models::worker::PayType,
            models::worker::Worker,
            models::worker::WorkerPayload,
            models::worker::WorkerRemoval,

            // --- Contracts ---
            models::contract::Contract,
            models::contract::ContractPayload,

            // --- Work Logs ---
            models::work_log::WorkLog,
            models::work_log::WorkLogPayload,
            models::work_log::BulkHoursEntry,
            models::work_log::BulkHourlyPayload,
            models::work_log::BulkUnitsEntry,
            models::work_log::BulkUnitsPayload,

            // --- Advances ---
            models::advance::Advance,
            models::advance::AdvancePayload,
            models::advance::AdvanceSummary,

            // --- Car Fare ---
            models::car_fare::CarFareType,
            models::car_fare::CarFareEntry,
            models::car_fare::CarFarePayload,
            models::car_fare::BulkCarFarePayload,
            models::car_fare::BulkCarFareOutcome,

            // --- Payslips ---
            models::payslip::PayWindow,
            models::payslip::Earnings,
            models::payslip::Deductions,
            models::payslip::Payslip,
            models::payslip::SavedPayslip,
            models::payslip::PayslipRequest,

            // --- Batch ---
            models::batch::BatchMode,
            models::batch::BatchRequest,
            models::batch::BatchFailure,
            models::batch::BatchResult,
            models::batch::JobStatus,
            models::batch::JobAccepted,

            // --- Settings ---
            models::settings::Settings,
        )
    ),
    tags(
        (name = "Workers", description = "Roster and pay terms"),
        (name = "Contracts", description = "Piece-rate contract catalogue"),
        (name = "Work Logs", description = "Daily hours and contract work"),
        (name = "Advances", description = "Cash advances against future pay"),
        (name = "Car Fare", description = "Per-day transport deductions"),
        (name = "Payslips", description = "Preview, history, PDF and batch generation"),
        (name = "Jobs", description = "Background batch progress"),
        (name = "Settings", description = "Company details and PDF styling")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/workers/{worker_id}",
            "/api/payslips/batch",
            "/api/jobs/{job_id}/cancel",
            "/api/car-fare/bulk",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
