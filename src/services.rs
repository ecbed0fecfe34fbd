pub mod advance_service;
pub mod batch_service;
pub mod car_fare_service;
pub mod contract_service;
pub mod deductions;
pub mod document_service;
pub mod earnings;
pub mod jobs;
pub mod payslip_service;
pub mod settings_service;
pub mod work_log_service;
pub mod worker_service;
