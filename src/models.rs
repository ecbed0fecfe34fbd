pub mod advance;
pub mod batch;
pub mod car_fare;
pub mod contract;
pub mod payslip;
pub mod settings;
pub mod work_log;
pub mod worker;
