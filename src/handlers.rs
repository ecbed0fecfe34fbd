use serde::Deserialize;

pub mod advances;
pub mod car_fare;
pub mod contracts;
pub mod jobs;
pub mod payslips;
pub mod settings;
pub mod work_logs;
pub mod workers;

/// `?workerId=` filter shared by the list endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerQuery {
    pub worker_id: Option<String>,
}
