// src/models/batch.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    // One document delivered per worker, in roster order
    Individual,
    // All documents in one archive delivered after the roster
    Zip,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub week_start: NaiveDate,

    #[schema(value_type = String, format = Date, example = "2024-01-07")]
    pub week_end: NaiveDate,

    #[serde(default)]
    pub include_advances: bool,

    pub mode: BatchMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub worker_id: String,
    pub worker_name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub mode: BatchMode,
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<BatchFailure>,
    // Worker ids never attempted because the run was cancelled
    pub skipped: Vec<String>,
    pub cancelled: bool,
    // Delivered artifact names: one per worker, or the single archive
    pub files: Vec<String>,
    // Zip mode only: why the finished archive could not be written out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_error: Option<String>,
}

impl BatchResult {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// "N of M payslips generated; K failed: [a, b]"
    pub fn summary(&self) -> String {
        let mut text = format!("{} of {} payslips generated", self.succeeded, self.total);
        if !self.failures.is_empty() {
            let names: Vec<&str> = self.failures.iter().map(|f| f.worker_name.as_str()).collect();
            text.push_str(&format!("; {} failed: [{}]", self.failed(), names.join(", ")));
        }
        if self.cancelled {
            text.push_str(&format!("; cancelled, {} skipped", self.skipped.len()));
        }
        if let Some(error) = &self.archive_error {
            text.push_str(&format!("; archive not delivered: {}", error));
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum JobStatus {
    Pending,
    InProgress { current: usize, total: usize },
    Completed { result: BatchResult, summary: String },
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobAccepted {
    pub job_id: String,
}
