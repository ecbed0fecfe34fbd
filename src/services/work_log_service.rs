// src/services/work_log_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CollectionKey, RecordStore},
    models::{
        contract::Contract,
        work_log::{BulkHourlyPayload, BulkUnitsPayload, WorkLog, WorkLogFilter, WorkLogPayload},
        worker::Worker,
    },
    services::earnings::log_earnings,
};

const MAX_HOURS: i64 = 24;

// Blank form fields arrive as zero; they are stored as absent.
fn non_zero(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| !v.is_zero())
}

fn find_worker<'a>(workers: &'a [Worker], worker_id: &str) -> Result<&'a Worker, AppError> {
    workers
        .iter()
        .find(|w| w.id == worker_id)
        .ok_or_else(|| AppError::WorkerNotFound(worker_id.to_string()))
}

/// Stamps `daily_earnings` with the worker's current rate.
fn stamped(mut log: WorkLog, worker: &Worker) -> WorkLog {
    log.daily_earnings = log_earnings(&log, worker);
    log
}

#[derive(Clone)]
pub struct WorkLogService {
    store: RecordStore,
}

impl WorkLogService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    async fn workers(&self) -> Result<Vec<Worker>, AppError> {
        self.store.load_records(CollectionKey::Workers).await
    }

    async fn contract(&self, contract_id: &str) -> Result<Contract, AppError> {
        let contracts: Vec<Contract> = self.store.load_records(CollectionKey::Contracts).await?;
        contracts
            .into_iter()
            .find(|c| c.id == contract_id)
            .ok_or_else(|| AppError::not_found("Contract", contract_id))
    }

    // Caller holds the store's write lock.
    async fn append(&self, new_logs: Vec<WorkLog>) -> Result<Vec<WorkLog>, AppError> {
        let mut logs: Vec<WorkLog> = self.store.load_records(CollectionKey::WorkLogs).await?;
        logs.extend(new_logs.iter().cloned());
        self.store.save_records(CollectionKey::WorkLogs, &logs).await?;
        Ok(new_logs)
    }

    /// Builds a log from a single-entry form. A named contract is resolved
    /// once and its name and rate are copied onto the log.
    async fn log_from_payload(
        &self,
        id: String,
        payload: WorkLogPayload,
        worker: &Worker,
    ) -> Result<WorkLog, AppError> {
        let (contract_job, unit_rate) = match payload.contract_id.as_deref() {
            Some(contract_id) if !contract_id.is_empty() => {
                let contract = self.contract(contract_id).await?;
                (Some(contract.name), Some(contract.rate))
            }
            _ => (
                payload.task.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
                non_zero(payload.unit_rate),
            ),
        };

        let log = WorkLog {
            id,
            worker_id: worker.id.clone(),
            worker_name: Some(worker.name.clone()),
            date: payload.date,
            hours: non_zero(payload.hours),
            contract_job,
            contract_amount: non_zero(payload.contract_amount),
            units: non_zero(payload.units),
            unit_rate,
            daily_earnings: Decimal::ZERO,
        };
        Ok(stamped(log, worker))
    }

    pub async fn log_work(&self, payload: WorkLogPayload) -> Result<WorkLog, AppError> {
        let _writes = self.store.write_lock().await;
        let workers = self.workers().await?;
        let worker = find_worker(&workers, &payload.worker_id)?;
        let log = self
            .log_from_payload(Uuid::new_v4().to_string(), payload, worker)
            .await?;

        let mut saved = self.append(vec![log]).await?;
        let log = saved.remove(0);
        tracing::info!(
            work_log_id = %log.id,
            worker_id = %log.worker_id,
            daily_earnings = %log.daily_earnings,
            "work logged"
        );
        Ok(log)
    }

    /// One hourly log per selected worker; a per-worker value overrides the default.
    pub async fn log_bulk_hourly(&self, payload: BulkHourlyPayload) -> Result<Vec<WorkLog>, AppError> {
        let _writes = self.store.write_lock().await;
        let workers = self.workers().await?;
        let mut logs = Vec::with_capacity(payload.entries.len());

        for entry in &payload.entries {
            let worker = find_worker(&workers, &entry.worker_id)?;
            let hours = entry.hours.unwrap_or(payload.default_hours);
            if hours <= Decimal::ZERO || hours > Decimal::from(MAX_HOURS) {
                return Err(AppError::BadRequest(format!(
                    "hours for {} must be greater than 0 and at most {}",
                    worker.name, MAX_HOURS
                )));
            }
            logs.push(stamped(hourly_log(worker, payload.date, hours), worker));
        }

        let logs = self.append(logs).await?;
        tracing::info!(date = %payload.date, count = logs.len(), "bulk hours logged");
        Ok(logs)
    }

    /// One unit log per worker with positive units, priced at the contract's rate.
    pub async fn log_bulk_units(&self, payload: BulkUnitsPayload) -> Result<Vec<WorkLog>, AppError> {
        let _writes = self.store.write_lock().await;
        let contract = self.contract(&payload.contract_id).await?;
        let workers = self.workers().await?;

        let mut logs = Vec::new();
        for entry in payload.entries.iter().filter(|e| e.units > Decimal::ZERO) {
            let worker = find_worker(&workers, &entry.worker_id)?;
            let log = WorkLog {
                id: Uuid::new_v4().to_string(),
                worker_id: worker.id.clone(),
                worker_name: Some(worker.name.clone()),
                date: payload.date,
                hours: None,
                contract_job: Some(contract.name.clone()),
                contract_amount: None,
                units: Some(entry.units),
                unit_rate: Some(contract.rate),
                daily_earnings: Decimal::ZERO,
            };
            logs.push(stamped(log, worker));
        }

        if logs.is_empty() {
            return Err(AppError::BadRequest(
                "enter units for at least one worker".to_string(),
            ));
        }

        let logs = self.append(logs).await?;
        tracing::info!(
            date = %payload.date,
            contract = %contract.name,
            count = logs.len(),
            "bulk units logged"
        );
        Ok(logs)
    }

    /// Rewrites a log from the form and re-stamps its earnings.
    pub async fn update_work_log(
        &self,
        log_id: &str,
        payload: WorkLogPayload,
    ) -> Result<WorkLog, AppError> {
        let _writes = self.store.write_lock().await;
        let workers = self.workers().await?;
        let worker = find_worker(&workers, &payload.worker_id)?;
        let mut logs: Vec<WorkLog> = self.store.load_records(CollectionKey::WorkLogs).await?;
        let index = logs
            .iter()
            .position(|l| l.id == log_id)
            .ok_or_else(|| AppError::not_found("WorkLog", log_id))?;

        let updated = self
            .log_from_payload(log_id.to_string(), payload, worker)
            .await?;
        logs[index] = updated.clone();
        self.store.save_records(CollectionKey::WorkLogs, &logs).await?;

        tracing::info!(work_log_id = log_id, "work log updated");
        Ok(updated)
    }

    /// Newest date first.
    pub async fn list_work_logs(&self, filter: &WorkLogFilter) -> Result<Vec<WorkLog>, AppError> {
        let mut logs: Vec<WorkLog> = self.store.load_records(CollectionKey::WorkLogs).await?;
        logs.retain(|l| {
            filter.worker_id.as_ref().is_none_or(|id| &l.worker_id == id)
                && filter.from.is_none_or(|from| l.date >= from)
                && filter.to.is_none_or(|to| l.date <= to)
        });
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }

    pub async fn delete_work_log(&self, log_id: &str) -> Result<(), AppError> {
        let _writes = self.store.write_lock().await;
        let mut logs: Vec<WorkLog> = self.store.load_records(CollectionKey::WorkLogs).await?;
        let before = logs.len();
        logs.retain(|l| l.id != log_id);
        if logs.len() == before {
            return Err(AppError::not_found("WorkLog", log_id));
        }
        self.store.save_records(CollectionKey::WorkLogs, &logs).await
    }
}

fn hourly_log(worker: &Worker, date: NaiveDate, hours: Decimal) -> WorkLog {
    WorkLog {
        id: Uuid::new_v4().to_string(),
        worker_id: worker.id.clone(),
        worker_name: Some(worker.name.clone()),
        date,
        hours: Some(hours),
        contract_job: None,
        contract_amount: None,
        units: None,
        unit_rate: None,
        daily_earnings: Decimal::ZERO,
    }
}
