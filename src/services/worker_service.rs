// src/services/worker_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CollectionKey, RecordStore, WriteBatch},
    models::{
        advance::Advance,
        work_log::WorkLog,
        worker::{Worker, WorkerPayload, WorkerRemoval},
    },
};

#[derive(Clone)]
pub struct WorkerService {
    store: RecordStore,
}

impl WorkerService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Stored order, which is also the batch roster order.
    pub async fn list_workers(&self) -> Result<Vec<Worker>, AppError> {
        self.store.load_records(CollectionKey::Workers).await
    }

    pub async fn get_worker(&self, worker_id: &str) -> Result<Worker, AppError> {
        self.list_workers()
            .await?
            .into_iter()
            .find(|w| w.id == worker_id)
            .ok_or_else(|| AppError::WorkerNotFound(worker_id.to_string()))
    }

    pub async fn create_worker(&self, payload: WorkerPayload) -> Result<Worker, AppError> {
        let _writes = self.store.write_lock().await;
        let mut workers = self.list_workers().await?;
        let worker = payload.into_worker(Uuid::new_v4().to_string());
        workers.push(worker.clone());
        self.store.save_records(CollectionKey::Workers, &workers).await?;

        tracing::info!(worker_id = %worker.id, name = %worker.name, "worker created");
        Ok(worker)
    }

    /// Replaces the worker's fields in place, keeping its roster position.
    pub async fn update_worker(
        &self,
        worker_id: &str,
        payload: WorkerPayload,
    ) -> Result<Worker, AppError> {
        let _writes = self.store.write_lock().await;
        let mut workers = self.list_workers().await?;
        let slot = workers
            .iter_mut()
            .find(|w| w.id == worker_id)
            .ok_or_else(|| AppError::WorkerNotFound(worker_id.to_string()))?;

        *slot = payload.into_worker(worker_id.to_string());
        let updated = slot.clone();
        self.store.save_records(CollectionKey::Workers, &workers).await?;

        tracing::info!(worker_id, "worker updated");
        Ok(updated)
    }

    /// Removes the worker with their work logs and advances in one atomic write.
    /// Car fare entries and saved payslips are left as history.
    pub async fn delete_worker(&self, worker_id: &str) -> Result<WorkerRemoval, AppError> {
        let _writes = self.store.write_lock().await;

        // 1. Drop the worker
        let mut workers = self.list_workers().await?;
        let before = workers.len();
        workers.retain(|w| w.id != worker_id);
        if workers.len() == before {
            return Err(AppError::WorkerNotFound(worker_id.to_string()));
        }

        // 2. Drop their work logs and advances
        let mut work_logs: Vec<WorkLog> = self.store.load_records(CollectionKey::WorkLogs).await?;
        let logs_before = work_logs.len();
        work_logs.retain(|l| l.worker_id != worker_id);

        let mut advances: Vec<Advance> = self.store.load_records(CollectionKey::Advances).await?;
        let advances_before = advances.len();
        advances.retain(|a| a.worker_id != worker_id);

        // 3. Write all three collections or none
        let batch = WriteBatch::new()
            .put(CollectionKey::Workers, &workers)?
            .put(CollectionKey::WorkLogs, &work_logs)?
            .put(CollectionKey::Advances, &advances)?;
        self.store.commit(batch).await?;

        let removal = WorkerRemoval {
            work_logs_removed: logs_before - work_logs.len(),
            advances_removed: advances_before - advances.len(),
        };
        tracing::info!(
            worker_id,
            work_logs = removal.work_logs_removed,
            advances = removal.advances_removed,
            "worker deleted"
        );
        Ok(removal)
    }
}
