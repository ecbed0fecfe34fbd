// src/services/advance_service.rs

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CollectionKey, RecordStore},
    models::{
        advance::{Advance, AdvancePayload, AdvanceSummary},
        worker::Worker,
    },
};

#[derive(Clone)]
pub struct AdvanceService {
    store: RecordStore,
}

impl AdvanceService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    async fn load(&self) -> Result<Vec<Advance>, AppError> {
        self.store.load_records(CollectionKey::Advances).await
    }

    pub async fn record_advance(&self, payload: AdvancePayload) -> Result<Advance, AppError> {
        let _writes = self.store.write_lock().await;
        let workers: Vec<Worker> = self.store.load_records(CollectionKey::Workers).await?;
        if !workers.iter().any(|w| w.id == payload.worker_id) {
            return Err(AppError::WorkerNotFound(payload.worker_id));
        }

        let advance = Advance {
            id: Uuid::new_v4().to_string(),
            worker_id: payload.worker_id,
            date: payload.date,
            amount: payload.amount,
            notes: payload.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        };

        let mut advances = self.load().await?;
        advances.push(advance.clone());
        self.store.save_records(CollectionKey::Advances, &advances).await?;

        tracing::info!(
            advance_id = %advance.id,
            worker_id = %advance.worker_id,
            amount = %advance.amount,
            "advance recorded"
        );
        Ok(advance)
    }

    /// Newest date first.
    pub async fn list_advances(&self, worker_id: Option<&str>) -> Result<Vec<Advance>, AppError> {
        let mut advances = self.load().await?;
        if let Some(worker_id) = worker_id {
            advances.retain(|a| a.worker_id == worker_id);
        }
        advances.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(advances)
    }

    pub async fn delete_advance(&self, advance_id: &str) -> Result<(), AppError> {
        let _writes = self.store.write_lock().await;
        let mut advances = self.load().await?;
        let before = advances.len();
        advances.retain(|a| a.id != advance_id);
        if advances.len() == before {
            return Err(AppError::not_found("Advance", advance_id));
        }
        self.store.save_records(CollectionKey::Advances, &advances).await
    }

    /// One row per current worker with advances, in roster order.
    pub async fn advance_summary(&self) -> Result<Vec<AdvanceSummary>, AppError> {
        let workers: Vec<Worker> = self.store.load_records(CollectionKey::Workers).await?;
        let advances = self.load().await?;
        let mut by_worker: HashMap<&str, Vec<&Advance>> = HashMap::new();
        for advance in &advances {
            by_worker.entry(advance.worker_id.as_str()).or_default().push(advance);
        }

        Ok(workers
            .iter()
            .filter_map(|worker| {
                let entries = by_worker.get(worker.id.as_str())?;
                let last_advance_date = entries.iter().map(|a| a.date).max()?;
                Some(AdvanceSummary {
                    worker_id: worker.id.clone(),
                    worker_name: worker.name.clone(),
                    total_amount: entries.iter().map(|a| a.amount).sum(),
                    count: entries.len(),
                    last_advance_date,
                })
            })
            .collect())
    }
}
