// src/services/car_fare_service.rs
//
// The store is a flat array with no unique index, so (worker, date)
// uniqueness is checked by scanning existing entries before every insert.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CollectionKey, RecordStore},
    models::{
        car_fare::{BulkCarFareOutcome, BulkCarFarePayload, CarFareEntry, CarFarePayload, CarFareType},
        worker::Worker,
    },
};

fn has_entry(entries: &[CarFareEntry], worker_id: &str, date: NaiveDate) -> bool {
    entries.iter().any(|e| e.worker_id == worker_id && e.date == date)
}

#[derive(Clone)]
pub struct CarFareService {
    store: RecordStore,
}

impl CarFareService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    async fn load(&self) -> Result<Vec<CarFareEntry>, AppError> {
        self.store.load_records(CollectionKey::CarFareEntries).await
    }

    pub async fn add_car_fare(&self, payload: CarFarePayload) -> Result<CarFareEntry, AppError> {
        let _writes = self.store.write_lock().await;

        // 1. The worker must exist
        let workers: Vec<Worker> = self.store.load_records(CollectionKey::Workers).await?;
        let worker = workers
            .iter()
            .find(|w| w.id == payload.worker_id)
            .ok_or_else(|| AppError::WorkerNotFound(payload.worker_id.clone()))?;

        // 2. One entry per worker and day, checked under the write lock
        let mut entries = self.load().await?;
        if has_entry(&entries, &worker.id, payload.date) {
            return Err(AppError::DuplicateCarFare {
                worker_id: worker.id.clone(),
                date: payload.date,
            });
        }

        // 3. Save
        let entry = CarFareEntry {
            id: Uuid::new_v4().to_string(),
            worker_id: worker.id.clone(),
            worker_name: Some(worker.name.clone()),
            date: payload.date,
            amount: payload.amount,
            kind: CarFareType::Individual,
        };
        entries.push(entry.clone());
        self.store.save_records(CollectionKey::CarFareEntries, &entries).await?;

        tracing::info!(worker_id = %entry.worker_id, date = %entry.date, "car fare added");
        Ok(entry)
    }

    /// One entry per car-fare worker that has none on the date yet.
    pub async fn apply_bulk_car_fare(
        &self,
        payload: BulkCarFarePayload,
    ) -> Result<BulkCarFareOutcome, AppError> {
        let _writes = self.store.write_lock().await;
        let workers: Vec<Worker> = self.store.load_records(CollectionKey::Workers).await?;
        let mut entries = self.load().await?;
        let mut outcome = BulkCarFareOutcome { added: 0, already_present: 0 };

        for worker in workers.iter().filter(|w| w.car_fare) {
            if has_entry(&entries, &worker.id, payload.date) {
                outcome.already_present += 1;
                continue;
            }
            entries.push(CarFareEntry {
                id: Uuid::new_v4().to_string(),
                worker_id: worker.id.clone(),
                worker_name: Some(worker.name.clone()),
                date: payload.date,
                amount: payload.amount,
                kind: CarFareType::Bulk,
            });
            outcome.added += 1;
        }

        if outcome.added > 0 {
            self.store.save_records(CollectionKey::CarFareEntries, &entries).await?;
        }
        tracing::info!(
            date = %payload.date,
            added = outcome.added,
            already_present = outcome.already_present,
            "bulk car fare applied"
        );
        Ok(outcome)
    }

    /// Newest date first.
    pub async fn list_car_fare(&self, worker_id: Option<&str>) -> Result<Vec<CarFareEntry>, AppError> {
        let mut entries = self.load().await?;
        if let Some(worker_id) = worker_id {
            entries.retain(|e| e.worker_id == worker_id);
        }
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    pub async fn delete_car_fare(&self, entry_id: &str) -> Result<(), AppError> {
        let _writes = self.store.write_lock().await;
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(|e| e.id != entry_id);
        if entries.len() == before {
            return Err(AppError::not_found("CarFareEntry", entry_id));
        }
        self.store.save_records(CollectionKey::CarFareEntries, &entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{MemoryRepository, Repository, SqliteRepository},
        services::payslip_service::tests::{day, hourly_worker},
    };
    use rust_decimal::{dec, Decimal};
    use std::sync::Arc;

    async fn seeded() -> CarFareService {
        seeded_on(Arc::new(MemoryRepository::new())).await
    }

    async fn seeded_on(repo: Arc<dyn Repository>) -> CarFareService {
        let store = RecordStore::new(repo);
        let riders = |id: &str, name: &str| Worker {
            car_fare: true,
            ..hourly_worker(id, name)
        };
        store
            .save_records(
                CollectionKey::Workers,
                &[riders("1", "Jane Doe"), riders("2", "Bo"), hourly_worker("3", "Ann")],
            )
            .await
            .unwrap();
        CarFareService::new(store)
    }

    #[tokio::test]
    async fn second_entry_same_day_is_rejected() {
        let service = seeded().await;
        service
            .add_car_fare(CarFarePayload { worker_id: "1".into(), date: day(1), amount: dec!(5) })
            .await
            .unwrap();

        let err = service
            .add_car_fare(CarFarePayload { worker_id: "1".into(), date: day(1), amount: dec!(7) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateCarFare { ref worker_id, .. } if worker_id == "1"));

        let entries = service.list_car_fare(Some("1")).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, dec!(5));
    }

    #[tokio::test]
    async fn bulk_targets_car_fare_workers_without_entry() {
        let service = seeded().await;
        service
            .add_car_fare(CarFarePayload { worker_id: "2".into(), date: day(1), amount: dec!(5) })
            .await
            .unwrap();

        let outcome = service
            .apply_bulk_car_fare(BulkCarFarePayload { date: day(1), amount: dec!(4) })
            .await
            .unwrap();
        assert_eq!(outcome, BulkCarFareOutcome { added: 1, already_present: 1 });

        let all = service.list_car_fare(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|e| e.worker_id != "3"));
        let bulk = all.iter().find(|e| e.kind == CarFareType::Bulk).unwrap();
        assert_eq!(bulk.worker_id, "1");

        service.delete_car_fare(&bulk.id).await.unwrap();
        assert_eq!(service.list_car_fare(None).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_for_same_day_keep_one_entry() {
        let service = seeded_on(Arc::new(SqliteRepository::in_memory().await.unwrap())).await;

        let attempts: Vec<_> = (0..8)
            .map(|n| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .add_car_fare(CarFarePayload {
                            worker_id: "1".into(),
                            date: day(1),
                            amount: Decimal::from(n + 1),
                        })
                        .await
                })
            })
            .collect();

        let mut added = 0;
        let mut duplicates = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => added += 1,
                Err(AppError::DuplicateCarFare { .. }) => duplicates += 1,
                Err(other) => panic!("unexpected error {other}"),
            }
        }

        assert_eq!(added, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(service.list_car_fare(Some("1")).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_for_different_days_are_all_kept() {
        let service = seeded_on(Arc::new(SqliteRepository::in_memory().await.unwrap())).await;

        let attempts: Vec<_> = (1..=8)
            .map(|d| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .add_car_fare(CarFarePayload {
                            worker_id: "2".into(),
                            date: day(d),
                            amount: dec!(5),
                        })
                        .await
                })
            })
            .collect();
        for attempt in attempts {
            attempt.await.unwrap().unwrap();
        }

        assert_eq!(service.list_car_fare(Some("2")).await.unwrap().len(), 8);
    }
}
