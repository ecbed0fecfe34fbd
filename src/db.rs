// src/db.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use crate::common::error::AppError;

pub mod memory_repo;
pub use memory_repo::MemoryRepository;
pub mod sqlite_repo;
pub use sqlite_repo::SqliteRepository;

/// Storage keys, one flat JSON array (or document) each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Workers,
    Contracts,
    WorkLogs,
    Advances,
    CarFareEntries,
    Payslips,
    Settings,
}

impl CollectionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKey::Workers => "payroll_workers",
            CollectionKey::Contracts => "payroll_contracts",
            CollectionKey::WorkLogs => "payroll_work_logs",
            CollectionKey::Advances => "payroll_advances",
            CollectionKey::CarFareEntries => "payroll_car_fare_entries",
            CollectionKey::Payslips => "payroll_payslips",
            CollectionKey::Settings => "payroll_settings",
        }
    }

    /// Keys that get an auto-backup on every save.
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            CollectionKey::Workers
                | CollectionKey::WorkLogs
                | CollectionKey::Advances
                | CollectionKey::Settings
        )
    }
}

/// Key-value persistence for whole collections.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn load(&self, key: CollectionKey) -> Result<Option<Value>, AppError>;

    async fn save(&self, key: CollectionKey, value: Value) -> Result<(), AppError>;

    /// Writes every entry or none of them.
    async fn save_many(&self, entries: Vec<(CollectionKey, Value)>) -> Result<(), AppError>;

    async fn remove(&self, key: CollectionKey) -> Result<(), AppError>;
}

/// Typed access to the collections on top of any [`Repository`].
///
/// Clones share one write lock. Every load-check-save sequence must hold
/// [`RecordStore::write_lock`] from the first load to the last save, or two
/// concurrent requests can both pass a check and the later save drops the
/// other's record.
#[derive(Clone)]
pub struct RecordStore {
    repo: Arc<dyn Repository>,
    writes: Arc<Mutex<()>>,
}

impl RecordStore {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Serializes read-modify-write sequences across every collection.
    pub async fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    pub async fn load_records<T: DeserializeOwned>(
        &self,
        key: CollectionKey,
    ) -> Result<Vec<T>, AppError> {
        match self.repo.load(key).await? {
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    pub async fn save_records<T: Serialize>(
        &self,
        key: CollectionKey,
        records: &[T],
    ) -> Result<(), AppError> {
        self.repo.save(key, serde_json::to_value(records)?).await
    }

    pub async fn load_document<T: DeserializeOwned + Default>(
        &self,
        key: CollectionKey,
    ) -> Result<T, AppError> {
        match self.repo.load(key).await? {
            Some(Value::Null) | None => Ok(T::default()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    pub async fn save_document<T: Serialize>(
        &self,
        key: CollectionKey,
        document: &T,
    ) -> Result<(), AppError> {
        self.repo.save(key, serde_json::to_value(document)?).await
    }

    /// Atomic multi-collection write, see [`Repository::save_many`].
    pub async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        self.repo.save_many(batch.entries).await
    }
}

/// Collections staged for a single atomic write.
#[derive(Default)]
pub struct WriteBatch {
    entries: Vec<(CollectionKey, Value)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: Serialize>(mut self, key: CollectionKey, records: &[T]) -> Result<Self, AppError> {
        self.entries.push((key, serde_json::to_value(records)?));
        Ok(self)
    }
}
