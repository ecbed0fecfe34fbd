// src/db/memory_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
    common::error::AppError,
    db::{CollectionKey, Repository},
};

/// In-process store, used by tests and as a scratch backend.
#[derive(Default)]
pub struct MemoryRepository {
    collections: RwLock<HashMap<CollectionKey, Value>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn load(&self, key: CollectionKey) -> Result<Option<Value>, AppError> {
        Ok(self.collections.read().await.get(&key).cloned())
    }

    async fn save(&self, key: CollectionKey, value: Value) -> Result<(), AppError> {
        self.collections.write().await.insert(key, value);
        Ok(())
    }

    async fn save_many(&self, entries: Vec<(CollectionKey, Value)>) -> Result<(), AppError> {
        // Single write guard for the whole batch
        let mut collections = self.collections.write().await;
        for (key, value) in entries {
            collections.insert(key, value);
        }
        Ok(())
    }

    async fn remove(&self, key: CollectionKey) -> Result<(), AppError> {
        self.collections.write().await.remove(&key);
        Ok(())
    }
}
