// src/db/sqlite_repo.rs

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sha2::{Digest, Sha256};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool, Transaction,
};

use crate::{
    common::error::AppError,
    db::{CollectionKey, Repository},
};

const MAX_BACKUPS: i64 = 3;

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database file and applies migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        sqlx::migrate!().run(&pool).await?;
        tracing::info!("record store ready at {}", database_url);

        Ok(Self::new(pool))
    }

    /// Private in-memory database; a single connection so every query sees it.
    pub async fn in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        sqlx::migrate!().run(&pool).await?;
        Ok(Self::new(pool))
    }

    async fn write_entry(
        tx: &mut Transaction<'_, Sqlite>,
        key: CollectionKey,
        value: &Value,
    ) -> Result<(), AppError> {
        let body = serde_json::to_string(value)?;
        let sum = checksum(&body);
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO collections (key, body, checksum, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (key) DO UPDATE SET
                body = excluded.body,
                checksum = excluded.checksum,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key.as_str())
        .bind(&body)
        .bind(&sum)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        if key.is_critical() {
            sqlx::query(
                "INSERT INTO collection_backups (key, body, checksum, created_at) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(key.as_str())
            .bind(&body)
            .bind(&sum)
            .bind(now)
            .execute(&mut **tx)
            .await?;

            sqlx::query(
                r#"
                DELETE FROM collection_backups
                WHERE key = ?1
                  AND id NOT IN (
                      SELECT id FROM collection_backups
                      WHERE key = ?1
                      ORDER BY id DESC
                      LIMIT ?2
                  )
                "#,
            )
            .bind(key.as_str())
            .bind(MAX_BACKUPS)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    async fn latest_valid_backup(&self, key: CollectionKey) -> Result<Option<String>, AppError> {
        let backups: Vec<(String, String)> = sqlx::query_as(
            "SELECT body, checksum FROM collection_backups WHERE key = ?1 ORDER BY id DESC",
        )
        .bind(key.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(backups
            .into_iter()
            .find(|(body, sum)| checksum(body) == *sum)
            .map(|(body, _)| body))
    }
}

fn checksum(body: &str) -> String {
    format!("{:x}", Sha256::digest(body.as_bytes()))
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn load(&self, key: CollectionKey) -> Result<Option<Value>, AppError> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT body, checksum FROM collections WHERE key = ?1")
                .bind(key.as_str())
                .fetch_optional(&self.pool)
                .await?;

        let Some((body, stored_sum)) = row else {
            return Ok(None);
        };

        if checksum(&body) == stored_sum {
            return Ok(Some(serde_json::from_str(&body)?));
        }

        tracing::warn!(key = key.as_str(), "integrity check failed, trying backups");
        match self.latest_valid_backup(key).await? {
            Some(backup) => Ok(Some(serde_json::from_str(&backup)?)),
            None => {
                tracing::warn!(key = key.as_str(), "no valid backup, using stored data as-is");
                Ok(Some(serde_json::from_str(&body)?))
            }
        }
    }

    async fn save(&self, key: CollectionKey, value: Value) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        Self::write_entry(&mut tx, key, &value).await?;
        tx.commit().await?;
        tracing::debug!(key = key.as_str(), "collection saved");
        Ok(())
    }

    async fn save_many(&self, entries: Vec<(CollectionKey, Value)>) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in &entries {
            Self::write_entry(&mut tx, *key, value).await?;
        }
        tx.commit().await?;
        tracing::debug!(collections = entries.len(), "collections saved atomically");
        Ok(())
    }

    async fn remove(&self, key: CollectionKey) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM collections WHERE key = ?1")
            .bind(key.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM collection_backups WHERE key = ?1")
            .bind(key.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
