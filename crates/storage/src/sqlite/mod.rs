use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use thiserror::Error;

use crate::document::{new_document_id, DocumentStore, StoreError};
use crate::patch::Patch;
use crate::paths::DocPath;

mod migrate;

/// Document store backed by a single SQLite table: one row per document,
/// keyed by path, payload as JSON text.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteStore {
    /// Connect to `SQLite` using the given URL.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or
    /// the setup pragmas fail.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }

    async fn upsert(&self, path: &DocPath, value: &Value) -> Result<(), StoreError> {
        let data = serde_json::to_string(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        sqlx::query(
            "INSERT INTO documents (path, data, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(path) DO UPDATE SET data = excluded.data, \
             updated_at = excluded.updated_at",
        )
        .bind(path.as_str())
        .bind(data)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT data FROM documents WHERE path = ?1")
            .bind(path.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        match row {
            Some(row) => {
                let data: String = row
                    .try_get("data")
                    .map_err(|e| StoreError::Connection(e.to_string()))?;
                let value = serde_json::from_str(&data)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StoreError> {
        self.upsert(path, &value).await
    }

    async fn merge(&self, path: &DocPath, patch: Patch) -> Result<(), StoreError> {
        let mut document = self.get(path).await?.unwrap_or(Value::Null);
        patch.apply(&mut document);
        self.upsert(path, &document).await
    }

    async fn allocate_id(&self) -> Result<String, StoreError> {
        Ok(new_document_id())
    }
}
