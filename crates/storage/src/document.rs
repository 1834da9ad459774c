use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::patch::Patch;
use crate::paths::DocPath;

/// Errors surfaced by document store backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Contract for the remote document store.
///
/// `merge` is a set-with-merge: fields named by the patch are written,
/// everything else in the document survives.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be reached or the stored
    /// payload cannot be decoded.
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError>;

    /// Write a document whole, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StoreError>;

    /// Merge-write a patch into a document, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read-modify-write fails.
    async fn merge(&self, path: &DocPath, patch: Patch) -> Result<(), StoreError>;

    /// Allocate a fresh document ID for a collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot allocate one.
    async fn allocate_id(&self) -> Result<String, StoreError>;
}

/// Generates a store-unique document ID.
#[must_use]
pub(crate) fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Simple in-memory document store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    documents: Arc<Mutex<HashMap<String, Value>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of documents currently held.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the inner lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(guard.len())
    }

    /// Whether the store holds no documents.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the inner lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(guard.get(path.as_str()).cloned())
    }

    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StoreError> {
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        guard.insert(path.as_str().to_owned(), value);
        Ok(())
    }

    async fn merge(&self, path: &DocPath, patch: Patch) -> Result<(), StoreError> {
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let entry = guard
            .entry(path.as_str().to_owned())
            .or_insert(Value::Null);
        patch.apply(entry);
        Ok(())
    }

    async fn allocate_id(&self) -> Result<String, StoreError> {
        Ok(new_document_id())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
