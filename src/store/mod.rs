//! Key/value storage backends for the registries
//!
//! Both registries are written against [`KeyValueStore`] rather than a
//! concrete engine. A [`StoreProvider`] hands out named stores so that the
//! policy and protected-data registries can share one backend without
//! sharing a keyspace.
//!
//! ```text
//! StoreProvider ──open_store("policy")────────▶ KeyValueStore
//!               └─open_store("protected_data")─▶ KeyValueStore
//! ```

pub mod file;
pub mod memory;

pub use file::{FileStore, FileStoreProvider};
pub use memory::{MemoryStore, MemoryStoreProvider};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Storage error type
#[derive(Error, Debug)]
pub enum StoreError {
    /// No value stored under the key
    #[error("key not found: {0}")]
    NotFound(String),

    /// Write-once insert hit an existing key
    #[error("key already exists: {0}")]
    AlreadyExists(String),

    /// Invalid key or argument
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Underlying filesystem failure
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be encoded or decoded
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether this is the not-found condition rather than a fault
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// A single stored entry returned by [`KeyValueStore::scan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: Vec<u8>,
}

/// Key/value store capability set.
///
/// Writes to a single key are linearized by the implementation. There is no
/// cross-key coordination.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Upsert a value. Replaces any prior value under the key.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Read a value. Returns [`StoreError::NotFound`] when absent.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Create a value only if the key is absent.
    ///
    /// Returns [`StoreError::AlreadyExists`] otherwise.
    async fn insert(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// All entries whose key starts with `prefix`, sorted by key.
    async fn scan(&self, prefix: &str) -> Result<Vec<Entry>, StoreError>;
}

// Blanket implementation for Arc<T>
#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        (**self).put(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(key).await
    }

    async fn insert(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        (**self).insert(key, value).await
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<Entry>, StoreError> {
        (**self).scan(prefix).await
    }
}

/// Opens named stores on a shared backend.
///
/// Opening the same name twice yields a handle to the same data.
#[async_trait]
pub trait StoreProvider: Send + Sync {
    async fn open_store(&self, name: &str) -> Result<Arc<dyn KeyValueStore>, StoreError>;
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}
