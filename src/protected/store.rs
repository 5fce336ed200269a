//! Protected-data registry
//!
//! Write-once store of [`ProtectedData`] records keyed by generated id.
//! There is no update or delete path.

use crate::protected::types::ProtectedData;
use crate::store::{KeyValueStore, StoreError, StoreProvider};
use std::sync::Arc;

/// Name of the backing store opened from a [`StoreProvider`]
pub const PROTECTED_DATA_STORE_NAME: &str = "protected_data";

/// Durable registry of protected-data records
pub struct ProtectedDataStore {
    store: Arc<dyn KeyValueStore>,
}

impl ProtectedDataStore {
    /// Wrap an already opened key/value store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Open the protected-data store on a provider
    pub async fn open(provider: &dyn StoreProvider) -> Result<Self, StoreError> {
        Ok(Self::new(
            provider.open_store(PROTECTED_DATA_STORE_NAME).await?,
        ))
    }

    /// Persist a new record, assigning an id if it has none.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if a pre-assigned id is taken.
    pub async fn create(&self, mut record: ProtectedData) -> Result<String, StoreError> {
        if record.id.is_empty() {
            record.id = uuid::Uuid::new_v4().to_string();
        }
        let bytes = serde_json::to_vec(&record)?;
        self.store.insert(&record.id, bytes).await?;
        tracing::debug!(
            id = %record.id,
            policy_id = %record.policy_id,
            collection_id = %record.collection_id,
            "Created protected data record"
        );
        Ok(record.id)
    }

    /// Fetch a record by id
    pub async fn get(&self, id: &str) -> Result<ProtectedData, StoreError> {
        if id.is_empty() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let bytes = match self.store.get(id).await {
            Err(StoreError::InvalidKey(_)) => return Err(StoreError::NotFound(id.to_string())),
            other => other?,
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// All records, ordered by id
    pub async fn list(&self) -> Result<Vec<ProtectedData>, StoreError> {
        let mut records = Vec::new();
        for entry in self.store.scan("").await? {
            match serde_json::from_slice::<ProtectedData>(&entry.value) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping unreadable record {}: {}", entry.key, e),
            }
        }
        Ok(records)
    }

    /// Records belonging to one collection
    pub async fn list_by_collection(
        &self,
        collection_id: &str,
    ) -> Result<Vec<ProtectedData>, StoreError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|r| r.collection_id == collection_id)
            .collect())
    }
}
