//! Policy registry
//!
//! Maps a lowercase policy id to its document. Writes are whole-document
//! upserts: a second `put` under the same id replaces the first, with no
//! merge and no version history.

use crate::policy::types::PolicyDocument;
use crate::store::{KeyValueStore, StoreError, StoreProvider};
use std::sync::Arc;

/// Name of the backing store opened from a [`StoreProvider`]
pub const POLICY_STORE_NAME: &str = "policy";

/// Durable registry of policy documents
pub struct PolicyStore {
    store: Arc<dyn KeyValueStore>,
}

impl PolicyStore {
    /// Wrap an already opened key/value store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Open the policy store on a provider
    pub async fn open(provider: &dyn StoreProvider) -> Result<Self, StoreError> {
        Ok(Self::new(provider.open_store(POLICY_STORE_NAME).await?))
    }

    /// Canonical form of a policy id
    pub fn normalize_id(id: &str) -> String {
        id.to_lowercase()
    }

    /// Store a policy document under the normalized id
    pub async fn put(&self, id: &str, document: &PolicyDocument) -> Result<(), StoreError> {
        let id = Self::normalize_id(id);
        if id.is_empty() {
            return Err(StoreError::InvalidKey("policy id must not be empty".to_string()));
        }
        let bytes = serde_json::to_vec(document)?;
        self.store.put(&id, bytes).await?;
        tracing::debug!(policy_id = %id, "Stored policy");
        Ok(())
    }

    /// Fetch a policy document by id (any letter case)
    pub async fn get(&self, id: &str) -> Result<PolicyDocument, StoreError> {
        let id = Self::normalize_id(id);
        if id.is_empty() {
            return Err(StoreError::NotFound(id));
        }
        let bytes = match self.store.get(&id).await {
            // An id the backend cannot hold was never stored
            Err(StoreError::InvalidKey(_)) => return Err(StoreError::NotFound(id)),
            other => other?,
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}
