//! In-process vault for development and tests

use super::{VaultClient, VaultError, VaultRef};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Vault keeping payloads in memory
pub struct MemoryVault {
    documents: Arc<RwLock<HashMap<VaultRef, Vec<u8>>>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored payloads
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Read a payload back (test/inspection helper)
    pub async fn read(&self, reference: &VaultRef) -> Option<Vec<u8>> {
        self.documents.read().await.get(reference).cloned()
    }
}

impl Default for MemoryVault {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VaultClient for MemoryVault {
    async fn store(&self, payload: &[u8]) -> Result<VaultRef, VaultError> {
        if payload.is_empty() {
            return Err(VaultError::Unavailable("empty payload".to_string()));
        }
        let reference = VaultRef::new(format!("mem-{}", uuid::Uuid::new_v4()));
        self.documents
            .write()
            .await
            .insert(reference.clone(), payload.to_vec());
        Ok(reference)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_read_back() {
        let vault = MemoryVault::new();
        let r = vault.store(b"secret").await.unwrap();
        assert!(r.as_str().starts_with("mem-"));
        assert_eq!(vault.read(&r).await.unwrap(), b"secret");
        assert_eq!(vault.len().await, 1);
    }

    #[tokio::test]
    async fn test_refs_are_distinct() {
        let vault = MemoryVault::new();
        let a = vault.store(b"same").await.unwrap();
        let b = vault.store(b"same").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(vault.len().await, 2);
    }

    #[tokio::test]
    async fn test_empty_payload_rejected() {
        let vault = MemoryVault::new();
        assert!(vault.store(b"").await.is_err());
        assert!(vault.is_empty().await);
    }
}
