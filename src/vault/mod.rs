//! Vault client boundary
//!
//! The vault owns raw payload bytes. The gateway hands a payload over and
//! keeps only the opaque [`VaultRef`] it gets back; it never reads payloads
//! back or keeps copies.

pub mod http;
pub mod memory;

pub use http::HttpVaultClient;
pub use memory::MemoryVault;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Opaque handle naming a payload held by the vault
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultRef(String);

impl VaultRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VaultRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vault client error type
#[derive(Error, Debug)]
pub enum VaultError {
    /// Request never produced a response
    #[error("vault transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Vault answered with a non-success status
    #[error("vault returned status {status}")]
    Status { status: u16 },

    /// Vault answered success but the body was unusable
    #[error("invalid vault response: {0}")]
    InvalidResponse(String),

    /// Vault refused or cannot take the write
    #[error("vault unavailable: {0}")]
    Unavailable(String),
}

/// Stores sensitive payloads in the external vault
#[async_trait]
pub trait VaultClient: Send + Sync {
    /// Deposit a payload and return the reference naming it.
    ///
    /// Failures are terminal for the calling operation.
    async fn store(&self, payload: &[u8]) -> Result<VaultRef, VaultError>;

    /// Human-readable backend name (used in logs)
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: VaultClient + ?Sized> VaultClient for Arc<T> {
    async fn store(&self, payload: &[u8]) -> Result<VaultRef, VaultError> {
        (**self).store(payload).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_ref_is_transparent() {
        let r = VaultRef::new("doc-42");
        assert_eq!(serde_json::to_string(&r).unwrap(), "\"doc-42\"");
        assert_eq!(r.to_string(), "doc-42");
        assert_eq!(r.as_str(), "doc-42");
    }

    #[test]
    fn test_status_error_message() {
        let err = VaultError::Status { status: 503 };
        assert_eq!(err.to_string(), "vault returned status 503");
    }
}
