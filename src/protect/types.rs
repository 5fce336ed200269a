//! Protect request, stage and error types

use crate::store::StoreError;
use crate::vault::{VaultError, VaultRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Input to a single protect call
#[derive(Debug, Clone)]
pub struct ProtectRequest {
    pub payload: Vec<u8>,
    pub policy_id: String,
    pub collection_id: String,
}

impl ProtectRequest {
    pub fn new(
        payload: impl Into<Vec<u8>>,
        policy_id: impl Into<String>,
        collection_id: impl Into<String>,
    ) -> Self {
        Self {
            payload: payload.into(),
            policy_id: policy_id.into(),
            collection_id: collection_id.into(),
        }
    }

    /// Reject malformed input before any side effect
    pub fn validate(&self) -> Result<(), ProtectError> {
        if self.payload.is_empty() {
            return Err(ProtectError::Validation("payload must not be empty".to_string()));
        }
        if self.policy_id.trim().is_empty() {
            return Err(ProtectError::Validation("policy id must not be empty".to_string()));
        }
        if self.collection_id.trim().is_empty() {
            return Err(ProtectError::Validation(
                "collection id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Successful protect result as returned over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectResponse {
    pub id: String,
}

/// Stages of one protect call, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectStage {
    Validating,
    PolicyLookup,
    VaultWrite,
    RegistryCommit,
    Done,
}

impl fmt::Display for ProtectStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => write!(f, "validating"),
            Self::PolicyLookup => write!(f, "policy_lookup"),
            Self::VaultWrite => write!(f, "vault_write"),
            Self::RegistryCommit => write!(f, "registry_commit"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Terminal failure of a protect call
#[derive(Error, Debug)]
pub enum ProtectError {
    /// Malformed request; nothing was written
    #[error("invalid request: {0}")]
    Validation(String),

    /// Referenced policy does not exist; nothing was written
    #[error("policy '{0}' not found")]
    PolicyNotFound(String),

    /// Policy registry fault during lookup; nothing was written
    #[error("policy lookup failed: {0}")]
    Storage(#[source] StoreError),

    /// Vault rejected or failed the write; no record was created
    #[error("vault write failed: {0}")]
    VaultWriteFailed(#[source] VaultError),

    /// Vault write succeeded but the record was not committed.
    ///
    /// The payload under `vault_ref` is orphaned.
    #[error("registry write failed, orphaned vault entry {vault_ref}: {reason}")]
    RegistryWriteFailed { vault_ref: VaultRef, reason: String },

    /// Caller cancelled or the deadline passed while `stage` was pending
    #[error("protect cancelled during {stage}")]
    Cancelled { stage: ProtectStage },
}

impl ProtectError {
    /// Stage the call failed in
    pub fn stage(&self) -> ProtectStage {
        match self {
            Self::Validation(_) => ProtectStage::Validating,
            Self::PolicyNotFound(_) | Self::Storage(_) => ProtectStage::PolicyLookup,
            Self::VaultWriteFailed(_) => ProtectStage::VaultWrite,
            Self::RegistryWriteFailed { .. } => ProtectStage::RegistryCommit,
            Self::Cancelled { stage } => *stage,
        }
    }

    /// Whether the caller is at fault (as opposed to a downstream failure)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::PolicyNotFound(_))
    }

    /// Vault entry left without a record, if any
    pub fn orphaned_vault_ref(&self) -> Option<&VaultRef> {
        match self {
            Self::RegistryWriteFailed { vault_ref, .. } => Some(vault_ref),
            _ => None,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::PolicyNotFound(_) => "POLICY_NOT_FOUND",
            Self::Storage(_) => "STORAGE_FAULT",
            Self::VaultWriteFailed(_) => "VAULT_WRITE_FAILED",
            Self::RegistryWriteFailed { .. } => "REGISTRY_WRITE_FAILED",
            Self::Cancelled { .. } => "CANCELLED",
        }
    }

    /// Message safe to return to callers; omits storage and vault internals
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::PolicyNotFound(id) => format!("policy '{}' not found", id),
            Self::Storage(_) => "failed to resolve policy".to_string(),
            Self::VaultWriteFailed(_) => "failed to store data in vault".to_string(),
            Self::RegistryWriteFailed { .. } => "failed to record protected data".to_string(),
            Self::Cancelled { .. } => "request cancelled or deadline exceeded".to_string(),
        }
    }
}
