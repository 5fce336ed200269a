//! Protect workflow
//!
//! ```text
//! Validating → PolicyLookup → VaultWrite → RegistryCommit → Done
//!      │             │             │               │
//!      └─────────────┴─────────────┴───────────────┴──▶ Failed(kind)
//! ```
//!
//! The stages run strictly in order. Looking the policy up before touching
//! the vault means an unknown policy never leaves data behind. The one
//! window that can leave state behind is between a successful vault write
//! and the registry commit: a failure there is reported as
//! [`ProtectError::RegistryWriteFailed`] carrying the orphaned reference.
//! Nothing is retried and nothing is rolled back.
//!
//! The vault write and the registry commit run on their own task. Dropping
//! the caller's future does not abort them, so an orphan is always logged.

use crate::policy::PolicyStore;
use crate::protect::types::{ProtectError, ProtectRequest, ProtectStage};
use crate::protected::{ProtectedData, ProtectedDataStore};
use crate::store::StoreError;
use crate::vault::VaultClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Runs protect calls against the policy registry, vault and record registry
pub struct ProtectOrchestrator {
    policies: Arc<PolicyStore>,
    records: Arc<ProtectedDataStore>,
    vault: Arc<dyn VaultClient>,
}

/// When a protect call stops being wanted
struct Interrupt {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Interrupt {
    fn is_set(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|at| Instant::now() >= at)
    }

    async fn wait(&self) {
        match self.deadline {
            Some(at) => {
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep_until(at) => {}
                }
            }
            None => self.cancel.cancelled().await,
        }
    }
}

/// The side-effecting tail of a protect call
struct Commit {
    vault: Arc<dyn VaultClient>,
    records: Arc<ProtectedDataStore>,
    payload: Vec<u8>,
    policy_id: String,
    collection_id: String,
    interrupt: Interrupt,
}

impl Commit {
    async fn run(self) -> Result<String, ProtectError> {
        if self.interrupt.is_set() {
            return Err(ProtectError::Cancelled {
                stage: ProtectStage::VaultWrite,
            });
        }

        // Not raced against the interrupt: a write the vault accepted must
        // come back with its reference. The vault client bounds its own time.
        tracing::debug!(stage = %ProtectStage::VaultWrite, vault = self.vault.name(), "Protect stage");
        let vault_ref = self
            .vault
            .store(&self.payload)
            .await
            .map_err(ProtectError::VaultWriteFailed)?;

        tracing::debug!(stage = %ProtectStage::RegistryCommit, vault_ref = %vault_ref, "Protect stage");
        if self.interrupt.is_set() {
            tracing::error!(
                vault_ref = %vault_ref,
                policy_id = %self.policy_id,
                collection_id = %self.collection_id,
                "Cancelled after vault write; vault entry orphaned"
            );
            return Err(ProtectError::RegistryWriteFailed {
                vault_ref,
                reason: "cancelled before registry commit".to_string(),
            });
        }

        let record = ProtectedData::new(self.policy_id.clone(), vault_ref.clone(), self.collection_id);
        let collection_id = record.collection_id.clone();
        match self.records.create(record).await {
            Ok(id) => {
                tracing::info!(
                    id = %id,
                    policy_id = %self.policy_id,
                    collection_id = %collection_id,
                    "Protected data"
                );
                Ok(id)
            }
            Err(e) => {
                tracing::error!(
                    vault_ref = %vault_ref,
                    policy_id = %self.policy_id,
                    collection_id = %collection_id,
                    error = %e,
                    "Registry commit failed; vault entry orphaned"
                );
                Err(ProtectError::RegistryWriteFailed {
                    vault_ref,
                    reason: e.to_string(),
                })
            }
        }
    }
}

impl ProtectOrchestrator {
    pub fn new(
        policies: Arc<PolicyStore>,
        records: Arc<ProtectedDataStore>,
        vault: Arc<dyn VaultClient>,
    ) -> Self {
        Self {
            policies,
            records,
            vault,
        }
    }

    /// Protect a payload under a policy, returning the new record id.
    ///
    /// `cancel` is honored until the vault write is issued. A cancel seen
    /// after the vault write is reported as
    /// [`ProtectError::RegistryWriteFailed`] with the orphaned reference.
    /// Once issued, the vault write and registry commit run to completion
    /// even if this future is dropped.
    pub async fn protect(
        &self,
        request: ProtectRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ProtectError> {
        self.run(
            request,
            Interrupt {
                cancel: cancel.clone(),
                deadline: None,
            },
        )
        .await
    }

    /// [`protect`](Self::protect) with a deadline instead of a caller token
    pub async fn protect_within(
        &self,
        request: ProtectRequest,
        deadline: Duration,
    ) -> Result<String, ProtectError> {
        self.run(
            request,
            Interrupt {
                cancel: CancellationToken::new(),
                deadline: Some(Instant::now() + deadline),
            },
        )
        .await
    }

    async fn run(&self, request: ProtectRequest, interrupt: Interrupt) -> Result<String, ProtectError> {
        request.validate()?;
        let policy_id = PolicyStore::normalize_id(&request.policy_id);

        tracing::debug!(stage = %ProtectStage::PolicyLookup, policy_id = %policy_id, "Protect stage");
        let lookup = tokio::select! {
            biased;
            _ = interrupt.wait() => {
                return Err(ProtectError::Cancelled { stage: ProtectStage::PolicyLookup });
            }
            result = self.policies.get(&policy_id) => result,
        };
        match lookup {
            Ok(_) => {}
            Err(e) if e.is_not_found() => return Err(ProtectError::PolicyNotFound(policy_id)),
            Err(e) => return Err(ProtectError::Storage(e)),
        }

        let commit = Commit {
            vault: self.vault.clone(),
            records: self.records.clone(),
            payload: request.payload,
            policy_id,
            collection_id: request.collection_id,
            interrupt,
        };
        match tokio::spawn(commit.run()).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Protect commit task failed");
                Err(ProtectError::Storage(StoreError::Backend(format!(
                    "commit task failed: {}",
                    e
                ))))
            }
        }
    }
}
