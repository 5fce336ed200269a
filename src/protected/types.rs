//! Protected-data record type

use crate::vault::VaultRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable proof that a payload was deposited in the vault under a policy.
///
/// Records are created once, after the vault write succeeds, and are never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedData {
    /// Generated on create when left empty
    #[serde(default)]
    pub id: String,
    /// Normalized id of the governing policy
    pub policy_id: String,
    /// Reference to the payload held by the vault
    pub vault_ref: VaultRef,
    /// Grouping/tenancy scope supplied by the caller
    pub collection_id: String,
    pub created_at: DateTime<Utc>,
}

impl ProtectedData {
    /// New unsaved record; the registry assigns the id
    pub fn new(
        policy_id: impl Into<String>,
        vault_ref: VaultRef,
        collection_id: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            policy_id: policy_id.into(),
            vault_ref,
            collection_id: collection_id.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_uses_camel_case() {
        let record = ProtectedData {
            id: "a1".to_string(),
            policy_id: "pii-basic".to_string(),
            vault_ref: VaultRef::new("vault-doc-9"),
            collection_id: "col1".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["policyId"], "pii-basic");
        assert_eq!(json["vaultRef"], "vault-doc-9");
        assert_eq!(json["collectionId"], "col1");
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn test_new_leaves_id_unassigned() {
        let record = ProtectedData::new("p", VaultRef::new("r"), "c");
        assert!(record.id.is_empty());
    }
}
