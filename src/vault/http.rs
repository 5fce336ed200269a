//! HTTP vault client
//!
//! Talks to an external vault server:
//! `POST {base_url}/documents` with `{"content": "<base64 payload>"}`,
//! answered by `{"id": "<reference>"}`.

use super::{VaultClient, VaultError, VaultRef};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct CreateDocumentRequest {
    content: String,
}

#[derive(Deserialize)]
struct CreateDocumentResponse {
    #[serde(default)]
    id: String,
}

/// Vault client over HTTP
pub struct HttpVaultClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVaultClient {
    /// Create a client for the vault at `base_url`; `timeout` bounds each request
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, VaultError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(VaultError::Unavailable("vault url not configured".to_string()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl VaultClient for HttpVaultClient {
    async fn store(&self, payload: &[u8]) -> Result<VaultRef, VaultError> {
        let url = format!("{}/documents", self.base_url);
        let request = CreateDocumentRequest {
            content: STANDARD.encode(payload),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Vault rejected document");
            return Err(VaultError::Status {
                status: status.as_u16(),
            });
        }

        let body: CreateDocumentResponse = response
            .json()
            .await
            .map_err(|e| VaultError::InvalidResponse(e.to_string()))?;
        if body.id.is_empty() {
            return Err(VaultError::InvalidResponse(
                "response carried no document id".to_string(),
            ));
        }

        Ok(VaultRef::new(body.id))
    }

    fn name(&self) -> &str {
        "http"
    }
}
