//! Gatekeeper server wiring
//!
//! Builds the store provider, registries, vault client and orchestrator from
//! a [`GatekeeperConfig`] and serves the HTTP API until shutdown.

use crate::api::build_app;
use crate::config::{GatekeeperConfig, StorageBackend, VaultBackend};
use crate::error::{Error, Result};
use crate::policy::{PolicyState, PolicyStore};
use crate::protect::{ProtectOrchestrator, ProtectState};
use crate::protected::{ProtectedDataStore, ProtectedState};
use crate::store::{FileStoreProvider, MemoryStoreProvider, StoreProvider};
use crate::vault::{HttpVaultClient, MemoryVault, VaultClient};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Gatekeeper HTTP server
pub struct Server {
    config: GatekeeperConfig,
    policies: Arc<PolicyStore>,
    records: Arc<ProtectedDataStore>,
    orchestrator: Arc<ProtectOrchestrator>,
}

impl Server {
    /// Open the configured backends
    pub async fn new(config: GatekeeperConfig) -> Result<Self> {
        config.validate()?;

        let provider: Box<dyn StoreProvider> = match config.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory registries; records are lost on restart");
                Box::new(MemoryStoreProvider::new())
            }
            StorageBackend::File => {
                tracing::info!(dir = %config.storage.base_dir.display(), "Using file registries");
                Box::new(FileStoreProvider::new(config.storage.base_dir.clone()))
            }
        };
        let policies = Arc::new(PolicyStore::open(provider.as_ref()).await?);
        let records = Arc::new(ProtectedDataStore::open(provider.as_ref()).await?);

        let vault: Arc<dyn VaultClient> = match config.vault.backend {
            VaultBackend::Memory => {
                tracing::warn!("Using in-memory vault; protected payloads are lost on restart");
                Arc::new(MemoryVault::new())
            }
            VaultBackend::Http => {
                tracing::info!(url = %config.vault.url, "Using HTTP vault");
                Arc::new(HttpVaultClient::new(
                    config.vault.url.clone(),
                    config.vault.timeout(),
                )?)
            }
        };

        let orchestrator = Arc::new(ProtectOrchestrator::new(
            policies.clone(),
            records.clone(),
            vault,
        ));

        Ok(Self {
            config,
            policies,
            records,
            orchestrator,
        })
    }

    pub fn config(&self) -> &GatekeeperConfig {
        &self.config
    }

    /// Build the HTTP application
    pub fn router(&self) -> Router {
        build_app(
            PolicyState {
                store: self.policies.clone(),
            },
            ProtectState {
                orchestrator: self.orchestrator.clone(),
                request_timeout: self.config.server.request_timeout(),
            },
            ProtectedState {
                store: self.records.clone(),
            },
            &self.config.server.cors_origins,
        )
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "Gatekeeper listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;
        tracing::info!("Gatekeeper stopped");
        Ok(())
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Server(format!("failed to bind {}: {}", addr, e)))?;
        self.serve(listener, shutdown).await
    }
}
