//! Gatekeeper - Policy-governed data protection gateway
//!
//! Gatekeeper accepts payloads from callers, deposits them in a document
//! vault, and records which policy each protected payload is bound to.
//! Callers never hold vault references directly; they get back an opaque
//! protected-data id.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      HTTP API (axum)                          │
//! │   /v1/protect    /v1/policy/:id    /v1/protected/:id          │
//! └──────┬─────────────────┬──────────────────┬──────────────────┘
//!        │                 │                  │
//! ┌──────▼───────────┐     │                  │
//! │ ProtectOrchestrator   │                  │
//! │  1. validate      │     │                  │
//! │  2. policy lookup ├────►│ PolicyStore      │
//! │  3. vault write ──┼──► VaultClient (memory | http)
//! │  4. record commit ├────────────────────► ProtectedDataStore
//! └──────────────────┘     │                  │
//!                    ┌─────▼──────────────────▼─────┐
//!                    │ StoreProvider / KeyValueStore │
//!                    │      (memory | file)          │
//!                    └───────────────────────────────┘
//! ```
//!
//! A record is written only after the vault confirms the payload. If the
//! record commit fails, the vault entry is orphaned and its reference is
//! reported in [`protect::ProtectError::RegistryWriteFailed`].
//!
//! ## Modules
//!
//! - [`store`]: Key/value backends shared by both registries
//! - [`policy`]: Policy registry and HTTP endpoints
//! - [`protected`]: Protected-data registry and HTTP endpoint
//! - [`vault`]: Vault client boundary
//! - [`protect`]: Protect workflow and HTTP endpoint
//! - [`api`]: Unified router
//! - [`server`]: Backend wiring and serving
//! - [`config`]: Configuration management

pub mod api;
pub mod config;
pub mod error;
pub mod policy;
pub mod protect;
pub mod protected;
pub mod server;
pub mod store;
pub mod vault;

pub use config::GatekeeperConfig;
pub use error::{Error, Result};
pub use server::Server;
