//! Protect workflow and its HTTP endpoint
//!
//! Binds a payload to a policy: the payload goes to the vault, and a
//! protected-data record ties the returned vault reference to the policy id.

pub mod handler;
pub mod orchestrator;
pub mod types;

pub use handler::{protect_router, ProtectState};
pub use orchestrator::ProtectOrchestrator;
pub use types::{ProtectError, ProtectRequest, ProtectResponse, ProtectStage};
