//! Policy registry and its HTTP management endpoints
//!
//! Policies are administrator-supplied documents addressed by a
//! case-insensitive id. The gateway only checks that a referenced policy
//! exists; evaluating a policy's content is left to the access path.

pub mod handler;
pub mod store;
pub mod types;

pub use handler::{policy_router, PolicyState};
pub use store::PolicyStore;
pub use types::PolicyDocument;
