//! Protected-data registry
//!
//! Each record binds a vault reference to the policy it was protected under.

pub mod handler;
pub mod store;
pub mod types;

pub use handler::{protected_router, ProtectedState};
pub use store::ProtectedDataStore;
pub use types::ProtectedData;
