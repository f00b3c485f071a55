//! API middleware components

pub mod scope_guard;

pub use scope_guard::{AuthorizedIdentity, RequireAdmin, RequireAuthenticated};
