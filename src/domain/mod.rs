//! Domain layer: entities, capability traits, and errors
//!
//! Nothing in this layer performs I/O directly; backends implement the
//! traits declared here.

pub mod credential;
pub mod error;
pub mod user;

pub use credential::{AuthenticationCredential, CredentialStore};
pub use error::DomainError;
pub use user::{UserDirectory, UserFilter, UserInfo, UserScope};
