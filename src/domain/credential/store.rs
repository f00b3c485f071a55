//! Credential store trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::AuthenticationCredential;
use crate::domain::DomainError;

/// Capability interface over the credential backend.
///
/// [`set`](CredentialStore::set) is create-only and fails with a conflict
/// when a credential already exists for the username. That makes the
/// credential write the linearization point for concurrent user creation:
/// of two racing creates for the same username, exactly one `set` wins.
#[async_trait]
pub trait CredentialStore: Send + Sync + Debug {
    /// Get the credential for a username
    async fn get(&self, username: &str) -> Result<Option<AuthenticationCredential>, DomainError>;

    /// Create a credential; fails with `Conflict` if one already exists
    async fn set(&self, credential: AuthenticationCredential) -> Result<(), DomainError>;

    /// Overwrite an existing credential; fails with `NotFound` if absent
    async fn update(&self, credential: AuthenticationCredential) -> Result<(), DomainError>;

    /// Remove a credential, e.g. as compensating cleanup when the paired
    /// directory write fails. Returns whether anything was removed.
    async fn delete(&self, username: &str) -> Result<bool, DomainError>;
}
