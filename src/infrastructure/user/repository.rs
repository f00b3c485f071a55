//! In-memory user directory and credential store
//!
//! Backs the local storage mode and doubles as the test backend. Each
//! store holds its lock only for the duration of a single call.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::credential::{AuthenticationCredential, CredentialStore};
use crate::domain::user::{UserDirectory, UserFilter, UserInfo};
use crate::domain::DomainError;

/// In-memory implementation of [`UserDirectory`]
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<String, UserInfo>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory seeded with records, e.g. for tests
    pub fn with_users(users: Vec<UserInfo>) -> Self {
        let map = users
            .into_iter()
            .map(|user| (user.username().to_string(), user))
            .collect();

        Self {
            users: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_user_info(&self, username: &str) -> Result<Option<UserInfo>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(username).cloned())
    }

    async fn set_user_info(&self, user: UserInfo) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        users.insert(user.username().to_string(), user);
        Ok(())
    }

    async fn filter_user_info(
        &self,
        filter: &UserFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<UserInfo>, DomainError> {
        let users = self.users.read().await;

        let mut matches: Vec<UserInfo> = users
            .values()
            .filter(|user| filter.matches(user))
            .cloned()
            .collect();

        // Deterministic pagination order
        matches.sort_by(|a, b| a.username().cmp(b.username()));

        Ok(matches.into_iter().skip(skip).take(limit).collect())
    }
}

/// In-memory implementation of [`CredentialStore`]
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: Arc<RwLock<HashMap<String, AuthenticationCredential>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, username: &str) -> Result<Option<AuthenticationCredential>, DomainError> {
        let credentials = self.credentials.read().await;
        Ok(credentials.get(username).cloned())
    }

    async fn set(&self, credential: AuthenticationCredential) -> Result<(), DomainError> {
        let mut credentials = self.credentials.write().await;
        let username = credential.username().to_string();

        if credentials.contains_key(&username) {
            return Err(DomainError::conflict(format!(
                "Credential for '{}' already exists",
                username
            )));
        }

        credentials.insert(username, credential);
        Ok(())
    }

    async fn update(&self, credential: AuthenticationCredential) -> Result<(), DomainError> {
        let mut credentials = self.credentials.write().await;
        let username = credential.username().to_string();

        if !credentials.contains_key(&username) {
            return Err(DomainError::not_found(format!(
                "Credential for '{}' not found",
                username
            )));
        }

        credentials.insert(username, credential);
        Ok(())
    }

    async fn delete(&self, username: &str) -> Result<bool, DomainError> {
        let mut credentials = self.credentials.write().await;
        Ok(credentials.remove(username).is_some())
    }
}
