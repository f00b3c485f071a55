//! User directory trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::UserInfo;
use super::filter::UserFilter;
use crate::domain::DomainError;

/// Capability interface over the user directory backend.
///
/// Implementations must return results in username-ascending order from
/// [`filter_user_info`](UserDirectory::filter_user_info) so pagination is
/// deterministic regardless of backend.
#[async_trait]
pub trait UserDirectory: Send + Sync + Debug {
    /// Get a user record by username
    async fn get_user_info(&self, username: &str) -> Result<Option<UserInfo>, DomainError>;

    /// Create or overwrite a user record
    async fn set_user_info(&self, user: UserInfo) -> Result<(), DomainError>;

    /// Search for users matching the filter, windowed by skip/limit
    async fn filter_user_info(
        &self,
        filter: &UserFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<UserInfo>, DomainError>;

    /// Check whether a username exists
    async fn user_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.get_user_info(username).await?.is_some())
    }
}
