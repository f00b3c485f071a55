//! User service: orchestration for the user-administration operations

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::credential::{AuthenticationCredential, CredentialStore};
use crate::domain::user::{
    validate_name, validate_password, validate_username, UserDirectory, UserFilter, UserInfo,
    UserScope,
};
use crate::domain::DomainError;

use super::password::{generate_temporary_password, AuthenticationContext};

/// Hard cap on a single result page
pub const MAX_PAGE_SIZE: usize = 1000;

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub scopes: Vec<UserScope>,
    pub disabled: bool,
}

/// A freshly created user together with its generated temporary password.
/// The password is disclosed exactly once and never persisted.
#[derive(Clone)]
pub struct CreatedUser {
    pub user: UserInfo,
    pub password: String,
}

// The plaintext must not reach logs through debug formatting
impl std::fmt::Debug for CreatedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatedUser")
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Orchestrates the user directory, credential store, and hashing context
#[derive(Debug)]
pub struct UserService {
    directory: Arc<dyn UserDirectory>,
    credentials: Arc<dyn CredentialStore>,
    auth: AuthenticationContext,
    store_timeout: Duration,
}

impl UserService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        credentials: Arc<dyn CredentialStore>,
        auth: AuthenticationContext,
        store_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            credentials,
            auth,
            store_timeout,
        }
    }

    /// Wrap a store call in the request-level timeout; a timeout surfaces
    /// as a retryable unavailable error.
    async fn store_call<T, F>(&self, operation: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match tokio::time::timeout(self.store_timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::unavailable("User store request timed out")),
        }
    }

    /// Search the directory. Results come back in username-ascending
    /// order; `limit` is clamped to [`MAX_PAGE_SIZE`].
    pub async fn find_users(
        &self,
        filter: &UserFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<UserInfo>, DomainError> {
        if limit == 0 {
            return Err(DomainError::validation("limit must be greater than zero"));
        }

        let limit = limit.min(MAX_PAGE_SIZE);

        self.store_call(self.directory.filter_user_info(filter, skip, limit))
            .await
    }

    /// Fetch the record for the caller's own resolved identity. The
    /// username comes from the validated token, never from request input.
    pub async fn current_user(&self, username: Option<&str>) -> Result<UserInfo, DomainError> {
        let username = username.ok_or_else(|| DomainError::validation("User not specified"))?;

        let user = self
            .store_call(self.directory.get_user_info(username))
            .await?
            .ok_or_else(|| DomainError::validation("User not specified"))?;

        if user.disabled() {
            return Err(DomainError::validation("Inactive user"));
        }

        Ok(user)
    }

    /// Create a user with a server-generated temporary password.
    ///
    /// The credential write is create-only and acts as the linearization
    /// point: of two concurrent creates for one username, exactly one
    /// succeeds and the other observes a conflict. If the directory write
    /// fails afterwards the credential is removed again so neither record
    /// exists without the other.
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
    ) -> Result<CreatedUser, DomainError> {
        validate_username(&request.username)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        validate_name(&request.first_name).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_name(&request.last_name).map_err(|e| DomainError::validation(e.to_string()))?;

        if request.scopes.is_empty() {
            return Err(DomainError::validation("At least one scope is required"));
        }

        if self
            .store_call(self.directory.user_exists(&request.username))
            .await?
        {
            return Err(DomainError::conflict("User already exists"));
        }

        let password = generate_temporary_password();
        let hashed_password = self.auth.hash(&password)?;
        let credential = AuthenticationCredential::new(&request.username, hashed_password);

        self.store_call(self.credentials.set(credential))
            .await
            .map_err(|e| match e {
                // A concurrent create won the race
                DomainError::Conflict { .. } => DomainError::conflict("User already exists"),
                other => other,
            })?;

        let mut user = UserInfo::new(
            &request.username,
            &request.first_name,
            &request.last_name,
            request.scopes,
        );
        user.set_disabled(request.disabled);

        if let Err(e) = self.store_call(self.directory.set_user_info(user.clone())).await {
            // Compensating cleanup: never leave a credential without its user
            if let Err(cleanup) = self
                .store_call(self.credentials.delete(&request.username))
                .await
            {
                warn!(
                    username = %request.username,
                    error = %cleanup,
                    "Failed to roll back credential after directory write failure"
                );
            }

            return Err(e);
        }

        info!(username = %request.username, "Created user");

        Ok(CreatedUser { user, password })
    }

    /// Overwrite the stored hash for an existing credential
    pub async fn reset_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), DomainError> {
        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        let mut credential = self
            .store_call(self.credentials.get(username))
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("Credential for '{}' not found", username))
            })?;

        credential.set_hashed_password(self.auth.hash(password)?);

        self.store_call(self.credentials.update(credential)).await?;

        info!(username = %username, "Reset password");

        Ok(())
    }

    /// Verify a username/password pair for token issuance. Every failure
    /// mode maps to the same unauthorized error so the response does not
    /// reveal which part was wrong.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserInfo, DomainError> {
        let denied = || DomainError::unauthorized("Invalid username or password");

        let credential = self
            .store_call(self.credentials.get(username))
            .await?
            .ok_or_else(denied)?;

        if !self.auth.verify(password, credential.hashed_password()) {
            return Err(denied());
        }

        let user = self
            .store_call(self.directory.get_user_info(username))
            .await?
            .ok_or_else(denied)?;

        if user.disabled() {
            return Err(denied());
        }

        Ok(user)
    }

    /// Provision the default admin account on first startup. Returns
    /// whether anything was created; an existing record is left alone.
    pub async fn bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, DomainError> {
        if self.store_call(self.directory.user_exists(username)).await? {
            return Ok(false);
        }

        let hashed_password = self.auth.hash(password)?;
        let credential = AuthenticationCredential::new(username, hashed_password);

        match self.store_call(self.credentials.set(credential)).await {
            Ok(()) => {}
            // Another replica bootstrapped concurrently
            Err(DomainError::Conflict { .. }) => return Ok(false),
            Err(e) => return Err(e),
        }

        let user = UserInfo::new(username, "Default", "Admin", vec![UserScope::Admin]);
        self.store_call(self.directory.set_user_info(user)).await?;

        info!(username = %username, "Provisioned bootstrap admin");

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::user::repository::{
        InMemoryCredentialStore, InMemoryUserDirectory,
    };

    fn service() -> UserService {
        UserService::new(
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(InMemoryCredentialStore::new()),
            AuthenticationContext::new(),
            Duration::from_secs(5),
        )
    }

    fn request(username: &str, scopes: Vec<UserScope>) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            scopes,
            disabled: false,
        }
    }

    #[tokio::test]
    async fn test_create_user_returns_generated_password() {
        let service = service();

        let created = service
            .create_user(request("alice", vec![UserScope::Voter]))
            .await
            .unwrap();

        assert_eq!(created.user.username(), "alice");
        assert!(!created.password.is_empty());

        // The generated password authenticates
        let user = service
            .authenticate("alice", &created.password)
            .await
            .unwrap();
        assert_eq!(user.username(), "alice");
    }

    #[tokio::test]
    async fn test_create_user_invalid_username() {
        let service = service();

        let result = service.create_user(request("a!", vec![UserScope::Voter])).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_user_requires_scopes() {
        let service = service();

        let result = service.create_user(request("alice", vec![])).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let service = service();

        service
            .create_user(request("alice", vec![UserScope::Voter]))
            .await
            .unwrap();

        let result = service
            .create_user(request("alice", vec![UserScope::Auditor]))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_creates_one_wins() {
        let service = Arc::new(service());

        let (a, b) = tokio::join!(
            service.create_user(request("bob", vec![UserScope::Voter])),
            service.create_user(request("bob", vec![UserScope::Voter])),
        );

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|&&ok| ok).count();
        assert_eq!(successes, 1);

        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_generated_passwords_are_unique_across_creates() {
        let service = service();

        let first = service
            .create_user(request("alice", vec![UserScope::Voter]))
            .await
            .unwrap();
        let second = service
            .create_user(request("bob", vec![UserScope::Voter]))
            .await
            .unwrap();

        assert_ne!(first.password, second.password);
    }

    #[tokio::test]
    async fn test_create_then_reset_scenario() {
        let service = service();

        let created = service
            .create_user(request("alice", vec![UserScope::Voter]))
            .await
            .unwrap();
        assert_eq!(created.user.username(), "alice");

        service.reset_password("alice", "p@ss1234").await.unwrap();

        // The old generated password no longer verifies, the new one does
        let old = service.authenticate("alice", &created.password).await;
        assert!(matches!(old, Err(DomainError::Unauthorized { .. })));

        let user = service.authenticate("alice", "p@ss1234").await.unwrap();
        assert_eq!(user.username(), "alice");
    }

    #[tokio::test]
    async fn test_reset_password_unknown_user() {
        let service = service();

        let result = service.reset_password("ghost", "p@ss1234").await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_reset_password_too_short() {
        let service = service();

        service
            .create_user(request("alice", vec![UserScope::Voter]))
            .await
            .unwrap();

        let result = service.reset_password("alice", "short").await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_current_user() {
        let service = service();

        service
            .create_user(request("alice", vec![UserScope::Voter]))
            .await
            .unwrap();

        let user = service.current_user(Some("alice")).await.unwrap();
        assert_eq!(user.username(), "alice");
    }

    #[tokio::test]
    async fn test_current_user_without_username() {
        let service = service();

        let result = service.current_user(None).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_current_user_disabled() {
        let service = service();

        let mut req = request("alice", vec![UserScope::Voter]);
        req.disabled = true;
        service.create_user(req).await.unwrap();

        let result = service.current_user(Some("alice")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let service = service();

        service
            .create_user(request("alice", vec![UserScope::Voter]))
            .await
            .unwrap();

        let result = service.authenticate("alice", "wrong-password").await;
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let service = service();

        let result = service.authenticate("ghost", "whatever1").await;
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_disabled_user() {
        let service = service();

        let mut req = request("alice", vec![UserScope::Voter]);
        req.disabled = true;
        let created = service.create_user(req).await.unwrap();

        let result = service.authenticate("alice", &created.password).await;
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_find_users_pagination() {
        let service = service();

        for name in ["carol", "alice", "dan", "bob"] {
            service
                .create_user(request(name, vec![UserScope::Voter]))
                .await
                .unwrap();
        }

        let page = service
            .find_users(&UserFilter::default(), 1, 2)
            .await
            .unwrap();
        let names: Vec<&str> = page.iter().map(|u| u.username()).collect();
        assert_eq!(names, vec!["bob", "carol"]);
    }

    #[tokio::test]
    async fn test_find_users_rejects_zero_limit() {
        let service = service();

        let result = service.find_users(&UserFilter::default(), 0, 0).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_find_users_clamps_limit() {
        let service = service();

        service
            .create_user(request("alice", vec![UserScope::Voter]))
            .await
            .unwrap();

        // A huge limit is accepted but clamped, not rejected
        let page = service
            .find_users(&UserFilter::default(), 0, usize::MAX)
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn test_find_users_with_filter() {
        let service = service();

        service
            .create_user(request("alice", vec![UserScope::Voter]))
            .await
            .unwrap();
        service
            .create_user(request("bob", vec![UserScope::Guardian]))
            .await
            .unwrap();

        let filter = UserFilter {
            scope: Some(UserScope::Guardian),
            ..UserFilter::default()
        };

        let page = service.find_users(&filter, 0, 100).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].username(), "bob");
    }

    #[tokio::test]
    async fn test_bootstrap_admin_provisions_once() {
        let service = service();

        assert!(service.bootstrap_admin("default", "testingpass").await.unwrap());
        assert!(!service.bootstrap_admin("default", "testingpass").await.unwrap());

        let admin = service.current_user(Some("default")).await.unwrap();
        assert!(admin.has_scope(UserScope::Admin));

        let user = service.authenticate("default", "testingpass").await.unwrap();
        assert_eq!(user.username(), "default");
    }

    #[tokio::test]
    async fn test_bootstrap_does_not_overwrite_existing_password() {
        let service = service();

        service.bootstrap_admin("default", "testingpass").await.unwrap();
        service.reset_password("default", "rotated-pass").await.unwrap();

        // A restart must not roll the password back
        service.bootstrap_admin("default", "testingpass").await.unwrap();

        assert!(service.authenticate("default", "rotated-pass").await.is_ok());
        assert!(service.authenticate("default", "testingpass").await.is_err());
    }

    #[tokio::test]
    async fn test_failed_directory_write_rolls_back_credential() {
        use async_trait::async_trait;

        // Accepts reads but refuses every write
        #[derive(Debug)]
        struct ReadOnlyDirectory;

        #[async_trait]
        impl UserDirectory for ReadOnlyDirectory {
            async fn get_user_info(
                &self,
                _username: &str,
            ) -> Result<Option<UserInfo>, DomainError> {
                Ok(None)
            }

            async fn set_user_info(&self, _user: UserInfo) -> Result<(), DomainError> {
                Err(DomainError::storage("write refused"))
            }

            async fn filter_user_info(
                &self,
                _filter: &UserFilter,
                _skip: usize,
                _limit: usize,
            ) -> Result<Vec<UserInfo>, DomainError> {
                Ok(vec![])
            }
        }

        let credentials = Arc::new(InMemoryCredentialStore::new());
        let service = UserService::new(
            Arc::new(ReadOnlyDirectory),
            credentials.clone(),
            AuthenticationContext::new(),
            Duration::from_secs(5),
        );

        let result = service
            .create_user(request("alice", vec![UserScope::Voter]))
            .await;
        assert!(result.is_err());

        // No credential may survive without its user record
        assert!(credentials.get("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_timeout_surfaces_unavailable() {
        use async_trait::async_trait;

        #[derive(Debug)]
        struct StalledDirectory;

        #[async_trait]
        impl UserDirectory for StalledDirectory {
            async fn get_user_info(
                &self,
                _username: &str,
            ) -> Result<Option<UserInfo>, DomainError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(None)
            }

            async fn set_user_info(&self, _user: UserInfo) -> Result<(), DomainError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }

            async fn filter_user_info(
                &self,
                _filter: &UserFilter,
                _skip: usize,
                _limit: usize,
            ) -> Result<Vec<UserInfo>, DomainError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(vec![])
            }
        }

        let service = UserService::new(
            Arc::new(StalledDirectory),
            Arc::new(InMemoryCredentialStore::new()),
            AuthenticationContext::new(),
            Duration::from_millis(50),
        );

        let result = service.find_users(&UserFilter::default(), 0, 10).await;
        match result {
            Err(e) => assert!(e.is_retryable()),
            Ok(_) => panic!("expected a timeout"),
        }
    }
}
