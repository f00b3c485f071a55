//! Election management API
//!
//! The user-administration and authentication slice of the election
//! management service:
//! - Scoped bearer-token authentication (admin, auditor, guardian, voter)
//! - User directory search, creation, and self lookup
//! - Credential issuance with server-generated temporary passwords
//! - Password reset

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::AppState;
use config::StorageMode;
use infrastructure::auth::{TokenConfig, TokenService};
use infrastructure::user::{
    connect, AuthenticationContext, InMemoryCredentialStore, InMemoryUserDirectory,
    PostgresConfig, PostgresCredentialStore, PostgresUserDirectory, UserService,
};

/// Build the application state from configuration, selecting the storage
/// backend and wiring the services together.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let tokens = TokenService::new(&TokenConfig {
        algorithm: config.auth.algorithm.clone(),
        secret: config.auth.secret.clone(),
        expire_minutes: config.auth.token_expire_minutes,
    })?;

    let store_timeout = Duration::from_secs(config.storage.call_timeout_secs);

    let user_service = match config.storage.mode {
        StorageMode::Memory => UserService::new(
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(InMemoryCredentialStore::new()),
            AuthenticationContext::new(),
            store_timeout,
        ),
        StorageMode::Postgres => {
            let pool = connect(&PostgresConfig {
                url: config.storage.url.clone(),
                max_connections: config.storage.max_connections,
                ..PostgresConfig::default()
            })
            .await?;

            UserService::new(
                Arc::new(PostgresUserDirectory::new(pool.clone())),
                Arc::new(PostgresCredentialStore::new(pool)),
                AuthenticationContext::new(),
                store_timeout,
            )
        }
    };

    Ok(AppState::new(Arc::new(user_service), Arc::new(tokens)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_app_state_memory_mode() {
        let config = AppConfig::default();

        let state = create_app_state(&config).await.unwrap();

        // The wired service starts with an empty directory
        let users = state
            .user_service
            .find_users(&domain::UserFilter::default(), 0, 10)
            .await
            .unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_create_app_state_rejects_bad_algorithm() {
        let mut config = AppConfig::default();
        config.auth.algorithm = "none".to_string();

        assert!(create_app_state(&config).await.is_err());
    }
}
