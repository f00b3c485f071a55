//! PostgreSQL user directory and credential store

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{QueryBuilder, Row};

use crate::domain::credential::{AuthenticationCredential, CredentialStore};
use crate::domain::user::{UserDirectory, UserFilter, UserInfo, UserScope};
use crate::domain::DomainError;

/// Connection settings for the PostgreSQL backend
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection acquire timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/election_api".to_string(),
            max_connections: 10,
            connect_timeout_secs: 30,
        }
    }
}

/// Open a connection pool and make sure the schema exists
pub async fn connect(config: &PostgresConfig) -> Result<PgPool, DomainError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

    migrate(&pool).await?;

    Ok(pool)
}

/// Create the backing tables if they are missing. The primary keys give
/// the store-level uniqueness the creation invariant relies on.
pub async fn migrate(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_info (
            username    TEXT PRIMARY KEY,
            first_name  TEXT NOT NULL,
            last_name   TEXT NOT NULL,
            scopes      TEXT[] NOT NULL,
            disabled    BOOLEAN NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL,
            updated_at  TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| DomainError::storage(format!("Failed to create user_info table: {}", e)))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS auth_credentials (
            username        TEXT PRIMARY KEY,
            hashed_password TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| {
        DomainError::storage(format!("Failed to create auth_credentials table: {}", e))
    })?;

    Ok(())
}

/// PostgreSQL implementation of [`UserDirectory`]
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn get_user_info(&self, username: &str) -> Result<Option<UserInfo>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT username, first_name, last_name, scopes, disabled, created_at, updated_at
            FROM user_info
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn set_user_info(&self, user: UserInfo) -> Result<(), DomainError> {
        let scopes: Vec<String> = user
            .scopes()
            .iter()
            .map(|scope| scope.as_str().to_string())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO user_info (username, first_name, last_name, scopes, disabled,
                                   created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (username) DO UPDATE
            SET first_name = EXCLUDED.first_name,
                last_name  = EXCLUDED.last_name,
                scopes     = EXCLUDED.scopes,
                disabled   = EXCLUDED.disabled,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user.username())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(&scopes)
        .bind(user.disabled())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to set user: {}", e)))?;

        Ok(())
    }

    async fn filter_user_info(
        &self,
        filter: &UserFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<UserInfo>, DomainError> {
        let mut query = QueryBuilder::<sqlx::Postgres>::new(
            "SELECT username, first_name, last_name, scopes, disabled, created_at, updated_at \
             FROM user_info WHERE TRUE",
        );

        if let Some(username) = &filter.username {
            query.push(" AND username = ").push_bind(username);
        }

        if let Some(fragment) = &filter.name_contains {
            let pattern = format!("%{}%", fragment);
            query
                .push(" AND (first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR last_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(scope) = filter.scope {
            query
                .push(" AND ")
                .push_bind(scope.as_str())
                .push(" = ANY(scopes)");
        }

        if let Some(disabled) = filter.disabled {
            query.push(" AND disabled = ").push_bind(disabled);
        }

        query
            .push(" ORDER BY username ASC OFFSET ")
            .push_bind(skip as i64)
            .push(" LIMIT ")
            .push_bind(limit as i64);

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to filter users: {}", e)))?;

        let mut users = Vec::with_capacity(rows.len());

        for row in rows {
            users.push(row_to_user(&row)?);
        }

        Ok(users)
    }
}

/// PostgreSQL implementation of [`CredentialStore`]
#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn get(&self, username: &str) -> Result<Option<AuthenticationCredential>, DomainError> {
        let row = sqlx::query(
            "SELECT username, hashed_password FROM auth_credentials WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get credential: {}", e)))?;

        Ok(row.map(|row| {
            AuthenticationCredential::new(
                row.get::<String, _>("username"),
                row.get::<String, _>("hashed_password"),
            )
        }))
    }

    async fn set(&self, credential: AuthenticationCredential) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO auth_credentials (username, hashed_password) VALUES ($1, $2)")
            .bind(credential.username())
            .bind(credential.hashed_password())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let msg = e.to_string();

                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    DomainError::conflict(format!(
                        "Credential for '{}' already exists",
                        credential.username()
                    ))
                } else {
                    DomainError::storage(format!("Failed to create credential: {}", e))
                }
            })?;

        Ok(())
    }

    async fn update(&self, credential: AuthenticationCredential) -> Result<(), DomainError> {
        let result =
            sqlx::query("UPDATE auth_credentials SET hashed_password = $2 WHERE username = $1")
                .bind(credential.username())
                .bind(credential.hashed_password())
                .execute(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to update credential: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Credential for '{}' not found",
                credential.username()
            )));
        }

        Ok(())
    }

    async fn delete(&self, username: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM auth_credentials WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete credential: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<UserInfo, DomainError> {
    let username: String = row.get("username");
    let scope_names: Vec<String> = row.get("scopes");

    let mut scopes = Vec::with_capacity(scope_names.len());

    for name in scope_names {
        let scope = UserScope::parse(&name).ok_or_else(|| {
            DomainError::storage(format!(
                "Unknown scope '{}' stored for user '{}'",
                name, username
            ))
        })?;
        scopes.push(scope);
    }

    Ok(UserInfo::from_record(
        username,
        row.get("first_name"),
        row.get("last_name"),
        scopes,
        row.get("disabled"),
        row.get("created_at"),
        row.get("updated_at"),
    ))
}
