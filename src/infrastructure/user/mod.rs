//! User infrastructure
//!
//! Argon2 hashing context, temporary password generation, the in-memory
//! and PostgreSQL store backends, and the user service.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{
    generate_temporary_password, AuthenticationContext, GENERATED_PASSWORD_BYTES,
};
pub use postgres_repository::{
    connect, migrate, PostgresConfig, PostgresCredentialStore, PostgresUserDirectory,
};
pub use repository::{InMemoryCredentialStore, InMemoryUserDirectory};
pub use service::{CreateUserRequest, CreatedUser, UserService, MAX_PAGE_SIZE};
