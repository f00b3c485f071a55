//! Password hashing and temporary password generation

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;

use crate::domain::DomainError;

/// Bytes of CSPRNG output behind each generated temporary password.
/// 16 bytes keeps the pre-encoding entropy at 128 bits.
pub const GENERATED_PASSWORD_BYTES: usize = 16;

/// Stateless hashing helper: turns plaintext passwords into storable
/// Argon2 credentials and verifies plaintexts against stored hashes.
///
/// Each hash carries its own random salt, so hashing the same plaintext
/// twice yields different strings that both verify.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationContext;

impl AuthenticationContext {
    pub fn new() -> Self {
        Self
    }

    pub fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Generate a temporary password for a newly created user: 16 bytes from
/// the OS CSPRNG, base64-encoded into a 24-character printable string.
pub fn generate_temporary_password() -> String {
    let mut seed = [0u8; GENERATED_PASSWORD_BYTES];
    OsRng.fill_bytes(&mut seed);

    BASE64.encode(seed)
}
