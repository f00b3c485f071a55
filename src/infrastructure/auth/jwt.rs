//! Bearer token issuance and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::user::UserScope;
use crate::domain::DomainError;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (username); absent on malformed externally issued tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Scopes held by the subject at issuance time
    #[serde(default)]
    pub scopes: Vec<UserScope>,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl AccessClaims {
    pub fn new(username: &str, scopes: &[UserScope], expire_minutes: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::minutes(expire_minutes);

        Self {
            sub: Some(username.to_string()),
            scopes: scopes.to_vec(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.sub.as_deref()
    }
}

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Signing algorithm identifier, e.g. "HS256"
    pub algorithm: String,
    /// Shared signing secret
    pub secret: String,
    /// Token lifetime in minutes
    pub expire_minutes: i64,
}

/// Issues and validates the bearer tokens the scope guard consumes
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    expire_minutes: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("expire_minutes", &self.expire_minutes)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl TokenService {
    /// Build a token service from configuration. Only HMAC algorithms are
    /// supported; anything else is a configuration error.
    pub fn new(config: &TokenConfig) -> Result<Self, DomainError> {
        let algorithm = match config.algorithm.as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => {
                return Err(DomainError::configuration(format!(
                    "Unsupported token algorithm: {}. Use HS256, HS384, or HS512.",
                    other
                )))
            }
        };

        Ok(Self {
            algorithm,
            expire_minutes: config.expire_minutes,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        })
    }

    /// Issue a signed token for an authenticated user
    pub fn issue(&self, username: &str, scopes: &[UserScope]) -> Result<String, DomainError> {
        let claims = AccessClaims::new(username, scopes, self.expire_minutes);

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate a token and return its claims. Expired, malformed, or
    /// wrongly signed tokens are all unauthorized.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, DomainError> {
        let validation = Validation::new(self.algorithm);

        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::unauthorized(format!("Invalid token: {}", e)))
    }

    pub fn expire_minutes(&self) -> i64 {
        self.expire_minutes
    }
}
