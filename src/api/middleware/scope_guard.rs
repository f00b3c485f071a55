//! Scope guard: precondition gate run before handler bodies
//!
//! Resolves the bearer token to `(username, scopes)` and grants access iff
//! the caller holds at least one required scope. Missing or invalid tokens
//! are unauthorized; a valid identity without the scope is forbidden.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::{has_required_scope, UserScope};

/// The caller identity resolved from a validated token
#[derive(Debug, Clone)]
pub struct AuthorizedIdentity {
    username: Option<String>,
    scopes: Vec<UserScope>,
}

impl AuthorizedIdentity {
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn scopes(&self) -> &[UserScope] {
        &self.scopes
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    Err(ApiError::unauthorized(
        "Authentication required. Provide a token via 'Authorization: Bearer <token>' header",
    ))
}

/// Run the scope check against a request's headers. No store I/O: the
/// decision rests entirely on the validated token.
pub fn authorize(
    headers: &HeaderMap,
    state: &AppState,
    required: &[UserScope],
) -> Result<AuthorizedIdentity, ApiError> {
    let token = extract_bearer_token(headers)?;

    let claims = state.tokens.validate(&token).map_err(ApiError::from)?;

    if !has_required_scope(required, &claims.scopes) {
        debug!(
            username = claims.username().unwrap_or("<none>"),
            "Scope check failed"
        );
        return Err(ApiError::forbidden("Insufficient scope"));
    }

    Ok(AuthorizedIdentity {
        username: claims.sub,
        scopes: claims.scopes,
    })
}

/// Extractor requiring the admin scope
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthorizedIdentity);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = authorize(&parts.headers, state, &[UserScope::Admin])?;
        Ok(RequireAdmin(identity))
    }
}

/// Extractor requiring any authenticated scope
#[derive(Debug, Clone)]
pub struct RequireAuthenticated(pub AuthorizedIdentity);

impl FromRequestParts<AppState> for RequireAuthenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = authorize(&parts.headers, state, &UserScope::ALL)?;
        Ok(RequireAuthenticated(identity))
    }
}
