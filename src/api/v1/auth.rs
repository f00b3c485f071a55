//! Authentication endpoints
//!
//! Issues the bearer tokens the scope guard consumes.

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response carrying the issued access token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: String,
}

/// Login with username and password
///
/// POST /api/v1/auth/login
///
/// Returns a signed access token carrying the user's scopes. Unknown
/// users, wrong passwords, and disabled accounts are rejected alike.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&request.username, &request.password)
        .await?;

    let access_token = state.tokens.issue(user.username(), user.scopes())?;
    let expires_at = Utc::now() + Duration::minutes(state.tokens.expire_minutes());

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_at: expires_at.to_rfc3339(),
    }))
}
