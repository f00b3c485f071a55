//! User management endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{RequireAdmin, RequireAuthenticated};
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::{UserFilter, UserInfo, UserScope};
use crate::infrastructure::user::CreateUserRequest;

/// Pagination window for find requests
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

/// Request body for user search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQueryRequest {
    #[serde(default)]
    pub filter: UserFilter,
}

/// Page of users matching a search
#[derive(Debug, Serialize)]
pub struct UserQueryResponse {
    pub users: Vec<UserInfo>,
}

/// Request body for user creation; system-generated fields are absent
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserPayload {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub scopes: Vec<UserScope>,
    #[serde(default)]
    pub disabled: bool,
}

/// Created user plus its one-time generated password
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub user_info: UserInfo,
    pub password: String,
}

/// Request body for a password reset
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub username: String,
    pub password: String,
}

/// The reset target and the plaintext supplied by the caller, echoed back
#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub username: String,
    pub password: String,
}

/// Find users
///
/// POST /api/v1/user/find  (admin)
///
/// Searches the directory for users matching the filter criteria in the
/// request body. An empty filter returns all users, paginated.
pub async fn find_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(pagination): Query<Pagination>,
    Json(request): Json<UserQueryRequest>,
) -> Result<Json<UserQueryResponse>, ApiError> {
    let users = state
        .user_service
        .find_users(&request.filter, pagination.skip, pagination.limit)
        .await?;

    Ok(Json(UserQueryResponse { users }))
}

/// Get user info for the current logged in user
///
/// GET /api/v1/user/me  (any authenticated scope)
pub async fn me(
    State(state): State<AppState>,
    RequireAuthenticated(identity): RequireAuthenticated,
) -> Result<Json<UserInfo>, ApiError> {
    let user = state
        .user_service
        .current_user(identity.username())
        .await?;

    Ok(Json(user))
}

/// Create a new user
///
/// PUT /api/v1/user  (admin)
///
/// The response includes the server-generated temporary password. It is
/// disclosed exactly once and cannot be retrieved again.
pub async fn create_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let created = state
        .user_service
        .create_user(CreateUserRequest {
            username: payload.username,
            first_name: payload.first_name,
            last_name: payload.last_name,
            scopes: payload.scopes,
            disabled: payload.disabled,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            user_info: created.user,
            password: created.password,
        }),
    ))
}

/// Reset a user's password
///
/// POST /api/v1/user/reset_password  (admin)
pub async fn reset_password(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, ApiError> {
    state
        .user_service
        .reset_password(&request.username, &request.password)
        .await?;

    Ok(Json(ResetPasswordResponse {
        username: request.username,
        password: request.password,
    }))
}
