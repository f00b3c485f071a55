//! Version 1 API endpoints

pub mod auth;
pub mod users;

use axum::{
    routing::{get, post, put},
    Router,
};

use super::state::AppState;

/// Create the v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        // Token issuance
        .route("/auth/login", post(auth::login))
        // User management
        .route("/user/find", post(users::find_users))
        .route("/user/me", get(users::me))
        .route("/user", put(users::create_user))
        .route("/user/reset_password", post(users::reset_password))
}
