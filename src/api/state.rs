//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::auth::TokenService;
use crate::infrastructure::user::UserService;

/// Shared services handed to every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(user_service: Arc<UserService>, tokens: Arc<TokenService>) -> Self {
        Self {
            user_service,
            tokens,
        }
    }
}
