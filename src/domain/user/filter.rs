//! Search predicates for the user directory

use serde::{Deserialize, Serialize};

use super::entity::UserInfo;
use super::scope::UserScope;

/// Field-level search predicates, combined with AND. An empty filter
/// matches every user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFilter {
    /// Exact username match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Case-insensitive substring match on first or last name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
    /// User must hold this scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<UserScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl UserFilter {
    /// Filter matching a single username
    pub fn by_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.name_contains.is_none()
            && self.scope.is_none()
            && self.disabled.is_none()
    }

    /// Evaluate the predicates against a record
    pub fn matches(&self, user: &UserInfo) -> bool {
        if let Some(username) = &self.username {
            if user.username() != username {
                return false;
            }
        }

        if let Some(fragment) = &self.name_contains {
            let fragment = fragment.to_lowercase();
            let in_first = user.first_name().to_lowercase().contains(&fragment);
            let in_last = user.last_name().to_lowercase().contains(&fragment);

            if !in_first && !in_last {
                return false;
            }
        }

        if let Some(scope) = self.scope {
            if !user.has_scope(scope) {
                return false;
            }
        }

        if let Some(disabled) = self.disabled {
            if user.disabled() != disabled {
                return false;
            }
        }

        true
    }
}
