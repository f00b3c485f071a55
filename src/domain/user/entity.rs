//! User identity record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scope::UserScope;

/// Identity record for an API user, keyed by username.
///
/// Created by the admin-only create operation together with its
/// authentication credential; the two never exist independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    /// Unique login name
    username: String,
    first_name: String,
    last_name: String,
    /// Roles held by this user; evaluated with OR semantics
    scopes: Vec<UserScope>,
    /// Disabled users keep their record but cannot act
    disabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserInfo {
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        scopes: Vec<UserScope>,
    ) -> Self {
        let now = Utc::now();

        Self {
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            scopes,
            disabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate a record loaded from a backing store
    pub(crate) fn from_record(
        username: String,
        first_name: String,
        last_name: String,
        scopes: Vec<UserScope>,
        disabled: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            username,
            first_name,
            last_name,
            scopes,
            disabled,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn scopes(&self) -> &[UserScope] {
        &self.scopes
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn has_scope(&self, scope: UserScope) -> bool {
        self.scopes.contains(&scope)
    }

    // Mutators

    pub fn set_name(&mut self, first_name: impl Into<String>, last_name: impl Into<String>) {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self.touch();
    }

    pub fn set_scopes(&mut self, scopes: Vec<UserScope>) {
        self.scopes = scopes;
        self.touch();
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
