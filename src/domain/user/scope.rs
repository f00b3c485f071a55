//! Authorization scopes and the access check they gate

use serde::{Deserialize, Serialize};

/// A named role granting access to a subset of operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserScope {
    Admin,
    Auditor,
    Guardian,
    Voter,
}

impl UserScope {
    /// Every scope the API knows about
    pub const ALL: [UserScope; 4] = [
        UserScope::Admin,
        UserScope::Auditor,
        UserScope::Guardian,
        UserScope::Voter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Auditor => "auditor",
            Self::Guardian => "guardian",
            Self::Voter => "voter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "auditor" => Some(Self::Auditor),
            "guardian" => Some(Self::Guardian),
            "voter" => Some(Self::Voter),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// OR-semantics scope check: access is granted iff the caller holds at
/// least one of the required scopes. Pure so it can be tested without a
/// running server.
pub fn has_required_scope(required: &[UserScope], actual: &[UserScope]) -> bool {
    actual.iter().any(|scope| required.contains(scope))
}
