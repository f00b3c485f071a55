//! Stored authentication credential

/// The persisted hashed form of a user's password. The plaintext is never
/// stored; the hash never leaves the credential store boundary except for
/// verification.
#[derive(Clone)]
pub struct AuthenticationCredential {
    username: String,
    hashed_password: String,
}

impl AuthenticationCredential {
    pub fn new(username: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            hashed_password: hashed_password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn hashed_password(&self) -> &str {
        &self.hashed_password
    }

    /// Replace the stored hash, e.g. on password reset
    pub fn set_hashed_password(&mut self, hashed_password: impl Into<String>) {
        self.hashed_password = hashed_password.into();
    }
}

// Keep the hash out of debug output and logs
impl std::fmt::Debug for AuthenticationCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationCredential")
            .field("username", &self.username)
            .field("hashed_password", &"[redacted]")
            .finish()
    }
}
