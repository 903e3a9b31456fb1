//! Account registration types.

use std::fmt;

use serde::{Deserialize, Serialize};

string_enum! {
    /// Role assigned to an account at signup.
    UserRole, "role", "user, admin" {
        User => "user",
        Admin => "admin",
    }
}

/// Registration payload for `/auth/signup`.
#[derive(Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl SignupRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>, role: UserRole) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role,
        }
    }
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// An account as returned by signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
}
