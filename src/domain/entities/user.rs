use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix every normalized role carries
pub const ROLE_PREFIX: &str = "ROLE_";

/// Role of the signed-in user, always stored with the `ROLE_` prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Role(String);

impl Role {
    /// Normalize a raw role claim. Idempotent: `ADMIN` and `ROLE_ADMIN`
    /// both become `ROLE_ADMIN`.
    pub fn normalize(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with(ROLE_PREFIX) {
            Self(raw.to_string())
        } else {
            Self(format!("{}{}", ROLE_PREFIX, raw))
        }
    }

    pub fn admin() -> Self {
        Self::normalize("ADMIN")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a role given with or without prefix
    pub fn matches(&self, other: &str) -> bool {
        *self == Role::normalize(other)
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::normalize(&raw)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity decoded locally from the credential payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl SessionIdentity {
    pub fn new(id: i64, username: impl Into<String>, role: &str) -> Self {
        Self {
            id,
            username: username.into(),
            role: Role::normalize(role),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::admin()
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{}, {})", self.username, self.id, self.role)
    }
}

/// Server-side view of the current user (`GET /users/me`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Option<Role>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Registration payload (`POST /users/register`)
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Login payload (`POST /users/login`)
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Profile update payload (`PUT /users/me`)
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}
