//! User account as seen by the token core.
//!
//! The core never persists users; it only reads them through
//! [`UserLookup`](crate::repositories::UserLookup) during rotation.

use serde::{Deserialize, Serialize};

/// Role carried as an opaque claim in access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Guest,
    Student,
    Tutor,
    Teacher,
    Admin,
}

impl Role {
    /// Convert to string representation for storage and claims
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "GUEST",
            Self::Student => "STUDENT",
            Self::Tutor => "TUTOR",
            Self::Teacher => "TEACHER",
            Self::Admin => "ADMIN",
        }
    }

    /// Whether the `level` claim carries meaning for this role
    pub fn uses_level(&self) -> bool {
        matches!(self, Self::Student | Self::Tutor | Self::Teacher)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GUEST" => Ok(Self::Guest),
            "STUDENT" => Ok(Self::Student),
            "TUTOR" => Ok(Self::Tutor),
            "TEACHER" => Ok(Self::Teacher),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Account status gate checked before a refresh token is rotated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Suspended => "SUSPENDED",
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record returned by the external user lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Stable user identifier
    pub id: String,

    /// Current email address
    pub email: String,

    /// Current role
    pub role: Role,

    /// Current level (0-9)
    pub level: u8,

    /// Account status
    pub status: AccountStatus,
}

impl UserAccount {
    /// Creates an active account
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role, level: u8) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
            level,
            status: AccountStatus::Active,
        }
    }

    /// Returns a copy with the given status
    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    /// Only ACTIVE accounts may rotate refresh tokens
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}
