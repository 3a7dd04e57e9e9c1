//! Error kinds for token verification and input validation.

use thiserror::Error;

/// Access and refresh token authentication failures
///
/// Stateless and safe; the caller should re-authenticate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Invalid token claims")]
    InvalidClaims,

    #[error("Malformed token")]
    Malformed,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    /// The family was revoked while the token was being rotated
    #[error("Refresh token revoked")]
    RefreshTokenRevoked,
}

/// Input validation failures
///
/// Raised before any token or record is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: &'static str },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: &'static str },

    #[error("Out of range: {field} (min: {min}, max: {max}, actual: {actual})")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Invalid length: {field} (max: {max}, actual: {actual})")]
    InvalidLength {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid IP address")]
    InvalidIpAddress,
}

impl ValidationError {
    /// Name of the offending input
    pub fn field(&self) -> &'static str {
        match self {
            Self::RequiredField { field }
            | Self::InvalidFormat { field }
            | Self::OutOfRange { field, .. }
            | Self::InvalidLength { field, .. } => field,
            Self::InvalidEmail => "email",
            Self::InvalidIpAddress => "ip_address",
        }
    }
}

/// What a caller still receives when issuance could not persist the refresh token
///
/// The access token is valid; there is no refresh token to go with it.
#[derive(Clone, PartialEq, Eq)]
pub struct PartialIssue {
    /// User the access token was issued for
    pub user_id: String,

    /// Signed access token
    pub access_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,
}

impl std::fmt::Debug for PartialIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartialIssue")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .field("access_expires_in", &self.access_expires_in)
            .finish()
    }
}
