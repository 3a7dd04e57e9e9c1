//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

pub use types::{PartialIssue, TokenError, ValidationError};

use rg_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Closed set of failures produced by the token core
#[derive(Error, Debug)]
pub enum DomainError {
    /// Bad user id, email, role, level, IP or fingerprint; nothing was changed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Expired, forged, malformed or ill-shaped token
    #[error(transparent)]
    Authentication(#[from] TokenError),

    /// Unknown refresh token
    #[error("Refresh token not recognized")]
    NotFound,

    /// Reuse detected; the family has already been revoked
    #[error("Refresh token reuse detected in family {token_family}")]
    SecurityBreach {
        user_id: String,
        token_family: String,
        revoked_records: usize,
    },

    /// The account is not ACTIVE; no token was issued
    #[error("User {user_id} is not active (status: {status})")]
    UserInactive { user_id: String, status: String },

    /// Persistence failure, surfaced without retry
    #[error("Storage failure during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// The access token was issued but its refresh token could not be stored
    #[error("Access token issued but refresh token storage failed: {cause}")]
    RefreshTokenStorageFailed {
        issued: PartialIssue,
        #[source]
        cause: Box<DomainError>,
    },

    /// Invalid construction parameters
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Build a storage error from any displayable cause
    pub fn storage(operation: &'static str, cause: impl std::fmt::Display) -> Self {
        Self::Storage {
            operation,
            message: cause.to_string(),
        }
    }

    /// Build a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the end user must sign in again
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Authentication(_)
                | Self::NotFound
                | Self::SecurityBreach { .. }
                | Self::UserInactive { .. }
        )
    }

    /// Whether this error reports refresh token reuse
    pub fn is_security_breach(&self) -> bool {
        matches!(self, Self::SecurityBreach { .. })
    }

    /// Whether this error comes from the persistence layer
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::RefreshTokenStorageFailed { .. }
        )
    }

    /// Stable machine-readable name of the variant, for logs and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Authentication(_) => "authentication",
            Self::NotFound => "not_found",
            Self::SecurityBreach { .. } => "security_breach",
            Self::UserInactive { .. } => "user_inactive",
            Self::Storage { .. } => "storage",
            Self::RefreshTokenStorageFailed { .. } => "refresh_token_storage_failed",
            Self::Configuration { .. } => "configuration",
        }
    }
}

/// End users only ever see "please sign in again" for authentication-class
/// failures; the distinction stays in logs and security events.
impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        if self.requires_reauthentication() {
            return ErrorResponse::sign_in_again();
        }

        match self {
            Self::Storage { .. } | Self::RefreshTokenStorageFailed { .. } => ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "The service is temporarily unavailable. Please try again.",
            )
            .retryable(),
            _ => ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred."),
        }
    }
}
