//! Shared error response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error envelope handed to whatever transport fronts the token core
///
/// Carries no token material and no reason beyond the code; detailed causes
/// stay in logs and security events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable code from [`error_codes`]
    pub error: String,

    pub message: String,

    /// Whether repeating the same request may succeed
    #[serde(default)]
    pub retryable: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            retryable: false,
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// The client must authenticate from scratch
    pub fn sign_in_again() -> Self {
        Self::new(error_codes::SESSION_EXPIRED, SIGN_IN_AGAIN_MESSAGE)
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }

    /// Attach a JSON-serializable detail; values that fail to serialize are dropped
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Error codes exposed to clients
pub mod error_codes {
    pub const SESSION_EXPIRED: &str = "SESSION_EXPIRED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
}

/// Generic message shown for every authentication-class failure
pub const SIGN_IN_AGAIN_MESSAGE: &str = "Your session has ended. Please sign in again.";

/// Conversion of a typed error into its client-facing envelope
pub trait IntoErrorResponse {
    fn to_error_response(&self) -> ErrorResponse;
}

pub type ApiResult<T> = Result<T, ErrorResponse>;
