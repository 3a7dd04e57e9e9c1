//! Security events emitted by the token core to the external collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::token::RevocationReason;
use crate::domain::value_objects::RequestContext;

/// Event types produced by the token lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityEventType {
    /// A consumed refresh token was presented again
    RefreshTokenReuseDetected,
    /// Every record of a token family was deactivated
    TokenFamilyRevoked,
    /// Every active record of a user was deactivated
    UserTokensRevoked,
    /// Every family active on one device was deactivated
    DeviceTokensRevoked,
}

impl SecurityEventType {
    /// Convert to string representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RefreshTokenReuseDetected => "REFRESH_TOKEN_REUSE_DETECTED",
            Self::TokenFamilyRevoked => "TOKEN_FAMILY_REVOKED",
            Self::UserTokensRevoked => "USER_TOKENS_REVOKED",
            Self::DeviceTokensRevoked => "DEVICE_TOKENS_REVOKED",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "REFRESH_TOKEN_REUSE_DETECTED" => Some(Self::RefreshTokenReuseDetected),
            "TOKEN_FAMILY_REVOKED" => Some(Self::TokenFamilyRevoked),
            "USER_TOKENS_REVOKED" => Some(Self::UserTokensRevoked),
            "DEVICE_TOKENS_REVOKED" => Some(Self::DeviceTokensRevoked),
            _ => None,
        }
    }

    /// Default severity for this event type
    pub fn severity(&self) -> Severity {
        match self {
            Self::RefreshTokenReuseDetected => Severity::Critical,
            Self::TokenFamilyRevoked | Self::DeviceTokensRevoked => Severity::Info,
            Self::UserTokensRevoked => Severity::Warning,
        }
    }
}

/// Severity attached to a security event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

/// A structured security event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecurityEvent {
    /// Unique identifier for the event
    pub id: Uuid,

    /// What happened
    pub event_type: SecurityEventType,

    /// How urgent it is
    pub severity: Severity,

    /// Affected user, when known
    pub user_id: Option<String>,

    /// Affected token family, when the event is family-scoped
    pub token_family: Option<String>,

    /// Client IP address of the request that triggered the event
    pub ip_address: Option<String>,

    /// Client user agent of the request that triggered the event
    pub user_agent: Option<String>,

    /// Device fingerprint of the request that triggered the event
    pub device_fingerprint: Option<String>,

    /// Revocation reason applied
    pub reason: String,

    /// Number of records the action deactivated
    pub affected_records: usize,

    /// When the event occurred
    pub occurred_at: DateTime<Utc>,
}

impl SecurityEvent {
    /// Creates a new event with the type's default severity
    pub fn new(event_type: SecurityEventType, reason: &RevocationReason) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            severity: event_type.severity(),
            user_id: None,
            token_family: None,
            ip_address: None,
            user_agent: None,
            device_fingerprint: None,
            reason: reason.to_string(),
            affected_records: 0,
            occurred_at: Utc::now(),
        }
    }

    /// Attach the affected user
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach the affected token family
    pub fn with_family(mut self, token_family: impl Into<String>) -> Self {
        self.token_family = Some(token_family.into());
        self
    }

    /// Attach request metadata
    pub fn with_request_context(mut self, context: &RequestContext) -> Self {
        self.ip_address = context.ip_address.clone();
        self.user_agent = context.user_agent.clone();
        self.device_fingerprint = context.device_fingerprint.clone();
        self
    }

    /// Record how many records were deactivated
    pub fn with_affected_records(mut self, count: usize) -> Self {
        self.affected_records = count;
        self
    }
}
