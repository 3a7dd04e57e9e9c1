//! Token entities: access token claims, refresh token records and token pairs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::Role;
use crate::domain::value_objects::RequestContext;

/// Lowest accepted `level` claim
pub const MIN_LEVEL: u8 = 0;

/// Highest accepted `level` claim
pub const MAX_LEVEL: u8 = 9;

/// Claims structure for the access token payload
///
/// Every field is required on decode; a token missing any of them is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (always equal to `user_id`)
    pub sub: String,

    /// User identifier
    pub user_id: String,

    /// User email address
    pub email: String,

    /// User role
    pub role: Role,

    /// User level (0-9)
    pub level: u8,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl AccessTokenClaims {
    /// Creates claims issued at `now` and valid for `ttl`
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        level: u8,
        issuer: impl Into<String>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let user_id = user_id.into();
        Self {
            sub: user_id.clone(),
            user_id,
            email: email.into(),
            role,
            level,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
            iss: issuer.into(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Checks if the claims are inside their validity window
    pub fn is_valid(&self) -> bool {
        let now = Utc::now().timestamp();
        now >= self.nbf && now < self.exp
    }

    /// Seconds until expiry, clamped at zero
    pub fn expires_in(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

/// Why a refresh token record was deactivated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RevocationReason {
    /// Superseded by a child during rotation
    Rotated,
    /// An already consumed token was presented again
    ReuseDetected,
    /// User logged out
    Logout,
    /// Password was changed
    PasswordChanged,
    /// Account flagged as compromised
    AccountCompromised,
    /// Administrative action (suspension, manual revoke)
    AdminAction,
    /// Device-scoped logout
    DeviceRevoked,
    /// Retired by cleanup long after expiry
    Expired,
    /// Free-form reason supplied by the caller
    Other(String),
}

impl RevocationReason {
    /// Convert to string representation for storage
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rotated => "rotated",
            Self::ReuseDetected => "reuse detected",
            Self::Logout => "logout",
            Self::PasswordChanged => "password changed",
            Self::AccountCompromised => "account compromised",
            Self::AdminAction => "admin action",
            Self::DeviceRevoked => "device revoked",
            Self::Expired => "expired",
            Self::Other(reason) => reason.as_str(),
        }
    }

    /// Parse from string representation; unknown values become [`RevocationReason::Other`]
    pub fn parse(s: &str) -> Self {
        match s {
            "rotated" => Self::Rotated,
            "reuse detected" => Self::ReuseDetected,
            "logout" => Self::Logout,
            "password changed" => Self::PasswordChanged,
            "account compromised" => Self::AccountCompromised,
            "admin action" => Self::AdminAction,
            "device revoked" => Self::DeviceRevoked,
            "expired" => Self::Expired,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RevocationReason> for String {
    fn from(reason: RevocationReason) -> Self {
        reason.as_str().to_string()
    }
}

impl From<String> for RevocationReason {
    fn from(s: String) -> Self {
        RevocationReason::parse(&s)
    }
}

/// Refresh token record stored in the database
///
/// Only the hash of the refresh secret is kept; the secret itself never
/// reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Unique identifier for the record
    pub id: Uuid,

    /// SHA-256 hex digest of the refresh secret
    pub token_hash: String,

    /// Identifier shared by every record descended from one issuance
    pub token_family: String,

    /// Hash of the record this one superseded; `None` for the family root
    pub parent_token_hash: Option<String>,

    /// Owner of the token
    pub user_id: String,

    /// Device fingerprint presented when the token was issued
    pub device_fingerprint: Option<String>,

    /// Client IP address presented when the token was issued
    pub ip_address: Option<String>,

    /// Client user agent presented when the token was issued
    pub user_agent: Option<String>,

    /// Whether the token may still be exchanged
    pub is_active: bool,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Timestamp when the record was first deactivated
    pub revoked_at: Option<DateTime<Utc>>,

    /// Latest reason the record (or its family) was deactivated
    pub revocation_reason: Option<RevocationReason>,
}

impl RefreshTokenRecord {
    /// Creates the root record of a new token family
    pub fn new_root(
        user_id: impl Into<String>,
        token_hash: String,
        token_family: String,
        context: &RequestContext,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_hash,
            token_family,
            parent_token_hash: None,
            user_id: user_id.into(),
            device_fingerprint: context.device_fingerprint.clone(),
            ip_address: context.ip_address.clone(),
            user_agent: context.user_agent.clone(),
            is_active: true,
            created_at: now,
            expires_at: now + ttl,
            revoked_at: None,
            revocation_reason: None,
        }
    }

    /// Creates the record that supersedes `parent` in its rotation chain
    pub fn new_child(
        parent: &RefreshTokenRecord,
        token_hash: String,
        context: &RequestContext,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            parent_token_hash: Some(parent.token_hash.clone()),
            ..Self::new_root(
                parent.user_id.clone(),
                token_hash,
                parent.token_family.clone(),
                context,
                ttl,
                now,
            )
        }
    }

    /// Whether this record started its family
    pub fn is_root(&self) -> bool {
        self.parent_token_hash.is_none()
    }

    /// Checks if the token has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Checks if the token can be exchanged at `now`
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now)
    }

    /// Deactivates the record and records `reason`
    ///
    /// The reason is always overwritten; `revoked_at` keeps the first
    /// deactivation time. Returns `true` if the record was active before.
    pub fn revoke(&mut self, reason: RevocationReason, now: DateTime<Utc>) -> bool {
        let was_active = self.is_active;
        self.is_active = false;
        self.revoked_at.get_or_insert(now);
        self.revocation_reason = Some(reason);
        was_active
    }

    /// Gets the time remaining until expiration
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

/// Token pair returned to the client
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed access token
    pub access_token: String,

    /// Opaque refresh secret
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,

    /// Family the refresh token belongs to
    pub token_family: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("access_expires_in", &self.access_expires_in)
            .field("refresh_expires_in", &self.refresh_expires_in)
            .field("token_family", &self.token_family)
            .finish()
    }
}
