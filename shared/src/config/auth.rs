//! Access token signing and refresh token lifecycle configuration

use serde::{Deserialize, Serialize};

use super::env_parse;

const DEFAULT_JWT_SECRET: &str = "development-secret-please-change-in-production";

/// JWT access token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Symmetric secret key for signing tokens
    pub secret: String,

    /// Access token expiry time in seconds
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,

    /// JWT issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Algorithm for JWT signing (HS256, HS384 or HS512)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Clock skew tolerated when checking `exp` and `nbf`, in seconds
    #[serde(default)]
    pub leeway_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_JWT_SECRET),
            access_token_expiry: default_access_token_expiry(),
            issuer: default_issuer(),
            algorithm: default_algorithm(),
            leeway_seconds: 0,
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            access_token_expiry: env_parse("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or(defaults.algorithm),
            leeway_seconds: env_parse("JWT_LEEWAY_SECONDS", defaults.leeway_seconds),
        }
    }
}

/// Refresh token rotation and retention configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshTokenConfig {
    /// Refresh token expiry time in seconds
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,

    /// Days an expired record is kept for audit before deletion
    #[serde(default = "default_expired_retention_days")]
    pub expired_retention_days: i64,

    /// Days a revoked record is kept for audit before deletion
    #[serde(default = "default_revoked_retention_days")]
    pub revoked_retention_days: i64,

    /// How often the background cleanup runs, in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,

    /// Whether the background cleanup task is started
    #[serde(default = "default_cleanup_enabled")]
    pub cleanup_enabled: bool,
}

impl Default for RefreshTokenConfig {
    fn default() -> Self {
        Self {
            refresh_token_expiry: default_refresh_token_expiry(),
            expired_retention_days: default_expired_retention_days(),
            revoked_retention_days: default_revoked_retention_days(),
            cleanup_interval_seconds: default_cleanup_interval(),
            cleanup_enabled: default_cleanup_enabled(),
        }
    }
}

impl RefreshTokenConfig {
    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            refresh_token_expiry: env_parse("REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
            expired_retention_days: env_parse(
                "REFRESH_EXPIRED_RETENTION_DAYS",
                defaults.expired_retention_days,
            ),
            revoked_retention_days: env_parse(
                "REFRESH_REVOKED_RETENTION_DAYS",
                defaults.revoked_retention_days,
            ),
            cleanup_interval_seconds: env_parse(
                "TOKEN_CLEANUP_INTERVAL",
                defaults.cleanup_interval_seconds,
            ),
            cleanup_enabled: env_parse("TOKEN_CLEANUP_ENABLED", defaults.cleanup_enabled),
        }
    }
}

/// Complete token configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Access token configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Refresh token configuration
    #[serde(default)]
    pub refresh: RefreshTokenConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            refresh: RefreshTokenConfig::from_env(),
        }
    }

    /// Get access token expiry in seconds
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.jwt.access_token_expiry
    }

    /// Get refresh token expiry in seconds
    pub fn refresh_token_expiry_seconds(&self) -> i64 {
        self.refresh.refresh_token_expiry
    }
}

fn default_access_token_expiry() -> i64 {
    3600
}

fn default_refresh_token_expiry() -> i64 {
    30 * 86400
}

fn default_issuer() -> String {
    String::from("rotaguard")
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_expired_retention_days() -> i64 {
    30
}

fn default_revoked_retention_days() -> i64 {
    7
}

fn default_cleanup_interval() -> u64 {
    3600
}

fn default_cleanup_enabled() -> bool {
    true
}
