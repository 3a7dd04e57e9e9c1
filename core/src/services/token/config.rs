//! Configuration for the token service

use chrono::Duration;
use jsonwebtoken::Algorithm;
use rg_shared::config::AuthConfig;
use std::str::FromStr;

use crate::errors::DomainError;
use crate::repositories::CleanupPolicy;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT signing algorithm; only the HMAC family is accepted
    pub algorithm: Algorithm,
    /// Value of the `iss` claim, required on decode
    pub issuer: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// Clock skew tolerated on `exp` and `nbf`, in seconds
    pub leeway_seconds: u64,
    /// Retention windows used by cleanup
    pub cleanup_policy: CleanupPolicy,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-please-change-in-production".to_string(),
            algorithm: Algorithm::HS256,
            issuer: "rotaguard".to_string(),
            access_token_ttl: Duration::hours(1),
            refresh_token_ttl: Duration::days(30),
            leeway_seconds: 0,
            cleanup_policy: CleanupPolicy::default(),
        }
    }
}

impl TokenServiceConfig {
    /// Create a configuration with the given secret and default lifetimes
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            ..Default::default()
        }
    }

    /// Build from the shared authentication configuration
    pub fn from_auth_config(config: &AuthConfig) -> Result<Self, DomainError> {
        let algorithm = Algorithm::from_str(&config.jwt.algorithm).map_err(|_| {
            DomainError::configuration(format!(
                "Unsupported JWT algorithm: {}",
                config.jwt.algorithm
            ))
        })?;

        Ok(Self {
            jwt_secret: config.jwt.secret.clone(),
            algorithm,
            issuer: config.jwt.issuer.clone(),
            access_token_ttl: Duration::seconds(config.access_token_expiry_seconds()),
            refresh_token_ttl: Duration::seconds(config.refresh_token_expiry_seconds()),
            leeway_seconds: config.jwt.leeway_seconds,
            cleanup_policy: CleanupPolicy::from_days(
                config.refresh.expired_retention_days,
                config.refresh.revoked_retention_days,
            ),
        })
    }

    pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    pub fn with_refresh_token_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_token_ttl = ttl;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Check the parameters a codec and coordinator can be built from
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.jwt_secret.is_empty() {
            return Err(DomainError::configuration("JWT secret must not be empty"));
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(DomainError::configuration(format!(
                "Unsupported JWT algorithm: {:?}",
                self.algorithm
            )));
        }
        if self.issuer.is_empty() {
            return Err(DomainError::configuration("JWT issuer must not be empty"));
        }
        if self.access_token_ttl <= Duration::zero() {
            return Err(DomainError::configuration(
                "Access token lifetime must be positive",
            ));
        }
        if self.refresh_token_ttl <= Duration::zero() {
            return Err(DomainError::configuration(
                "Refresh token lifetime must be positive",
            ));
        }
        Ok(())
    }
}
