//! Configuration module with business-specific sub-modules
//!
//! - `auth` - Access token signing and refresh token lifecycle configuration
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration

pub mod auth;
pub mod database;
pub mod environment;

use serde::{Deserialize, Serialize};

pub use auth::{AuthConfig, JwtConfig, RefreshTokenConfig};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Parse `key` from the environment, falling back to `default` when unset or unparsable
pub(crate) fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Refresh token store database
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Token signing and rotation configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }

        Self {
            environment,
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            logging,
        }
    }

    /// Check the configuration for settings that must never reach production
    ///
    /// # Returns
    /// A list of human readable problems, empty when the configuration is sound
    pub fn production_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.environment.allows_default_secret() && self.auth.jwt.is_using_default_secret() {
            warnings.push("JWT secret is the development default".to_string());
        }
        if self.environment.is_production() && self.auth.jwt.secret.len() < 32 {
            warnings.push("JWT secret is shorter than 32 bytes".to_string());
        }
        warnings
    }
}
