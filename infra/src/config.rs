//! Configuration management for infrastructure services
//!
//! Sources, lowest precedence first:
//! - Defaults read from plain environment variables (`JWT_SECRET`, `DATABASE_URL`, ...)
//! - An optional file named by `ROTAGUARD_CONFIG`, or `config/<environment>`
//! - `ROTAGUARD__*` environment variables, with `__` separating nested keys

use ::config::{Config, Environment as EnvSource, File};
use rg_shared::config::{AppConfig, Environment};

use crate::InfrastructureError;

/// Prefix for structured environment overrides
pub const ENV_PREFIX: &str = "ROTAGUARD";

/// Load the application configuration
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok(); // Load .env file if present

    let defaults = AppConfig::from_env();
    let file = std::env::var("ROTAGUARD_CONFIG")
        .unwrap_or_else(|_| default_config_file(defaults.environment));

    load_from(defaults, &file)
}

/// Layer `file` (if it exists) and `ROTAGUARD__*` variables over `defaults`
pub fn load_from(defaults: AppConfig, file: &str) -> Result<AppConfig, InfrastructureError> {
    let config = Config::builder()
        .add_source(Config::try_from(&defaults)?)
        .add_source(File::with_name(file).required(false))
        .add_source(EnvSource::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    validate(&app_config)?;
    Ok(app_config)
}

fn default_config_file(environment: Environment) -> String {
    format!("config/{}", environment.config_file())
}

fn validate(config: &AppConfig) -> Result<(), InfrastructureError> {
    if config.auth.jwt.secret.is_empty() {
        return Err(InfrastructureError::Config(
            "auth.jwt.secret must not be empty".to_string(),
        ));
    }
    if config.database.max_connections == 0 {
        return Err(InfrastructureError::Config(
            "database.max_connections must be at least 1".to_string(),
        ));
    }
    if !config.environment.allows_default_secret() && config.auth.jwt.is_using_default_secret() {
        return Err(InfrastructureError::Config(
            "the development JWT secret cannot be used in production".to_string(),
        ));
    }
    Ok(())
}
