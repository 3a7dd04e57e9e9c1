//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for RotaGuard. It provides
//! the concrete adapters the token core is written against.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL refresh token store and security event sink using SQLx
//! - **Config**: layered configuration loading
//! - **Logging**: `tracing` subscriber setup
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use std::sync::Arc;

use rg_core::services::{SecurityAuditConfig, SecurityAuditService, TokenCleanupConfig};
use rg_core::{TokenCleanupService, TokenService, TokenServiceConfig};
use rg_shared::config::AppConfig;

/// Configuration loading
pub mod config;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Tracing subscriber setup
pub mod logging;

#[cfg(feature = "mysql")]
use database::{DatabasePool, MySqlRefreshTokenStore, MySqlSecurityEventSink};

/// Token service wired to MySQL
#[cfg(feature = "mysql")]
pub type MySqlTokenService = TokenService<MySqlRefreshTokenStore, MySqlSecurityEventSink>;

/// Infrastructure service container
#[cfg(feature = "mysql")]
pub struct InfrastructureServices {
    pub pool: DatabasePool,
    pub token_service: Arc<MySqlTokenService>,
    pub cleanup_service: Arc<TokenCleanupService<MySqlRefreshTokenStore>>,
}

/// Initialize infrastructure services
///
/// This function sets up:
/// - Configuration from `.env`, an optional file and the environment
/// - The tracing subscriber
/// - The database connection pool
/// - The token and cleanup services
#[cfg(feature = "mysql")]
pub async fn initialize() -> Result<InfrastructureServices, InfrastructureError> {
    let config = config::load_config()?;
    logging::init_tracing(&config.logging)?;

    tracing::info!(environment = %config.environment, "Initializing infrastructure services...");

    let services = build_services(&config).await?;

    tracing::info!("Infrastructure services initialized successfully");

    Ok(services)
}

/// Wire the token services from an already loaded configuration
#[cfg(feature = "mysql")]
pub async fn build_services(config: &AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    for warning in config.production_warnings() {
        tracing::warn!("Configuration warning: {}", warning);
    }

    let pool = DatabasePool::new(config.database.clone()).await?;
    pool.run_migrations().await?;

    let store = Arc::new(MySqlRefreshTokenStore::new(pool.get_pool().clone()));
    let sink = Arc::new(MySqlSecurityEventSink::new(pool.get_pool().clone()));
    let audit = SecurityAuditService::new(sink, SecurityAuditConfig::default());

    let token_config = TokenServiceConfig::from_auth_config(&config.auth)?;
    let token_service = Arc::new(TokenService::new(Arc::clone(&store), audit, token_config)?);

    let cleanup_service = Arc::new(TokenCleanupService::new(
        store,
        TokenCleanupConfig::from(&config.auth.refresh),
    ));

    Ok(InfrastructureServices {
        pool,
        token_service,
        cleanup_service,
    })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tracing subscriber could not be installed
    #[error("Logging error: {0}")]
    Logging(String),

    /// Error raised by the token core while wiring services
    #[error(transparent)]
    Domain(#[from] rg_core::DomainError),
}

impl From<::config::ConfigError> for InfrastructureError {
    fn from(e: ::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
