//! MySQL connection pool built from [`DatabaseConfig`]

use rg_shared::config::DatabaseConfig;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    ConnectOptions, MySqlPool,
};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::log::LevelFilter;

use crate::InfrastructureError;

/// Shared MySQL pool backing the refresh token store and security event sink
#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
    config: DatabaseConfig,
}

impl DatabasePool {
    /// Connect a pool sized and timed by `config`
    ///
    /// # Errors
    /// * `InfrastructureError::Config` - the URL cannot be parsed
    /// * `InfrastructureError::Database` - no connection could be established
    pub async fn new(config: DatabaseConfig) -> Result<Self, InfrastructureError> {
        let connect_options = connect_options(&config)?;

        tracing::info!(
            url = %config.redacted_url(),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting refresh token database"
        );

        let pool = pool_options(&config)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to connect refresh token database");
                InfrastructureError::Database(e)
            })?;

        Ok(Self { pool, config })
    }

    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Round-trip a `SELECT 1` and report how long it took
    pub async fn health_check(&self) -> Result<Duration, InfrastructureError> {
        let started = Instant::now();

        let value: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Database health check failed");
                InfrastructureError::Database(e)
            })?;

        if value != 1 {
            return Err(InfrastructureError::Database(sqlx::Error::Protocol(format!(
                "health check returned {}",
                value
            ))));
        }

        let latency = started.elapsed();
        tracing::debug!(latency_ms = latency.as_millis() as u64, "Database health check passed");
        Ok(latency)
    }

    pub fn get_statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
        }
    }

    /// Close every connection; call during shutdown
    pub async fn close(&self) {
        tracing::info!(stats = %self.get_statistics(), "Closing database pool");
        self.pool.close().await;
    }

    /// Apply the SQL migrations under `migrations/`
    pub async fn run_migrations(&self) -> Result<(), InfrastructureError> {
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| InfrastructureError::Database(e.into()))?;

        tracing::info!("Database migrations applied");
        Ok(())
    }
}

/// Parse the connection URL and attach statement logging
pub(crate) fn connect_options(
    config: &DatabaseConfig,
) -> Result<MySqlConnectOptions, InfrastructureError> {
    let options = MySqlConnectOptions::from_str(&config.url)
        .map_err(|e| InfrastructureError::Config(format!("Invalid database URL: {}", e)))?;

    Ok(options
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(
            LevelFilter::Warn,
            Duration::from_millis(config.slow_query_threshold),
        ))
}

pub(crate) fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .idle_timeout(Duration::from_secs(config.idle_timeout))
        .max_lifetime(Duration::from_secs(config.max_lifetime))
        .test_before_acquire(true)
}

/// Snapshot of pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatistics {
    pub connections: u32,
    pub idle_connections: usize,
    pub max_connections: u32,
}

impl PoolStatistics {
    /// Connections currently checked out
    pub fn in_use(&self) -> usize {
        (self.connections as usize).saturating_sub(self.idle_connections)
    }

    pub fn is_saturated(&self) -> bool {
        self.connections >= self.max_connections && self.idle_connections == 0
    }
}

impl std::fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pool Stats: {}/{} connections ({} idle)",
            self.connections, self.max_connections, self.idle_connections
        )
    }
}
