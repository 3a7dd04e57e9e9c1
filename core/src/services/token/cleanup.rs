//! Token cleanup service for periodic maintenance of refresh token records
//!
//! Inactive records are purged once they fall outside their retention
//! window. Active records are never deleted.

use chrono::{DateTime, Utc};
use rg_shared::config::RefreshTokenConfig;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::repositories::{CleanupPolicy, RefreshTokenStore};

/// Schedule and retention for [`TokenCleanupService`]
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// Seconds between passes
    pub interval_seconds: u64,
    pub policy: CleanupPolicy,
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            policy: CleanupPolicy::default(),
            enabled: true,
        }
    }
}

impl From<&RefreshTokenConfig> for TokenCleanupConfig {
    fn from(config: &RefreshTokenConfig) -> Self {
        Self {
            interval_seconds: config.cleanup_interval_seconds,
            policy: CleanupPolicy::from_days(
                config.expired_retention_days,
                config.revoked_retention_days,
            ),
            enabled: config.cleanup_enabled,
        }
    }
}

/// Periodically purges stale refresh token records
pub struct TokenCleanupService<S: RefreshTokenStore + 'static> {
    store: Arc<S>,
    config: TokenCleanupConfig,
}

impl<S: RefreshTokenStore + 'static> TokenCleanupService<S> {
    pub fn new(store: Arc<S>, config: TokenCleanupConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TokenCleanupConfig {
        &self.config
    }

    pub async fn run_cleanup(&self) -> CleanupResult {
        self.run_cleanup_at(Utc::now()).await
    }

    /// Run one pass as of `now`
    ///
    /// Store failures land in [`CleanupResult::errors`]; a pass never aborts the loop.
    pub async fn run_cleanup_at(&self, now: DateTime<Utc>) -> CleanupResult {
        let mut result = CleanupResult::default();
        if !self.config.enabled {
            return result;
        }

        let started = Instant::now();
        match self.store.cleanup(now, &self.config.policy).await {
            Ok(deleted) => result.records_deleted = deleted,
            Err(e) => {
                error!(error = %e, "Refresh token cleanup failed");
                result.errors.push(e.to_string());
            }
        }
        result.elapsed = started.elapsed();

        info!(
            deleted = result.records_deleted,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Refresh token cleanup pass finished"
        );
        result
    }

    /// Spawn the periodic cleanup loop; the first pass runs immediately
    ///
    /// Returns `None` when cleanup is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Refresh token cleanup is disabled");
            return None;
        }

        let period = StdDuration::from_secs(self.config.interval_seconds.max(1));
        info!(interval_seconds = period.as_secs(), "Starting refresh token cleanup task");

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let result = self.run_cleanup().await;
                if !result.is_success() {
                    warn!(errors = ?result.errors, "Cleanup pass reported errors");
                }
            }
        }))
    }
}

/// Outcome of one cleanup pass
#[derive(Debug, Default)]
pub struct CleanupResult {
    pub records_deleted: usize,
    pub elapsed: StdDuration,
    pub errors: Vec<String>,
}

impl CleanupResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
