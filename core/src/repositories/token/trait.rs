//! Refresh token store trait defining the contract for token record persistence.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::token::{RefreshTokenRecord, RevocationReason};
use crate::errors::DomainError;
use crate::services::token::secret;

/// Retention windows applied by [`RefreshTokenStore::cleanup`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupPolicy {
    /// How long inactive records are kept after they expire
    pub expired_retention: Duration,
    /// How long inactive records are kept after they are revoked
    pub revoked_retention: Duration,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            expired_retention: Duration::days(30),
            revoked_retention: Duration::days(7),
        }
    }
}

impl CleanupPolicy {
    pub fn new(expired_retention: Duration, revoked_retention: Duration) -> Self {
        Self {
            expired_retention,
            revoked_retention,
        }
    }

    pub fn from_days(expired_retention_days: i64, revoked_retention_days: i64) -> Self {
        Self::new(
            Duration::days(expired_retention_days),
            Duration::days(revoked_retention_days),
        )
    }

    pub fn expired_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.expired_retention
    }

    pub fn revoked_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.revoked_retention
    }

    /// Whether `record` may be deleted at `now`
    ///
    /// Active records are never purgeable.
    pub fn is_purgeable(&self, record: &RefreshTokenRecord, now: DateTime<Utc>) -> bool {
        if record.is_active {
            return false;
        }

        let expired_long_ago = record.expires_at < self.expired_cutoff(now);
        let revoked_long_ago = record
            .revoked_at
            .map_or(false, |revoked_at| revoked_at < self.revoked_cutoff(now));

        expired_long_ago || revoked_long_ago
    }

    /// Whether `record` is still active but expired beyond the retention window
    ///
    /// Such records are deactivated by cleanup and purged on a later pass.
    pub fn is_abandoned(&self, record: &RefreshTokenRecord, now: DateTime<Utc>) -> bool {
        record.is_active && record.expires_at < self.expired_cutoff(now)
    }
}

/// Result of the atomic consume-and-check step of a rotation
///
/// Every variant carries the record as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The record was active and unexpired; it is now inactive with reason `rotated`
    Consumed(RefreshTokenRecord),
    /// The record was already inactive; nothing was changed
    AlreadyInactive(RefreshTokenRecord),
    /// The record is active but expired; nothing was changed
    Expired(RefreshTokenRecord),
}

impl ConsumeOutcome {
    pub fn record(&self) -> &RefreshTokenRecord {
        match self {
            Self::Consumed(record) | Self::AlreadyInactive(record) | Self::Expired(record) => {
                record
            }
        }
    }

    /// Whether the presented token had already been used or revoked
    pub fn was_already_inactive(&self) -> bool {
        matches!(self, Self::AlreadyInactive(_))
    }
}

/// Store trait for refresh token records
///
/// All operations are keyed by token hash, never by the secret itself.
///
/// # Security Considerations
/// - `consume_and_check` must be atomic over the record: of any number of
///   concurrent calls for one hash, exactly one may observe it active
/// - Family revocation covers every record in the family, active or not
/// - Cleanup must never delete an active record
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist a new record
    ///
    /// # Arguments
    /// * `record` - The record to insert; its `token_hash` must be unique
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The stored record
    /// * `Err(DomainError::Storage)` - Insert failed (including duplicate hash)
    async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError>;

    /// Atomically read a record and, if it is active and unexpired, deactivate it
    ///
    /// # Arguments
    /// * `token_hash` - Hash of the presented refresh secret
    /// * `now` - Clock reading used for the expiry check and `revoked_at`
    ///
    /// # Returns
    /// * `Ok(None)` - No record with this hash
    /// * `Ok(Some(ConsumeOutcome))` - The prior state and what happened to it
    /// * `Err(DomainError::Storage)` - Persistence failure; nothing may be assumed changed
    async fn consume_and_check(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ConsumeOutcome>, DomainError>;

    /// Find a record by hash without modifying it
    async fn find_by_hash(&self, token_hash: &str)
        -> Result<Option<RefreshTokenRecord>, DomainError>;

    /// Deactivate every record of a family and record `reason` on each
    ///
    /// # Returns
    /// * Number of records updated
    async fn revoke_family(
        &self,
        token_family: &str,
        reason: &RevocationReason,
    ) -> Result<usize, DomainError>;

    /// Revoke every record owned by a user, inactive ones included
    ///
    /// Already inactive records take the new reason, so a rotation racing
    /// this call sees its parent revoked.
    ///
    /// # Returns
    /// * Number of records that were active before the call
    async fn revoke_all_for_user(
        &self,
        user_id: &str,
        reason: &RevocationReason,
    ) -> Result<usize, DomainError>;

    /// List a user's active, unexpired records, newest first
    async fn list_active_for_user(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError>;

    /// Purge inactive records past their retention window
    ///
    /// Active records whose expiry is older than the expired retention are
    /// deactivated with reason `expired` so a later pass can purge them.
    ///
    /// # Returns
    /// * Number of records deleted
    async fn cleanup(&self, now: DateTime<Utc>, policy: &CleanupPolicy)
        -> Result<usize, DomainError>;

    /// Hash a refresh secret the way records are keyed
    fn hash(&self, secret: &str) -> String {
        secret::hash_secret(secret)
    }
}
