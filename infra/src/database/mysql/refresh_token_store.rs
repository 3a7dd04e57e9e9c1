//! MySQL implementation of the RefreshTokenStore trait.
//!
//! Records are keyed by the SHA-256 hash of the refresh secret. The
//! consume step runs inside a transaction holding a row lock so that
//! concurrent rotations of one token serialize on the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use rg_core::domain::entities::token::{RefreshTokenRecord, RevocationReason};
use rg_core::errors::DomainError;
use rg_core::repositories::{CleanupPolicy, ConsumeOutcome, RefreshTokenStore};

pub(crate) const RECORD_COLUMNS: &str = "id, token_hash, token_family, parent_token_hash, user_id, \
     device_fingerprint, ip_address, user_agent, is_active, created_at, expires_at, revoked_at, \
     revocation_reason";

/// MySQL implementation of RefreshTokenStore
pub struct MySqlRefreshTokenStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRefreshTokenStore {
    /// Create a new MySQL refresh token store
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshTokenRecord entity
    fn row_to_record(row: &MySqlRow) -> Result<RefreshTokenRecord, DomainError> {
        let column_error = |e: sqlx::Error| DomainError::storage("decode_refresh_token", e);

        let id: String = row.try_get("id").map_err(column_error)?;
        let revocation_reason: Option<String> =
            row.try_get("revocation_reason").map_err(column_error)?;

        Ok(RefreshTokenRecord {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::storage("decode_refresh_token", e))?,
            token_hash: row.try_get("token_hash").map_err(column_error)?,
            token_family: row.try_get("token_family").map_err(column_error)?,
            parent_token_hash: row.try_get("parent_token_hash").map_err(column_error)?,
            user_id: row.try_get("user_id").map_err(column_error)?,
            device_fingerprint: row.try_get("device_fingerprint").map_err(column_error)?,
            ip_address: row.try_get("ip_address").map_err(column_error)?,
            user_agent: row.try_get("user_agent").map_err(column_error)?,
            is_active: row.try_get("is_active").map_err(column_error)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(column_error)?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(column_error)?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(column_error)?,
            revocation_reason: revocation_reason.as_deref().map(RevocationReason::parse),
        })
    }
}

pub(crate) fn to_count(rows_affected: u64) -> usize {
    usize::try_from(rows_affected).unwrap_or(usize::MAX)
}

#[async_trait]
impl RefreshTokenStore for MySqlRefreshTokenStore {
    async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, token_hash, token_family, parent_token_hash, user_id,
                device_fingerprint, ip_address, user_agent, is_active,
                created_at, expires_at, revoked_at, revocation_reason
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(record.id.to_string())
            .bind(&record.token_hash)
            .bind(&record.token_family)
            .bind(&record.parent_token_hash)
            .bind(&record.user_id)
            .bind(&record.device_fingerprint)
            .bind(&record.ip_address)
            .bind(&record.user_agent)
            .bind(record.is_active)
            .bind(record.created_at)
            .bind(record.expires_at)
            .bind(record.revoked_at)
            .bind(record.revocation_reason.as_ref().map(|r| r.as_str().to_string()))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(token_family = %record.token_family, error = %e, "Failed to insert refresh token");
                DomainError::storage("create", e)
            })?;

        Ok(record)
    }

    async fn consume_and_check(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ConsumeOutcome>, DomainError> {
        let op = "consume_and_check";
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(op, e))?;

        let select = format!(
            "SELECT {} FROM refresh_tokens WHERE token_hash = ? LIMIT 1 FOR UPDATE",
            RECORD_COLUMNS
        );
        let row = sqlx::query(&select)
            .bind(token_hash)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(op, e))?;

        let Some(row) = row else {
            tx.rollback().await.map_err(|e| DomainError::storage(op, e))?;
            return Ok(None);
        };
        let record = Self::row_to_record(&row)?;

        if !record.is_active {
            tx.rollback().await.map_err(|e| DomainError::storage(op, e))?;
            return Ok(Some(ConsumeOutcome::AlreadyInactive(record)));
        }
        if record.is_expired_at(now) {
            tx.rollback().await.map_err(|e| DomainError::storage(op, e))?;
            return Ok(Some(ConsumeOutcome::Expired(record)));
        }

        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_active = FALSE, revoked_at = ?, revocation_reason = ?
            WHERE token_hash = ? AND is_active = TRUE
            "#,
        )
        .bind(now)
        .bind(RevocationReason::Rotated.as_str())
        .bind(token_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(op, e))?;

        if result.rows_affected() != 1 {
            tx.rollback().await.map_err(|e| DomainError::storage(op, e))?;
            return Ok(Some(ConsumeOutcome::AlreadyInactive(record)));
        }

        tx.commit().await.map_err(|e| DomainError::storage(op, e))?;
        Ok(Some(ConsumeOutcome::Consumed(record)))
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE token_hash = ? LIMIT 1",
            RECORD_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage("find_by_hash", e))?;

        result.as_ref().map(Self::row_to_record).transpose()
    }

    async fn revoke_family(
        &self,
        token_family: &str,
        reason: &RevocationReason,
    ) -> Result<usize, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_active = FALSE,
                revoked_at = COALESCE(revoked_at, ?),
                revocation_reason = ?
            WHERE token_family = ?
        "#;

        let result = sqlx::query(query)
            .bind(Utc::now())
            .bind(reason.as_str())
            .bind(token_family)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("revoke_family", e))?;

        tracing::debug!(
            token_family = %token_family,
            reason = %reason,
            rows = result.rows_affected(),
            "Revoked refresh token family"
        );

        Ok(to_count(result.rows_affected()))
    }

    async fn revoke_all_for_user(
        &self,
        user_id: &str,
        reason: &RevocationReason,
    ) -> Result<usize, DomainError> {
        let op = "revoke_all_for_user";
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(op, e))?;

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM refresh_tokens WHERE user_id = ? AND is_active = TRUE FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(op, e))?;

        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_active = FALSE,
                revoked_at = COALESCE(revoked_at, ?),
                revocation_reason = ?
            WHERE user_id = ?
            "#,
        )
        .bind(Utc::now())
        .bind(reason.as_str())
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(op, e))?;

        tx.commit().await.map_err(|e| DomainError::storage(op, e))?;

        Ok(usize::try_from(active).unwrap_or(0))
    }

    async fn list_active_for_user(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens \
             WHERE user_id = ? AND is_active = TRUE AND expires_at > ? \
             ORDER BY created_at DESC",
            RECORD_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage("list_active_for_user", e))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn cleanup(
        &self,
        now: DateTime<Utc>,
        policy: &CleanupPolicy,
    ) -> Result<usize, DomainError> {
        let op = "cleanup";
        let expired_cutoff = policy.expired_cutoff(now);
        let revoked_cutoff = policy.revoked_cutoff(now);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(op, e))?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE is_active = FALSE
              AND (expires_at < ? OR (revoked_at IS NOT NULL AND revoked_at < ?))
            "#,
        )
        .bind(expired_cutoff)
        .bind(revoked_cutoff)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(op, e))?;

        let retired = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_active = FALSE, revoked_at = ?, revocation_reason = ?
            WHERE is_active = TRUE AND expires_at < ?
            "#,
        )
        .bind(now)
        .bind(RevocationReason::Expired.as_str())
        .bind(expired_cutoff)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(op, e))?;

        tx.commit().await.map_err(|e| DomainError::storage(op, e))?;

        if retired.rows_affected() > 0 {
            tracing::info!(
                retired = retired.rows_affected(),
                "Deactivated abandoned refresh tokens"
            );
        }

        Ok(to_count(deleted.rows_affected()))
    }
}
