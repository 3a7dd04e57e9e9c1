//! In-memory implementation of RefreshTokenStore for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::{RefreshTokenRecord, RevocationReason};
use crate::errors::DomainError;

use super::r#trait::{CleanupPolicy, ConsumeOutcome, RefreshTokenStore};

/// Mock refresh token store keyed by token hash
///
/// Every mutating operation holds the write lock for its whole duration,
/// which gives `consume_and_check` the same atomicity a row lock gives in SQL.
pub struct MockRefreshTokenStore {
    records: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
    fail_creates: AtomicBool,
    fail_consumes: AtomicBool,
}

impl MockRefreshTokenStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            fail_creates: AtomicBool::new(false),
            fail_consumes: AtomicBool::new(false),
        }
    }

    /// Make subsequent `create` calls fail with a storage error
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `consume_and_check` calls fail with a storage error
    pub fn fail_consumes(&self, fail: bool) {
        self.fail_consumes.store(fail, Ordering::SeqCst);
    }

    /// Insert or replace a record without any checks
    pub async fn insert(&self, record: RefreshTokenRecord) {
        self.records
            .write()
            .await
            .insert(record.token_hash.clone(), record);
    }

    pub async fn get(&self, token_hash: &str) -> Option<RefreshTokenRecord> {
        self.records.read().await.get(token_hash).cloned()
    }

    pub async fn family(&self, token_family: &str) -> Vec<RefreshTokenRecord> {
        let mut family: Vec<_> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.token_family == token_family)
            .cloned()
            .collect();
        family.sort_by_key(|r| r.created_at);
        family
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for MockRefreshTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefreshTokenStore for MockRefreshTokenStore {
    async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(DomainError::storage("create", "injected failure"));
        }

        let mut records = self.records.write().await;
        if records.contains_key(&record.token_hash) {
            return Err(DomainError::storage("create", "duplicate token hash"));
        }

        records.insert(record.token_hash.clone(), record.clone());
        Ok(record)
    }

    async fn consume_and_check(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ConsumeOutcome>, DomainError> {
        if self.fail_consumes.load(Ordering::SeqCst) {
            return Err(DomainError::storage("consume_and_check", "injected failure"));
        }

        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(token_hash) else {
            return Ok(None);
        };

        let prior = record.clone();
        if !record.is_active {
            return Ok(Some(ConsumeOutcome::AlreadyInactive(prior)));
        }
        if record.is_expired_at(now) {
            return Ok(Some(ConsumeOutcome::Expired(prior)));
        }

        record.revoke(RevocationReason::Rotated, now);
        Ok(Some(ConsumeOutcome::Consumed(prior)))
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DomainError> {
        Ok(self.get(token_hash).await)
    }

    async fn revoke_family(
        &self,
        token_family: &str,
        reason: &RevocationReason,
    ) -> Result<usize, DomainError> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let mut count = 0;

        for record in records
            .values_mut()
            .filter(|r| r.token_family == token_family)
        {
            record.revoke(reason.clone(), now);
            count += 1;
        }

        Ok(count)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: &str,
        reason: &RevocationReason,
    ) -> Result<usize, DomainError> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let mut count = 0;

        for record in records.values_mut().filter(|r| r.user_id == user_id) {
            if record.revoke(reason.clone(), now) {
                count += 1;
            }
        }

        Ok(count)
    }

    async fn list_active_for_user(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let records = self.records.read().await;
        let mut active: Vec<_> = records
            .values()
            .filter(|r| r.user_id == user_id && r.is_usable_at(now))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    async fn cleanup(
        &self,
        now: DateTime<Utc>,
        policy: &CleanupPolicy,
    ) -> Result<usize, DomainError> {
        let mut records = self.records.write().await;

        let before = records.len();
        records.retain(|_, record| !policy.is_purgeable(record, now));
        let deleted = before - records.len();

        for record in records
            .values_mut()
            .filter(|r| policy.is_abandoned(r, now))
        {
            record.revoke(RevocationReason::Expired, now);
        }

        Ok(deleted)
    }
}
