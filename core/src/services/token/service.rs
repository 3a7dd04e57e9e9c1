//! Token lifecycle coordinator

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::entities::token::{
    AccessTokenClaims, RefreshTokenRecord, RevocationReason, TokenPair,
};
use crate::domain::entities::user::UserAccount;
use crate::domain::value_objects::{IssueRequest, RequestContext};
use crate::errors::{DomainError, PartialIssue, TokenError};
use crate::repositories::{
    ConsumeOutcome, NoOpSecurityEventSink, RefreshTokenStore, SecurityEventSink, UserLookup,
};
use crate::services::audit::SecurityAuditService;

use super::codec::AccessTokenCodec;
use super::config::TokenServiceConfig;
use super::{secret, validator};

/// Issues, rotates, and revokes token pairs
///
/// Every operation is safe to call concurrently; atomicity of rotation is
/// delegated to [`RefreshTokenStore::consume_and_check`].
pub struct TokenService<S, A = NoOpSecurityEventSink>
where
    S: RefreshTokenStore,
    A: SecurityEventSink,
{
    store: Arc<S>,
    codec: AccessTokenCodec,
    audit: SecurityAuditService<A>,
    config: TokenServiceConfig,
}

impl<S, A> TokenService<S, A>
where
    S: RefreshTokenStore + 'static,
    A: SecurityEventSink + 'static,
{
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `store` - Refresh token persistence
    /// * `audit` - Destination for security events
    /// * `config` - Token service configuration
    ///
    /// # Returns
    ///
    /// A new `TokenService` or `DomainError::Configuration` if the signing
    /// parameters are unusable
    pub fn new(
        store: Arc<S>,
        audit: SecurityAuditService<A>,
        config: TokenServiceConfig,
    ) -> Result<Self, DomainError> {
        let codec = AccessTokenCodec::new(&config)?;
        Ok(Self {
            store,
            codec,
            audit,
            config,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn codec(&self) -> &AccessTokenCodec {
        &self.codec
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Issues a token pair that starts a new token family
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Access token plus refresh secret
    /// * `Err(DomainError::Validation)` - Bad identity or request metadata; nothing persisted
    /// * `Err(DomainError::RefreshTokenStorageFailed)` - The access token was signed but
    ///   the refresh record could not be stored; the error carries the access token
    pub async fn issue(&self, request: IssueRequest) -> Result<TokenPair, DomainError> {
        validator::validate_issue_request(&request)?;

        let now = Utc::now();
        let (access_token, claims) = self.codec.issue_at(
            &request.user_id,
            &request.email,
            request.role,
            request.level,
            now,
        )?;

        let refresh_secret = secret::new_refresh_secret();
        let token_family = secret::new_token_family();
        let record = RefreshTokenRecord::new_root(
            request.user_id.clone(),
            self.store.hash(&refresh_secret),
            token_family.clone(),
            &request.context,
            self.config.refresh_token_ttl,
            now,
        );

        if let Err(cause) = self.store.create(record).await {
            error!(
                user_id = %request.user_id,
                error = %cause,
                "Failed to store refresh token; returning access token only"
            );
            return Err(DomainError::RefreshTokenStorageFailed {
                issued: PartialIssue {
                    user_id: request.user_id,
                    access_token,
                    access_expires_in: claims.exp - claims.iat,
                },
                cause: Box::new(cause),
            });
        }

        info!(
            user_id = %request.user_id,
            token_family = %token_family,
            "Issued new token family"
        );

        Ok(self.token_pair(access_token, &claims, refresh_secret, token_family))
    }

    /// Exchanges a refresh secret for a new token pair in the same family
    ///
    /// The account must be ACTIVE; otherwise the call fails with
    /// `DomainError::UserInactive` and the token is left as it was.
    ///
    /// The presented token is consumed atomically. Presenting a token that
    /// was already consumed or revoked revokes its whole family and fails
    /// with `DomainError::SecurityBreach`. A retried call whose first attempt
    /// did reach the store is therefore reported as reuse.
    ///
    /// A family revocation that lands while the child is being written
    /// revokes the child too; the call then fails with `SecurityBreach` for
    /// reuse or `TokenError::RefreshTokenRevoked` for any other reason.
    ///
    /// The new access token carries the user's current claims from `users`.
    pub async fn rotate(
        &self,
        refresh_secret: &str,
        context: RequestContext,
        users: &dyn UserLookup,
    ) -> Result<TokenPair, DomainError> {
        validator::validate_context(&context)?;

        if !secret::is_well_formed(refresh_secret) {
            debug!("Rejected refresh secret with unexpected shape");
            return Err(DomainError::NotFound);
        }

        let now = Utc::now();
        let token_hash = self.store.hash(refresh_secret);

        let presented = self
            .store
            .find_by_hash(&token_hash)
            .await?
            .ok_or_else(|| {
                debug!("Refresh token not found");
                DomainError::NotFound
            })?;

        // Inactive accounts are turned away before anything is consumed.
        let user = if presented.is_usable_at(now) {
            Some(self.active_user(users, &presented).await?)
        } else {
            None
        };

        let outcome = self
            .store
            .consume_and_check(&token_hash, now)
            .await?
            .ok_or(DomainError::NotFound)?;

        let consumed = match outcome {
            ConsumeOutcome::Consumed(record) => record,
            ConsumeOutcome::AlreadyInactive(record) => {
                return Err(self.handle_reuse(record, &context).await)
            }
            ConsumeOutcome::Expired(record) => {
                info!(
                    user_id = %record.user_id,
                    token_family = %record.token_family,
                    "Expired refresh token presented"
                );
                return Err(TokenError::RefreshTokenExpired.into());
            }
        };

        let user = match user {
            Some(user) => user,
            None => self.active_user(users, &consumed).await?,
        };

        let (access_token, claims) =
            self.codec
                .issue_at(&user.id, &user.email, user.role, user.level, now)?;

        let next_secret = secret::new_refresh_secret();
        let child = RefreshTokenRecord::new_child(
            &consumed,
            self.store.hash(&next_secret),
            &context,
            self.config.refresh_token_ttl,
            now,
        );

        self.store.create(child).await.map_err(|e| {
            error!(
                user_id = %consumed.user_id,
                token_family = %consumed.token_family,
                error = %e,
                "Failed to store rotated refresh token"
            );
            e
        })?;

        // A family revocation that ran between consume and create missed the child.
        if let Some(reason) = self.cancelling_revocation(&consumed.token_hash).await? {
            warn!(
                user_id = %consumed.user_id,
                token_family = %consumed.token_family,
                reason = %reason,
                "Token family revoked during rotation; revoking new token"
            );
            let revoked = self
                .store
                .revoke_family(&consumed.token_family, &reason)
                .await?;

            return Err(match reason {
                RevocationReason::ReuseDetected => DomainError::SecurityBreach {
                    user_id: consumed.user_id,
                    token_family: consumed.token_family,
                    revoked_records: revoked,
                },
                _ => TokenError::RefreshTokenRevoked.into(),
            });
        }

        info!(
            user_id = %consumed.user_id,
            token_family = %consumed.token_family,
            "Rotated refresh token"
        );

        Ok(self.token_pair(access_token, &claims, next_secret, consumed.token_family))
    }

    /// Revokes the family the given refresh secret belongs to
    ///
    /// # Returns
    ///
    /// Number of records deactivated, or `DomainError::NotFound` for an unknown secret
    pub async fn revoke(
        &self,
        refresh_secret: &str,
        reason: RevocationReason,
    ) -> Result<usize, DomainError> {
        if !secret::is_well_formed(refresh_secret) {
            return Err(DomainError::NotFound);
        }

        let record = self
            .store
            .find_by_hash(&self.store.hash(refresh_secret))
            .await?
            .ok_or(DomainError::NotFound)?;

        let revoked = self
            .store
            .revoke_family(&record.token_family, &reason)
            .await?;

        info!(
            user_id = %record.user_id,
            token_family = %record.token_family,
            reason = %reason,
            revoked,
            "Revoked token family"
        );
        self.publish(
            self.audit
                .log_family_revoked(&record.user_id, &record.token_family, &reason, revoked)
                .await,
        );

        Ok(revoked)
    }

    /// Revokes every active refresh token of a user
    pub async fn revoke_all_for_user(
        &self,
        user_id: &str,
        reason: RevocationReason,
    ) -> Result<usize, DomainError> {
        validator::validate_user_id(user_id)?;

        let revoked = self.store.revoke_all_for_user(user_id, &reason).await?;

        warn!(user_id, reason = %reason, revoked, "Revoked all tokens for user");
        self.publish(
            self.audit
                .log_user_tokens_revoked(user_id, &reason, revoked)
                .await,
        );

        Ok(revoked)
    }

    /// Revokes every family with an active token issued to one device
    pub async fn revoke_device(
        &self,
        user_id: &str,
        device_fingerprint: &str,
        reason: RevocationReason,
    ) -> Result<usize, DomainError> {
        validator::validate_user_id(user_id)?;
        validator::validate_device_fingerprint(device_fingerprint)?;

        let families: BTreeSet<String> = self
            .store
            .list_active_for_user(user_id, Utc::now())
            .await?
            .into_iter()
            .filter(|r| r.device_fingerprint.as_deref() == Some(device_fingerprint))
            .map(|r| r.token_family)
            .collect();

        let mut revoked = 0;
        for family in &families {
            revoked += self.store.revoke_family(family, &reason).await?;
        }

        info!(
            user_id,
            families = families.len(),
            revoked,
            "Revoked device tokens"
        );
        self.publish(
            self.audit
                .log_device_tokens_revoked(user_id, device_fingerprint, &reason, revoked)
                .await,
        );

        Ok(revoked)
    }

    /// Lists a user's usable refresh token records, newest first
    pub async fn list_active_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        validator::validate_user_id(user_id)?;
        self.store.list_active_for_user(user_id, Utc::now()).await
    }

    /// Purges records past their retention window
    pub async fn cleanup(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        self.store.cleanup(now, &self.config.cleanup_policy).await
    }

    /// Verifies an access token and returns its claims
    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, DomainError> {
        self.codec.verify(token)
    }

    async fn handle_reuse(
        &self,
        record: RefreshTokenRecord,
        context: &RequestContext,
    ) -> DomainError {
        error!(
            user_id = %record.user_id,
            token_family = %record.token_family,
            ip_address = context.ip_address.as_deref().unwrap_or("-"),
            "Refresh token reuse detected; revoking token family"
        );

        let revoked = match self
            .store
            .revoke_family(&record.token_family, &RevocationReason::ReuseDetected)
            .await
        {
            Ok(revoked) => revoked,
            Err(e) => {
                error!(
                    token_family = %record.token_family,
                    error = %e,
                    "Failed to revoke token family after reuse"
                );
                self.publish(self.audit.log_reuse_detected(&record, context, 0).await);
                return e;
            }
        };

        self.publish(self.audit.log_reuse_detected(&record, context, revoked).await);

        DomainError::SecurityBreach {
            user_id: record.user_id,
            token_family: record.token_family,
            revoked_records: revoked,
        }
    }

    async fn active_user(
        &self,
        users: &dyn UserLookup,
        record: &RefreshTokenRecord,
    ) -> Result<UserAccount, DomainError> {
        let status = match users.get_by_id(&record.user_id).await? {
            Some(user) if user.is_active() => return Ok(user),
            Some(user) => user.status.to_string(),
            None => "MISSING".to_string(),
        };

        warn!(
            user_id = %record.user_id,
            token_family = %record.token_family,
            status = %status,
            "Refresh attempted for inactive user"
        );

        Err(DomainError::UserInactive {
            user_id: record.user_id.clone(),
            status,
        })
    }

    /// Reason the consumed parent was revoked with after rotation, if any
    async fn cancelling_revocation(
        &self,
        token_hash: &str,
    ) -> Result<Option<RevocationReason>, DomainError> {
        let reason = self
            .store
            .find_by_hash(token_hash)
            .await?
            .and_then(|r| r.revocation_reason);

        Ok(reason.filter(|r| *r != RevocationReason::Rotated))
    }

    fn publish(&self, result: Result<(), DomainError>) {
        if let Err(e) = result {
            warn!(error = %e, "Failed to publish security event");
        }
    }

    fn token_pair(
        &self,
        access_token: String,
        claims: &AccessTokenClaims,
        refresh_token: String,
        token_family: String,
    ) -> TokenPair {
        TokenPair {
            access_token,
            refresh_token,
            access_expires_in: claims.exp - claims.iat,
            refresh_expires_in: self.config.refresh_token_ttl.num_seconds(),
            token_family,
        }
    }
}
