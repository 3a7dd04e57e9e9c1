//! Tests for rotation, reuse detection and concurrent refresh

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use super::{harness, issue_request, student, TEST_SECRET};
use crate::domain::entities::audit::{SecurityEventType, Severity};
use crate::domain::entities::token::{RefreshTokenRecord, RevocationReason, TokenPair};
use crate::domain::entities::user::{AccountStatus, Role, UserAccount};
use crate::domain::value_objects::RequestContext;
use crate::errors::{DomainError, TokenError};
use crate::repositories::{
    CleanupPolicy, ConsumeOutcome, MockRefreshTokenStore, MockUserLookup, NoOpSecurityEventSink,
    RefreshTokenStore,
};
use crate::services::audit::{SecurityAuditConfig, SecurityAuditService};
use crate::services::token::{secret, TokenService, TokenServiceConfig};

#[tokio::test]
async fn test_rotation_chain_and_reuse_revokes_family() {
    let h = harness().await;
    let first = h.service.issue(issue_request()).await.unwrap();

    let second = h
        .service
        .rotate(&first.refresh_token, RequestContext::new(), h.users.as_ref())
        .await
        .unwrap();
    assert_eq!(second.token_family, first.token_family);
    assert_ne!(second.refresh_token, first.refresh_token);

    let parent = h.store.get(&h.store.hash(&first.refresh_token)).await.unwrap();
    let child = h.store.get(&h.store.hash(&second.refresh_token)).await.unwrap();
    assert!(!parent.is_active);
    assert_eq!(parent.revocation_reason, Some(RevocationReason::Rotated));
    assert!(child.is_active);
    assert_eq!(child.parent_token_hash.as_deref(), Some(parent.token_hash.as_str()));

    let context = RequestContext::new().with_ip_address("203.0.113.50");
    let reuse = h
        .service
        .rotate(&first.refresh_token, context, h.users.as_ref())
        .await;
    match reuse {
        Err(DomainError::SecurityBreach {
            user_id,
            token_family,
            revoked_records,
        }) => {
            assert_eq!(user_id, "u1");
            assert_eq!(token_family, first.token_family);
            assert_eq!(revoked_records, 2);
        }
        other => panic!("expected security breach, got {:?}", other),
    }

    for record in h.store.family(&first.token_family).await {
        assert!(!record.is_active);
        assert_eq!(record.revocation_reason, Some(RevocationReason::ReuseDetected));
    }

    // the legitimate holder is locked out too
    assert!(matches!(
        h.service
            .rotate(&second.refresh_token, RequestContext::new(), h.users.as_ref())
            .await,
        Err(DomainError::SecurityBreach { .. })
    ));

    let events = h
        .sink
        .events_of(SecurityEventType::RefreshTokenReuseDetected)
        .await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].severity, Severity::Critical);
    assert_eq!(events[0].ip_address.as_deref(), Some("203.0.113.50"));
    assert_eq!(events[0].token_family.as_deref(), Some(first.token_family.as_str()));
}

#[tokio::test]
async fn test_reuse_of_revoked_token_is_a_breach() {
    let h = harness().await;
    let pair = h.service.issue(issue_request()).await.unwrap();
    h.service
        .revoke(&pair.refresh_token, RevocationReason::Logout)
        .await
        .unwrap();

    let result = h
        .service
        .rotate(&pair.refresh_token, RequestContext::new(), h.users.as_ref())
        .await;
    assert!(result.unwrap_err().is_security_breach());
}

#[tokio::test]
async fn test_rotation_refused_for_suspended_user() {
    let h = harness().await;
    let pair = h.service.issue(issue_request()).await.unwrap();
    h.users.set_status("u1", AccountStatus::Suspended).await;

    let result = h
        .service
        .rotate(&pair.refresh_token, RequestContext::new(), h.users.as_ref())
        .await;
    match result {
        Err(DomainError::UserInactive { user_id, status }) => {
            assert_eq!(user_id, "u1");
            assert_eq!(status, "SUSPENDED");
        }
        other => panic!("expected inactive user, got {:?}", other),
    }

    let family = h.store.family(&pair.token_family).await;
    assert_eq!(family.len(), 1);
    assert!(family[0].is_active);
    assert!(family[0].revocation_reason.is_none());

    // reactivation makes the same token usable again
    h.users.set_status("u1", AccountStatus::Active).await;
    assert!(h
        .service
        .rotate(&pair.refresh_token, RequestContext::new(), h.users.as_ref())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_rotation_refused_for_missing_user() {
    let h = harness().await;
    let pair = h.service.issue(issue_request()).await.unwrap();
    h.users.remove("u1").await;

    let result = h
        .service
        .rotate(&pair.refresh_token, RequestContext::new(), h.users.as_ref())
        .await;
    assert!(matches!(result, Err(DomainError::UserInactive { .. })));
    assert_eq!(h.store.len().await, 1);
    assert!(h.store.get(&h.store.hash(&pair.refresh_token)).await.unwrap().is_active);
}

#[tokio::test]
async fn test_expired_refresh_token_is_left_untouched() {
    let h = harness().await;
    let refresh_secret = secret::new_refresh_secret();
    let now = Utc::now();
    let record = RefreshTokenRecord::new_root(
        "u1",
        h.store.hash(&refresh_secret),
        secret::new_token_family(),
        &RequestContext::new(),
        Duration::days(30),
        now - Duration::days(31),
    );
    h.store.insert(record.clone()).await;

    let result = h
        .service
        .rotate(&refresh_secret, RequestContext::new(), h.users.as_ref())
        .await;
    assert!(matches!(
        result,
        Err(DomainError::Authentication(TokenError::RefreshTokenExpired))
    ));

    assert_eq!(h.store.get(&record.token_hash).await.unwrap(), record);
    assert_eq!(h.store.len().await, 1);
    assert!(h.sink.events().await.is_empty());
}

#[tokio::test]
async fn test_tampered_secret_is_not_found() {
    let h = harness().await;
    let pair = h.service.issue(issue_request()).await.unwrap();

    let mut tampered: Vec<char> = pair.refresh_token.chars().collect();
    tampered[0] = if tampered[0] == 'A' { 'B' } else { 'A' };
    let tampered: String = tampered.into_iter().collect();

    for presented in [tampered.as_str(), "", "short", &pair.refresh_token[..42]] {
        let result = h
            .service
            .rotate(presented, RequestContext::new(), h.users.as_ref())
            .await;
        assert!(matches!(result, Err(DomainError::NotFound)), "{:?}", presented);
    }

    let record = h.store.get(&h.store.hash(&pair.refresh_token)).await.unwrap();
    assert!(record.is_active);
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn test_rotation_uses_current_user_claims() {
    let h = harness().await;
    let pair = h.service.issue(issue_request()).await.unwrap();
    h.users
        .upsert(UserAccount::new("u1", "teacher@example.com", Role::Teacher, 8))
        .await;

    let rotated = h
        .service
        .rotate(&pair.refresh_token, RequestContext::new(), h.users.as_ref())
        .await
        .unwrap();

    let claims = h.service.verify_access_token(&rotated.access_token).unwrap();
    assert_eq!(claims.email, "teacher@example.com");
    assert_eq!(claims.role, Role::Teacher);
    assert_eq!(claims.level, 8);
}

#[tokio::test]
async fn test_rotation_records_new_request_context() {
    let h = harness().await;
    let pair = h.service.issue(issue_request()).await.unwrap();
    let context = RequestContext::new()
        .with_ip_address("192.0.2.10")
        .with_device_fingerprint("new-device-fp");

    let rotated = h
        .service
        .rotate(&pair.refresh_token, context, h.users.as_ref())
        .await
        .unwrap();

    let child = h.store.get(&h.store.hash(&rotated.refresh_token)).await.unwrap();
    assert_eq!(child.ip_address.as_deref(), Some("192.0.2.10"));
    assert_eq!(child.device_fingerprint.as_deref(), Some("new-device-fp"));
}

#[tokio::test]
async fn test_storage_failure_during_consume_is_surfaced() {
    let h = harness().await;
    let pair = h.service.issue(issue_request()).await.unwrap();
    h.store.fail_consumes(true);

    let result = h
        .service
        .rotate(&pair.refresh_token, RequestContext::new(), h.users.as_ref())
        .await;
    assert!(matches!(
        result,
        Err(DomainError::Storage {
            operation: "consume_and_check",
            ..
        })
    ));
    assert!(h.store.get(&h.store.hash(&pair.refresh_token)).await.unwrap().is_active);
}

#[tokio::test]
async fn test_invalid_request_context_is_rejected_before_consuming() {
    let h = harness().await;
    let pair = h.service.issue(issue_request()).await.unwrap();

    let result = h
        .service
        .rotate(
            &pair.refresh_token,
            RequestContext::new().with_ip_address("not-an-ip"),
            h.users.as_ref(),
        )
        .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert!(h.store.get(&h.store.hash(&pair.refresh_token)).await.unwrap().is_active);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rotation_has_at_most_one_winner() {
    for _ in 0..25 {
        let h = harness().await;
        let pair = h.service.issue(issue_request()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..2 {
            let service = Arc::clone(&h.service);
            let users = Arc::clone(&h.users);
            let refresh_secret = pair.refresh_token.clone();
            handles.push(tokio::spawn(async move {
                service
                    .rotate(&refresh_secret, RequestContext::new(), users.as_ref())
                    .await
            }));
        }

        let mut successes = 0;
        let mut breaches = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) if e.is_security_breach() => breaches += 1,
                Err(e) => panic!("unexpected error: {:?}", e),
            }
        }
        // The replay is always a breach; the first caller also fails when
        // the replay's revocation lands before its child is written.
        assert_eq!(successes + breaches, 2);
        assert!(successes <= 1);
        assert!(breaches >= 1);

        let family = h.store.family(&pair.token_family).await;
        assert!(family.iter().all(|r| !r.is_active));
        assert_eq!(
            h.sink
                .events_of(SecurityEventType::RefreshTokenReuseDetected)
                .await
                .len(),
            1
        );
    }
}

/// What lands between consume and child creation
enum RacingRevocation {
    Family(RevocationReason),
    AllForUser(RevocationReason),
}

/// Applies a revocation just before a child record is written, as a
/// concurrent request landing between consume and create would
struct RevokeBeforeChildStore {
    inner: MockRefreshTokenStore,
    revocation: RacingRevocation,
}

#[async_trait]
impl RefreshTokenStore for RevokeBeforeChildStore {
    async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        if !record.is_root() {
            match &self.revocation {
                RacingRevocation::Family(reason) => {
                    self.inner.revoke_family(&record.token_family, reason).await?;
                }
                RacingRevocation::AllForUser(reason) => {
                    self.inner.revoke_all_for_user(&record.user_id, reason).await?;
                }
            }
        }
        self.inner.create(record).await
    }

    async fn consume_and_check(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ConsumeOutcome>, DomainError> {
        self.inner.consume_and_check(token_hash, now).await
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DomainError> {
        self.inner.find_by_hash(token_hash).await
    }

    async fn revoke_family(
        &self,
        token_family: &str,
        reason: &RevocationReason,
    ) -> Result<usize, DomainError> {
        self.inner.revoke_family(token_family, reason).await
    }

    async fn revoke_all_for_user(
        &self,
        user_id: &str,
        reason: &RevocationReason,
    ) -> Result<usize, DomainError> {
        self.inner.revoke_all_for_user(user_id, reason).await
    }

    async fn list_active_for_user(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        self.inner.list_active_for_user(user_id, now).await
    }

    async fn cleanup(
        &self,
        now: DateTime<Utc>,
        policy: &CleanupPolicy,
    ) -> Result<usize, DomainError> {
        self.inner.cleanup(now, policy).await
    }
}

/// Issue a pair, then rotate it while `revocation` lands mid-rotation
async fn rotate_during(
    revocation: RacingRevocation,
) -> (
    Arc<RevokeBeforeChildStore>,
    Result<TokenPair, DomainError>,
    String,
) {
    let store = Arc::new(RevokeBeforeChildStore {
        inner: MockRefreshTokenStore::new(),
        revocation,
    });
    let audit = SecurityAuditService::new(
        Arc::new(NoOpSecurityEventSink),
        SecurityAuditConfig::default(),
    );
    let service =
        TokenService::new(Arc::clone(&store), audit, TokenServiceConfig::new(TEST_SECRET)).unwrap();
    let users = MockUserLookup::new().with_user(student()).await;

    let issued = service.issue(issue_request()).await.unwrap();
    let result = service
        .rotate(&issued.refresh_token, RequestContext::new(), &users)
        .await;

    (store, result, issued.token_family)
}

#[tokio::test]
async fn test_child_created_after_reuse_revocation_is_revoked() {
    let (store, result, family) =
        rotate_during(RacingRevocation::Family(RevocationReason::ReuseDetected)).await;

    assert!(matches!(result, Err(DomainError::SecurityBreach { .. })));

    let records = store.inner.family(&family).await;
    assert_eq!(records.len(), 2);
    for record in records {
        assert!(!record.is_active);
        assert_eq!(record.revocation_reason, Some(RevocationReason::ReuseDetected));
    }
}

#[tokio::test]
async fn test_child_created_after_logout_is_revoked() {
    let (store, result, family) =
        rotate_during(RacingRevocation::Family(RevocationReason::Logout)).await;

    assert!(matches!(
        result,
        Err(DomainError::Authentication(TokenError::RefreshTokenRevoked))
    ));

    let records = store.inner.family(&family).await;
    assert_eq!(records.len(), 2);
    for record in records {
        assert!(!record.is_active);
        assert_eq!(record.revocation_reason, Some(RevocationReason::Logout));
    }
    assert!(store
        .inner
        .list_active_for_user("u1", Utc::now())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_child_created_after_revoke_all_for_user_is_revoked() {
    let (store, result, family) =
        rotate_during(RacingRevocation::AllForUser(RevocationReason::PasswordChanged)).await;

    assert!(matches!(
        result,
        Err(DomainError::Authentication(TokenError::RefreshTokenRevoked))
    ));

    let records = store.inner.family(&family).await;
    assert_eq!(records.len(), 2);
    for record in records {
        assert!(!record.is_active);
        assert_eq!(
            record.revocation_reason,
            Some(RevocationReason::PasswordChanged)
        );
    }
}
