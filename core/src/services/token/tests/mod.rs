mod rotation_tests;

use std::sync::Arc;

use crate::domain::entities::user::{Role, UserAccount};
use crate::domain::value_objects::IssueRequest;
use crate::repositories::{MockRefreshTokenStore, MockUserLookup, RecordingSecurityEventSink};
use crate::services::audit::{SecurityAuditConfig, SecurityAuditService};
use crate::services::token::{TokenService, TokenServiceConfig};

pub(super) const TEST_SECRET: &str = "test-signing-secret-with-at-least-32-bytes";

pub(super) struct Harness {
    pub service: Arc<TokenService<MockRefreshTokenStore, RecordingSecurityEventSink>>,
    pub store: Arc<MockRefreshTokenStore>,
    pub sink: Arc<RecordingSecurityEventSink>,
    pub users: Arc<MockUserLookup>,
}

pub(super) async fn harness() -> Harness {
    harness_with(TokenServiceConfig::new(TEST_SECRET)).await
}

pub(super) async fn harness_with(config: TokenServiceConfig) -> Harness {
    let store = Arc::new(MockRefreshTokenStore::new());
    let sink = Arc::new(RecordingSecurityEventSink::new());
    let audit = SecurityAuditService::new(
        Arc::clone(&sink),
        SecurityAuditConfig {
            async_writes: false,
        },
    );
    let service = TokenService::new(Arc::clone(&store), audit, config).unwrap();
    let users = MockUserLookup::new().with_user(student()).await;

    Harness {
        service: Arc::new(service),
        store,
        sink,
        users: Arc::new(users),
    }
}

pub(super) fn student() -> UserAccount {
    UserAccount::new("u1", "student@example.com", Role::Student, 3)
}

pub(super) fn issue_request() -> IssueRequest {
    IssueRequest::new("u1", "student@example.com", Role::Student, 3)
}
