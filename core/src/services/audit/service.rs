//! Security audit service for token security events.
//!
//! Events are logged through `tracing` at a level matching their severity and
//! handed to a [`SecurityEventSink`]. With asynchronous writes enabled the
//! sink runs on a spawned task, so reuse detection never waits on the
//! collector.

use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task;
use tracing::{error, info, warn};

use crate::domain::entities::audit::{SecurityEvent, SecurityEventType, Severity};
use crate::domain::entities::token::{RefreshTokenRecord, RevocationReason};
use crate::domain::value_objects::RequestContext;
use crate::errors::DomainResult;
use crate::repositories::SecurityEventSink;

/// Configuration for the security audit service
#[derive(Debug, Clone)]
pub struct SecurityAuditConfig {
    /// Whether to run sink writes asynchronously
    pub async_writes: bool,
}

impl Default for SecurityAuditConfig {
    fn default() -> Self {
        Self { async_writes: true }
    }
}

/// Service that publishes security events
pub struct SecurityAuditService<S>
where
    S: SecurityEventSink,
{
    sink: Arc<S>,
    config: SecurityAuditConfig,
}

impl<S> SecurityAuditService<S>
where
    S: SecurityEventSink + 'static,
{
    /// Create a new audit service
    pub fn new(sink: Arc<S>, config: SecurityAuditConfig) -> Self {
        Self { sink, config }
    }

    /// Record that a consumed refresh token was presented again
    ///
    /// # Arguments
    /// * `record` - The record that was presented, as it was before the call
    /// * `context` - Metadata of the request that presented it
    /// * `revoked_records` - Records deactivated by the family revocation
    pub async fn log_reuse_detected(
        &self,
        record: &RefreshTokenRecord,
        context: &RequestContext,
        revoked_records: usize,
    ) -> DomainResult<()> {
        let event = SecurityEvent::new(
            SecurityEventType::RefreshTokenReuseDetected,
            &RevocationReason::ReuseDetected,
        )
        .with_user(record.user_id.clone())
        .with_family(record.token_family.clone())
        .with_request_context(context)
        .with_affected_records(revoked_records);

        self.emit(event).await
    }

    /// Record an explicit family revocation
    pub async fn log_family_revoked(
        &self,
        user_id: &str,
        token_family: &str,
        reason: &RevocationReason,
        revoked_records: usize,
    ) -> DomainResult<()> {
        let event = SecurityEvent::new(SecurityEventType::TokenFamilyRevoked, reason)
            .with_user(user_id)
            .with_family(token_family)
            .with_affected_records(revoked_records);

        self.emit(event).await
    }

    /// Record that every active token of a user was revoked
    pub async fn log_user_tokens_revoked(
        &self,
        user_id: &str,
        reason: &RevocationReason,
        revoked_records: usize,
    ) -> DomainResult<()> {
        let event = SecurityEvent::new(SecurityEventType::UserTokensRevoked, reason)
            .with_user(user_id)
            .with_affected_records(revoked_records);

        self.emit(event).await
    }

    /// Record that the tokens of one device were revoked
    pub async fn log_device_tokens_revoked(
        &self,
        user_id: &str,
        device_fingerprint: &str,
        reason: &RevocationReason,
        revoked_records: usize,
    ) -> DomainResult<()> {
        let context = RequestContext::new().with_device_fingerprint(device_fingerprint);
        let event = SecurityEvent::new(SecurityEventType::DeviceTokensRevoked, reason)
            .with_user(user_id)
            .with_request_context(&context)
            .with_affected_records(revoked_records);

        self.emit(event).await
    }

    /// Log an event and deliver it to the sink
    pub async fn emit(&self, event: SecurityEvent) -> DomainResult<()> {
        Self::trace_event(&event);

        // Outside a runtime there is nothing to spawn onto.
        if self.config.async_writes && Handle::try_current().is_ok() {
            let sink = Arc::clone(&self.sink);

            task::spawn(async move {
                if let Err(e) = sink.record(&event).await {
                    error!(
                        event_id = %event.id,
                        event_type = event.event_type.as_str(),
                        error = %e,
                        "Failed to write security event"
                    );
                }
            });

            Ok(())
        } else {
            self.sink.record(&event).await
        }
    }

    fn trace_event(event: &SecurityEvent) {
        let user_id = event.user_id.as_deref().unwrap_or("-");
        let token_family = event.token_family.as_deref().unwrap_or("-");
        let ip_address = event.ip_address.as_deref().unwrap_or("-");

        match event.severity {
            Severity::Critical => error!(
                event_type = event.event_type.as_str(),
                severity = event.severity.as_str(),
                user_id,
                token_family,
                ip_address,
                reason = %event.reason,
                affected_records = event.affected_records,
                "Security event"
            ),
            Severity::Warning => warn!(
                event_type = event.event_type.as_str(),
                severity = event.severity.as_str(),
                user_id,
                token_family,
                reason = %event.reason,
                affected_records = event.affected_records,
                "Security event"
            ),
            Severity::Info => info!(
                event_type = event.event_type.as_str(),
                severity = event.severity.as_str(),
                user_id,
                token_family,
                reason = %event.reason,
                affected_records = event.affected_records,
                "Security event"
            ),
        }
    }
}
