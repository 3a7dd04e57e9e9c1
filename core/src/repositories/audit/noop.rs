//! No-op implementation of SecurityEventSink for when events are only logged

use async_trait::async_trait;

use super::SecurityEventSink;
use crate::domain::entities::audit::SecurityEvent;
use crate::errors::DomainError;

/// Sink that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSecurityEventSink;

impl NoOpSecurityEventSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SecurityEventSink for NoOpSecurityEventSink {
    async fn record(&self, _event: &SecurityEvent) -> Result<(), DomainError> {
        Ok(())
    }
}

// Also implement for () to allow simple type defaults
#[async_trait]
impl SecurityEventSink for () {
    async fn record(&self, _event: &SecurityEvent) -> Result<(), DomainError> {
        Ok(())
    }
}
