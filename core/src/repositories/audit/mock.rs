//! Recording implementation of SecurityEventSink for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::SecurityEventSink;
use crate::domain::entities::audit::{SecurityEvent, SecurityEventType};
use crate::errors::DomainError;

/// Sink that keeps every event in memory
#[derive(Default)]
pub struct RecordingSecurityEventSink {
    events: Arc<Mutex<Vec<SecurityEvent>>>,
    fail_writes: AtomicBool,
}

impl RecordingSecurityEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn events(&self) -> Vec<SecurityEvent> {
        self.events.lock().await.clone()
    }

    pub async fn events_of(&self, event_type: SecurityEventType) -> Vec<SecurityEvent> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SecurityEventSink for RecordingSecurityEventSink {
    async fn record(&self, event: &SecurityEvent) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::storage("record_security_event", "injected failure"));
        }
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}
