//! MySQL implementation of the SecurityEventSink trait.

use async_trait::async_trait;
use sqlx::MySqlPool;

use rg_core::domain::entities::audit::SecurityEvent;
use rg_core::errors::DomainError;
use rg_core::repositories::SecurityEventSink;

/// Appends security events to the `security_events` table
pub struct MySqlSecurityEventSink {
    pool: MySqlPool,
}

impl MySqlSecurityEventSink {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecurityEventSink for MySqlSecurityEventSink {
    async fn record(&self, event: &SecurityEvent) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO security_events (
                id, event_type, severity, user_id, token_family, ip_address,
                user_agent, device_fingerprint, reason, affected_records, occurred_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(event.id.to_string())
            .bind(event.event_type.as_str())
            .bind(event.severity.as_str())
            .bind(&event.user_id)
            .bind(&event.token_family)
            .bind(&event.ip_address)
            .bind(&event.user_agent)
            .bind(&event.device_fingerprint)
            .bind(&event.reason)
            .bind(u32::try_from(event.affected_records).unwrap_or(u32::MAX))
            .bind(event.occurred_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("record_security_event", e))?;

        Ok(())
    }
}
