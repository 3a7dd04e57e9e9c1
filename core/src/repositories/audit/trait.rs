//! Security event sink trait defining where security events are written.

use async_trait::async_trait;

use crate::domain::entities::audit::SecurityEvent;
use crate::errors::DomainError;

/// Destination for security events
///
/// Implementations are called off the request path, so a slow or failing
/// sink never delays a rotation response.
#[async_trait]
pub trait SecurityEventSink: Send + Sync {
    /// Record a security event
    ///
    /// # Arguments
    /// * `event` - The event to persist
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DomainError)` if the write fails
    async fn record(&self, event: &SecurityEvent) -> Result<(), DomainError>;
}
