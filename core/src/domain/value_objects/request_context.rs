//! Client request metadata attached to refresh token records and events.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Role;

/// Client metadata of the request that issues or rotates a token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Client IP address
    pub ip_address: Option<String>,

    /// Client user agent
    pub user_agent: Option<String>,

    /// Device fingerprint computed by the client
    pub device_fingerprint: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_device_fingerprint(mut self, device_fingerprint: impl Into<String>) -> Self {
        self.device_fingerprint = Some(device_fingerprint.into());
        self
    }
}

/// Input to [`TokenService::issue`](crate::services::TokenService::issue)
///
/// Built after the caller has authenticated the principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub level: u8,
    pub context: RequestContext,
}

impl IssueRequest {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, role: Role, level: u8) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role,
            level,
            context: RequestContext::default(),
        }
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }
}
