//! Security audit service module for emitting token security events.

mod service;

pub use service::{SecurityAuditConfig, SecurityAuditService};
