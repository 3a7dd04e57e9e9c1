//! # RotaGuard Core
//!
//! Token lifecycle core: short-lived signed access tokens, database-backed
//! refresh tokens with rotation chains, family-based reuse detection and
//! revocation. Persistence and user lookup are consumed through the traits
//! in [`repositories`]; concrete adapters live in the infrastructure crate.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    AccessTokenClaims, AccountStatus, RefreshTokenRecord, RevocationReason, Role, SecurityEvent,
    SecurityEventType, Severity, TokenPair, UserAccount,
};
pub use domain::value_objects::{IssueRequest, RequestContext};
pub use errors::{DomainError, DomainResult, PartialIssue, TokenError, ValidationError};
pub use repositories::{
    CleanupPolicy, ConsumeOutcome, RefreshTokenStore, SecurityEventSink, UserLookup,
};
pub use services::{
    AccessTokenCodec, CleanupResult, SecurityAuditService, TokenCleanupService, TokenService,
    TokenServiceConfig,
};
