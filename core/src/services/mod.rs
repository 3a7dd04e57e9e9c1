//! Business services containing the token lifecycle logic.

pub mod audit;
pub mod token;

pub use audit::{SecurityAuditConfig, SecurityAuditService};
pub use token::{
    AccessTokenCodec, CleanupResult, TokenCleanupConfig, TokenCleanupService, TokenService,
    TokenServiceConfig,
};
