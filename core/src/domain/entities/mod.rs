//! Domain entities of the token lifecycle.

pub mod audit;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use audit::{SecurityEvent, SecurityEventType, Severity};
pub use token::{
    AccessTokenClaims, RefreshTokenRecord, RevocationReason, TokenPair, MAX_LEVEL, MIN_LEVEL,
};
pub use user::{AccountStatus, Role, UserAccount};
