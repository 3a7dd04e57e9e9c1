pub mod audit;
pub mod token;
pub mod user;

pub use audit::{NoOpSecurityEventSink, SecurityEventSink};
pub use token::{CleanupPolicy, ConsumeOutcome, RefreshTokenStore};
pub use user::UserLookup;

#[cfg(test)]
pub use audit::RecordingSecurityEventSink;
#[cfg(test)]
pub use token::MockRefreshTokenStore;
#[cfg(test)]
pub use user::MockUserLookup;
