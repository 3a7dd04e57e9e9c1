//! MySQL adapters for the token core traits

pub(crate) mod refresh_token_store;
mod security_event_sink;

pub use refresh_token_store::MySqlRefreshTokenStore;
pub use security_event_sink::MySqlSecurityEventSink;
