//! Token service module
//!
//! This module handles the token lifecycle:
//! - Access token signing and verification
//! - Refresh secret generation and hashing
//! - Rotation with reuse detection and family revocation
//! - Background cleanup of stale records

mod cleanup;
mod codec;
mod config;
pub mod secret;
mod service;
pub mod validator;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use codec::AccessTokenCodec;
pub use config::TokenServiceConfig;
pub use service::TokenService;
