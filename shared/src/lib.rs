//! Shared utilities and common types for RotaGuard
//!
//! This crate provides common functionality used across all workspace crates:
//! - Configuration types
//! - Error response structures
//! - Input validation helpers

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, Environment, JwtConfig, LogFormat, LoggingConfig,
    RefreshTokenConfig,
};
pub use errors::{error_codes, ApiResult, ErrorResponse, IntoErrorResponse};
pub use utils::validation;
