//! Common validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length of a user identifier
pub const MAX_USER_ID_LENGTH: usize = 64;

/// Maximum length of an email address (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Bounds for a device fingerprint
pub const MIN_FINGERPRINT_LENGTH: usize = 8;
pub const MAX_FINGERPRINT_LENGTH: usize = 128;

/// Maximum stored length of a user agent string
pub const MAX_USER_AGENT_LENGTH: usize = 512;

static USER_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-.:]*$").expect("valid user id regex"));

static FINGERPRINT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-:.=+/]+$").expect("valid fingerprint regex"));

/// Common validation functions
pub mod validators {
    use super::*;

    /// Check if a string is not empty
    pub fn not_empty(value: &str) -> bool {
        !value.trim().is_empty()
    }

    /// Check if a string length is within bounds
    pub fn length_between(value: &str, min: usize, max: usize) -> bool {
        let len = value.chars().count();
        len >= min && len <= max
    }

    /// Check if a user identifier is well formed
    pub fn is_valid_user_id(user_id: &str) -> bool {
        length_between(user_id, 1, MAX_USER_ID_LENGTH) && USER_ID_REGEX.is_match(user_id)
    }

    /// Check if an email address is syntactically valid
    pub fn is_valid_email(email: &str) -> bool {
        email.len() <= MAX_EMAIL_LENGTH && validator::validate_email(email)
    }

    /// Check if a string is an IPv4 or IPv6 address
    pub fn is_valid_ip(ip: &str) -> bool {
        validator::validate_ip(ip)
    }

    /// Check if a device fingerprint is well formed
    pub fn is_valid_fingerprint(fingerprint: &str) -> bool {
        length_between(fingerprint, MIN_FINGERPRINT_LENGTH, MAX_FINGERPRINT_LENGTH)
            && FINGERPRINT_REGEX.is_match(fingerprint)
    }

    /// Check if a user agent is printable and within the stored length
    pub fn is_valid_user_agent(user_agent: &str) -> bool {
        user_agent.len() <= MAX_USER_AGENT_LENGTH && !user_agent.chars().any(char::is_control)
    }
}
