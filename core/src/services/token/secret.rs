//! Refresh secret generation and hashing

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Random bytes behind each refresh secret
pub const REFRESH_SECRET_BYTES: usize = 32;

/// Length of an encoded refresh secret
pub const REFRESH_SECRET_LENGTH: usize = 43;

/// Generate a new refresh secret from the OS CSPRNG
///
/// 256 bits, URL-safe base64 without padding.
pub fn new_refresh_secret() -> String {
    let mut bytes = [0u8; REFRESH_SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a new token family identifier
pub fn new_token_family() -> String {
    Uuid::new_v4().to_string()
}

/// SHA-256 of the secret as 64 lowercase hex characters
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Whether `secret` has the shape of something [`new_refresh_secret`] produced
pub fn is_well_formed(secret: &str) -> bool {
    secret.len() == REFRESH_SECRET_LENGTH
        && secret
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
