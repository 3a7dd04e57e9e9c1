//! Access token signing and verification

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::domain::entities::token::{AccessTokenClaims, MAX_LEVEL};
use crate::domain::entities::user::Role;
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;
use super::validator;

const REQUIRED_CLAIMS: [&str; 5] = ["exp", "nbf", "iat", "iss", "sub"];

/// Stateless signer and verifier for access tokens
///
/// Only the configured HMAC algorithm is accepted on decode; a token
/// whose header names any other algorithm is rejected before its signature
/// is looked at.
pub struct AccessTokenCodec {
    header: Header,
    issuer: String,
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AccessTokenCodec {
    /// Creates a codec from the token service configuration
    ///
    /// # Returns
    ///
    /// `DomainError::Configuration` for an empty secret, a non-HMAC
    /// algorithm or a non-positive lifetime
    pub fn new(config: &TokenServiceConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = config.leeway_seconds;

        Ok(Self {
            header: Header::new(config.algorithm),
            issuer: config.issuer.clone(),
            ttl: config.access_token_ttl,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        })
    }

    /// Sign an access token for the given identity, issued now
    pub fn issue(
        &self,
        user_id: &str,
        email: &str,
        role: Role,
        level: u8,
    ) -> Result<String, DomainError> {
        self.issue_at(user_id, email, role, level, Utc::now())
            .map(|(token, _)| token)
    }

    /// Sign an access token issued at `now`, returning the token and its claims
    pub fn issue_at(
        &self,
        user_id: &str,
        email: &str,
        role: Role,
        level: u8,
        now: DateTime<Utc>,
    ) -> Result<(String, AccessTokenClaims), DomainError> {
        validator::validate_identity(user_id, email, level)?;

        let claims =
            AccessTokenClaims::new(user_id, email, role, level, &self.issuer, self.ttl, now);
        let token = self.encode_claims(&claims)?;
        Ok((token, claims))
    }

    /// Sign arbitrary claims without validating them
    pub(crate) fn encode_claims(&self, claims: &AccessTokenClaims) -> Result<String, DomainError> {
        encode(&self.header, claims, &self.encoding_key)
            .map_err(|e| DomainError::configuration(format!("Failed to sign access token: {}", e)))
    }

    /// Verify an access token and return its claims
    ///
    /// # Errors
    ///
    /// * `TokenError::Malformed` - not a decodable JWT
    /// * `TokenError::InvalidSignature` - wrong algorithm or bad signature
    /// * `TokenError::Expired` - past `exp`
    /// * `TokenError::InvalidClaims` - missing or ill-shaped claims, wrong issuer,
    ///   not yet valid, or `sub` not matching `user_id`
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, DomainError> {
        let header = decode_header(token).map_err(|e| {
            debug!(error = %e, "Access token header could not be decoded");
            TokenError::Malformed
        })?;

        if header.alg != self.header.alg {
            debug!(alg = ?header.alg, "Access token signed with unexpected algorithm");
            return Err(TokenError::InvalidSignature.into());
        }

        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Access token rejected");
                map_jwt_error(e.kind())
            })?;

        let claims = data.claims;
        if claims.sub != claims.user_id || claims.level > MAX_LEVEL {
            return Err(TokenError::InvalidClaims.into());
        }

        Ok(claims)
    }
}

fn map_jwt_error(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
            TokenError::InvalidSignature
        }
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
            TokenError::Malformed
        }
        _ => TokenError::InvalidClaims,
    }
}
