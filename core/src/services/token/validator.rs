//! Input validation for issuance and rotation requests

use rg_shared::utils::validation::{
    validators, MAX_EMAIL_LENGTH, MAX_FINGERPRINT_LENGTH, MAX_USER_AGENT_LENGTH,
    MAX_USER_ID_LENGTH, MIN_FINGERPRINT_LENGTH,
};

use crate::domain::entities::token::{MAX_LEVEL, MIN_LEVEL};
use crate::domain::value_objects::{IssueRequest, RequestContext};
use crate::errors::ValidationError;

pub fn validate_user_id(user_id: &str) -> Result<(), ValidationError> {
    if !validators::not_empty(user_id) {
        return Err(ValidationError::RequiredField { field: "user_id" });
    }
    let len = user_id.chars().count();
    if len > MAX_USER_ID_LENGTH {
        return Err(ValidationError::InvalidLength {
            field: "user_id",
            max: MAX_USER_ID_LENGTH,
            actual: len,
        });
    }
    if !validators::is_valid_user_id(user_id) {
        return Err(ValidationError::InvalidFormat { field: "user_id" });
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if !validators::not_empty(email) {
        return Err(ValidationError::RequiredField { field: "email" });
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidLength {
            field: "email",
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }
    if !validators::is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_level(level: u8) -> Result<(), ValidationError> {
    parse_level(i64::from(level)).map(|_| ())
}

/// Convert an untyped level into the claim value, rejecting anything outside 0-9
pub fn parse_level(level: i64) -> Result<u8, ValidationError> {
    if level < i64::from(MIN_LEVEL) || level > i64::from(MAX_LEVEL) {
        return Err(ValidationError::OutOfRange {
            field: "level",
            min: i64::from(MIN_LEVEL),
            max: i64::from(MAX_LEVEL),
            actual: level,
        });
    }
    // in range, so the narrowing cannot truncate
    Ok(level as u8)
}

pub fn validate_ip_address(ip_address: &str) -> Result<(), ValidationError> {
    if !validators::is_valid_ip(ip_address) {
        return Err(ValidationError::InvalidIpAddress);
    }
    Ok(())
}

pub fn validate_device_fingerprint(fingerprint: &str) -> Result<(), ValidationError> {
    let len = fingerprint.chars().count();
    if len > MAX_FINGERPRINT_LENGTH {
        return Err(ValidationError::InvalidLength {
            field: "device_fingerprint",
            max: MAX_FINGERPRINT_LENGTH,
            actual: len,
        });
    }
    if len < MIN_FINGERPRINT_LENGTH || !validators::is_valid_fingerprint(fingerprint) {
        return Err(ValidationError::InvalidFormat {
            field: "device_fingerprint",
        });
    }
    Ok(())
}

pub fn validate_user_agent(user_agent: &str) -> Result<(), ValidationError> {
    if user_agent.len() > MAX_USER_AGENT_LENGTH {
        return Err(ValidationError::InvalidLength {
            field: "user_agent",
            max: MAX_USER_AGENT_LENGTH,
            actual: user_agent.len(),
        });
    }
    if !validators::is_valid_user_agent(user_agent) {
        return Err(ValidationError::InvalidFormat { field: "user_agent" });
    }
    Ok(())
}

/// Validate the optional request metadata
pub fn validate_context(context: &RequestContext) -> Result<(), ValidationError> {
    if let Some(ip_address) = &context.ip_address {
        validate_ip_address(ip_address)?;
    }
    if let Some(fingerprint) = &context.device_fingerprint {
        validate_device_fingerprint(fingerprint)?;
    }
    if let Some(user_agent) = &context.user_agent {
        validate_user_agent(user_agent)?;
    }
    Ok(())
}

/// Validate the identity carried into the access token claims
pub fn validate_identity(user_id: &str, email: &str, level: u8) -> Result<(), ValidationError> {
    validate_user_id(user_id)?;
    validate_email(email)?;
    validate_level(level)
}

pub fn validate_issue_request(request: &IssueRequest) -> Result<(), ValidationError> {
    validate_identity(&request.user_id, &request.email, request.level)?;
    validate_context(&request.context)
}
