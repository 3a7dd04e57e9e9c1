//! Tests for domain error classification and user-facing mapping

use rg_shared::errors::{error_codes, IntoErrorResponse, SIGN_IN_AGAIN_MESSAGE};

use crate::errors::{DomainError, PartialIssue, TokenError, ValidationError};

#[test]
fn test_authentication_class_errors_present_generic_message() {
    let errors = vec![
        DomainError::from(ValidationError::InvalidEmail),
        DomainError::from(TokenError::Expired),
        DomainError::NotFound,
        DomainError::SecurityBreach {
            user_id: "u1".to_string(),
            token_family: "family".to_string(),
            revoked_records: 2,
        },
        DomainError::UserInactive {
            user_id: "u1".to_string(),
            status: "SUSPENDED".to_string(),
        },
    ];

    for error in errors {
        assert!(error.requires_reauthentication(), "{:?}", error);
        let response = error.to_error_response();
        assert_eq!(response.error, error_codes::SESSION_EXPIRED);
        assert_eq!(response.message, SIGN_IN_AGAIN_MESSAGE);
    }
}

#[test]
fn test_security_breach_is_distinguishable_internally() {
    let breach = DomainError::SecurityBreach {
        user_id: "u1".to_string(),
        token_family: "family-42".to_string(),
        revoked_records: 3,
    };
    assert!(breach.is_security_breach());
    assert_eq!(breach.kind(), "security_breach");
    assert!(breach.to_string().contains("family-42"));

    assert!(!DomainError::NotFound.is_security_breach());
}

#[test]
fn test_storage_failures_are_not_reauthentication() {
    let error = DomainError::storage("consume_and_check", "connection reset");
    assert!(error.is_storage_failure());
    assert!(!error.requires_reauthentication());
    assert_eq!(
        error.to_string(),
        "Storage failure during consume_and_check: connection reset"
    );
    let response = error.to_error_response();
    assert_eq!(response.error, error_codes::SERVICE_UNAVAILABLE);
    assert!(response.retryable);
}

#[test]
fn test_refresh_storage_failure_keeps_access_token_out_of_output() {
    let error = DomainError::RefreshTokenStorageFailed {
        issued: PartialIssue {
            user_id: "u1".to_string(),
            access_token: "header.payload.signature".to_string(),
            access_expires_in: 3600,
        },
        cause: Box::new(DomainError::storage("create", "disk full")),
    };

    assert!(error.is_storage_failure());
    assert!(!error.to_string().contains("header.payload.signature"));
    assert!(!format!("{:?}", error).contains("header.payload.signature"));
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_configuration_error_maps_to_internal() {
    let error = DomainError::configuration("JWT secret must not be empty");
    assert_eq!(error.kind(), "configuration");
    assert_eq!(error.to_error_response().error, error_codes::INTERNAL_ERROR);
}

#[test]
fn test_validation_error_field_names() {
    assert_eq!(ValidationError::InvalidEmail.field(), "email");
    assert_eq!(
        ValidationError::OutOfRange {
            field: "level",
            min: 0,
            max: 9,
            actual: 10
        }
        .field(),
        "level"
    );
}
