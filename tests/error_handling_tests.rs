//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Error conversions work correctly
//! - Error matching allows clients to handle specific cases

use axum::http::StatusCode;
use axum::response::IntoResponse;
use invoice_actions::core::error::{
    ActionError, ConfigError, RequestError, StorageError, ValidationError,
};
use invoice_actions::core::validation::FieldErrors;

fn field_errors() -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.push("customerId", "Please select a customer");
    errors.push("amount", "please enter amount greater than $0");
    errors
}

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_field_errors_return_422() {
        let err = ActionError::Validation(ValidationError::FieldErrors(field_errors()));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_invalid_form_returns_400() {
        let err = ActionError::Validation(ValidationError::InvalidForm {
            message: "expected a JSON object".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_every_storage_error_returns_500() {
        for err in [
            StorageError::ConnectionError {
                backend: "PostgreSQL".to_string(),
                message: "refused".to_string(),
            },
            StorageError::QueryError {
                backend: "PostgreSQL".to_string(),
                message: "syntax".to_string(),
            },
            StorageError::IntegrityError {
                message: "foreign key".to_string(),
            },
        ] {
            assert_eq!(
                ActionError::Storage(err).status_code(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn test_unsupported_media_type_returns_415() {
        let err = ActionError::Request(RequestError::UnsupportedMediaType {
            content_type: "text/plain".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_config_and_internal_return_500() {
        let config = ActionError::Config(ConfigError::FileNotFound {
            path: "config.yaml".to_string(),
        });
        assert_eq!(config.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let internal = ActionError::Internal("boom".to_string());
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let cases: Vec<(ActionError, &str)> = vec![
            (
                ValidationError::FieldErrors(field_errors()).into(),
                "VALIDATION_ERROR",
            ),
            (
                StorageError::IntegrityError {
                    message: "x".to_string(),
                }
                .into(),
                "STORAGE_INTEGRITY_ERROR",
            ),
            (
                StorageError::ConnectionError {
                    backend: "x".to_string(),
                    message: "x".to_string(),
                }
                .into(),
                "STORAGE_CONNECTION_ERROR",
            ),
            (
                ValidationError::InvalidForm {
                    message: "x".to_string(),
                }
                .into(),
                "INVALID_FORM",
            ),
            (
                RequestError::UnsupportedMediaType {
                    content_type: "text/plain".to_string(),
                }
                .into(),
                "UNSUPPORTED_MEDIA_TYPE",
            ),
            (
                ConfigError::IoError {
                    message: "x".to_string(),
                }
                .into(),
                "CONFIG_ERROR",
            ),
            (ActionError::Internal("x".to_string()), "INTERNAL_ERROR"),
        ];

        for (err, code) in cases {
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn test_error_response_shape() {
        let response = ActionError::Storage(StorageError::QueryError {
            backend: "PostgreSQL".to_string(),
            message: "relation \"invoices\" does not exist".to_string(),
        })
        .to_response();

        assert_eq!(response.code, "STORAGE_QUERY_ERROR");
        assert!(response.message.contains("PostgreSQL"));
        assert!(response.details.is_none());

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_field_errors_are_in_details() {
        let response =
            ActionError::Validation(ValidationError::FieldErrors(field_errors())).to_response();
        let details = response.details.unwrap();
        assert_eq!(
            details["fields"]["customerId"][0],
            "Please select a customer"
        );
    }
}

// =============================================================================
// Error Conversion Tests
// =============================================================================

mod conversion_tests {
    use super::*;

    #[test]
    fn test_config_error_converts_to_action_error() {
        let err: ActionError = ConfigError::IoError {
            message: "config.yaml: permission denied".to_string(),
        }
        .into();
        assert!(matches!(err, ActionError::Config(ConfigError::IoError { .. })));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_anyhow_wrapping_storage_error_is_recovered() {
        let err: ActionError = anyhow::Error::new(StorageError::IntegrityError {
            message: "customer missing".to_string(),
        })
        .into();
        assert!(matches!(
            err,
            ActionError::Storage(StorageError::IntegrityError { .. })
        ));
    }

    #[test]
    fn test_anyhow_context_is_kept_in_internal_message() {
        let err: ActionError = anyhow::anyhow!("socket closed")
            .context("sign-out failed")
            .into();
        match err {
            ActionError::Internal(message) => {
                assert_eq!(message, "sign-out failed: socket closed");
            }
            other => panic!("expected an internal error, got {:?}", other),
        }
    }
}

// =============================================================================
// Error Pattern Matching Tests
// =============================================================================

mod error_matching_tests {
    use super::*;

    #[test]
    fn test_can_match_specific_field_errors() {
        let err = ActionError::Validation(ValidationError::FieldErrors(field_errors()));

        let fields = match err {
            ActionError::Validation(ValidationError::FieldErrors(errors)) => errors
                .fields()
                .map(str::to_string)
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        };

        assert_eq!(fields, vec!["customerId", "amount"]);
    }

    #[test]
    fn test_can_match_integrity_errors() {
        let err = ActionError::Storage(StorageError::IntegrityError {
            message: "customer c9 does not exist".to_string(),
        });

        let is_integrity = matches!(
            err,
            ActionError::Storage(StorageError::IntegrityError { ref message }) if message.contains("c9")
        );
        assert!(is_integrity);
    }
}

// =============================================================================
// IntoResponse Tests
// =============================================================================

mod into_response_tests {
    use super::*;

    #[test]
    fn test_storage_error_into_response_status() {
        let response = ActionError::Storage(StorageError::ConnectionError {
            backend: "PostgreSQL".to_string(),
            message: "connection refused".to_string(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_error_into_response_status() {
        let response =
            ActionError::Validation(ValidationError::FieldErrors(field_errors())).into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_response_is_json() {
        let response = ActionError::Request(RequestError::UnsupportedMediaType {
            content_type: "text/plain".to_string(),
        })
        .into_response();

        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }
}
