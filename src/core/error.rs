//! Typed error handling for invoice actions
//!
//! Validation and storage failures of create/update are *not* errors from the
//! caller's point of view: the service folds them into a [`FormState`] that is
//! rendered back to the form. The types in this module cover everything that
//! does escape to the boundary: a delete that failed at the store, a request
//! body that could not be decoded, a broken configuration, or an unrecognized
//! authentication failure.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: input that could not be validated or decoded
//! - [`StorageError`]: failures reported by an [`InvoiceStore`] backend
//! - [`RequestError`]: request bodies in an unsupported encoding
//! - [`ConfigError`]: configuration parsing and validation
//!
//! # Example
//!
//! ```rust,ignore
//! match actions.delete_invoice(&id).await {
//!     Ok(revalidation) => cache.revalidate(&revalidation.path),
//!     Err(ActionError::Storage(e)) => tracing::error!(error = %e, "delete failed"),
//!     Err(e) => return e.into_response(),
//! }
//! ```
//!
//! [`FormState`]: crate::core::form::FormState
//! [`InvoiceStore`]: crate::core::store::InvoiceStore

use crate::core::validation::FieldErrors;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for invoice actions
#[derive(Debug)]
pub enum ActionError {
    /// Validation errors
    Validation(ValidationError),

    /// Storage backend errors
    Storage(StorageError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Configuration errors
    Config(ConfigError),

    /// Anything else, including unrecognized authentication failures
    Internal(String),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Validation(e) => write!(f, "{}", e),
            ActionError::Storage(e) => write!(f, "{}", e),
            ActionError::Request(e) => write!(f, "{}", e),
            ActionError::Config(e) => write!(f, "{}", e),
            ActionError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ActionError::Validation(e) => Some(e),
            ActionError::Storage(e) => Some(e),
            ActionError::Request(e) => Some(e),
            ActionError::Config(e) => Some(e),
            ActionError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ActionError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ActionError::Validation(e) => e.status_code(),
            ActionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ActionError::Request(e) => e.status_code(),
            ActionError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ActionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ActionError::Validation(e) => e.error_code(),
            ActionError::Storage(e) => e.error_code(),
            ActionError::Request(e) => e.error_code(),
            ActionError::Config(_) => "CONFIG_ERROR",
            ActionError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ActionError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            ActionError::Request(RequestError::UnsupportedMediaType { content_type }) => {
                Some(serde_json::json!({ "content_type": content_type }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Per-field validation errors, in schema order
    #[error("Validation errors: {}", summarize(.0))]
    FieldErrors(FieldErrors),

    /// The submitted body could not be decoded into form fields
    #[error("Invalid form submission: {message}")]
    InvalidForm { message: String },
}

fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join("; ")))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidationError::FieldErrors(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ValidationError::InvalidForm { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::InvalidForm { .. } => "INVALID_FORM",
        }
    }
}

impl From<ValidationError> for ActionError {
    fn from(err: ValidationError) -> Self {
        ActionError::Validation(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to connect to {backend}: {message}")]
    ConnectionError { backend: String, message: String },

    #[error("{backend} query error: {message}")]
    QueryError { backend: String, message: String },

    /// Constraint violation (e.g. unknown customer)
    #[error("Data integrity error: {message}")]
    IntegrityError { message: String },
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::ConnectionError { .. } => "STORAGE_CONNECTION_ERROR",
            StorageError::QueryError { .. } => "STORAGE_QUERY_ERROR",
            StorageError::IntegrityError { .. } => "STORAGE_INTEGRITY_ERROR",
        }
    }
}

impl From<StorageError> for ActionError {
    fn from(err: StorageError) -> Self {
        ActionError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors raised while loading or validating [`AppConfig`](crate::config::AppConfig)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config{}: {message}", in_file(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error: {message}")]
    IoError { message: String },
}

fn in_file(file: &Option<String>) -> String {
    file.as_deref()
        .map(|f| format!(" file '{}'", f))
        .unwrap_or_default()
}

impl From<ConfigError> for ActionError {
    fn from(err: ConfigError) -> Self {
        ActionError::Config(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Body encoding is neither urlencoded nor JSON
    #[error("{}", media_type_message(.content_type))]
    UnsupportedMediaType { content_type: String },
}

fn media_type_message(content_type: &str) -> String {
    if content_type.is_empty() {
        "Missing Content-Type header".to_string()
    } else {
        format!("Unsupported Content-Type: {}", content_type)
    }
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
        }
    }
}

impl From<RequestError> for ActionError {
    fn from(err: RequestError) -> Self {
        ActionError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<anyhow::Error> for ActionError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<StorageError>() {
            Ok(storage) => ActionError::Storage(storage),
            Err(err) => ActionError::Internal(format!("{:#}", err)),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for invoice actions
pub type ActionResult<T> = Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_multiple_fields() {
        let mut errors = FieldErrors::new();
        errors.push("customerId", "Please select a customer");
        errors.push("status", "Please select between pending or paid");

        let display = ValidationError::FieldErrors(errors).to_string();
        assert!(display.contains("customerId"));
        assert!(display.contains("status"));
    }

    #[test]
    fn test_error_response_carries_field_details() {
        let mut errors = FieldErrors::new();
        errors.push("amount", "please enter amount greater than $0");

        let response = ActionError::Validation(ValidationError::FieldErrors(errors)).to_response();
        assert_eq!(response.code, "VALIDATION_ERROR");
        let details = response.details.expect("details should be present");
        assert_eq!(
            details["fields"]["amount"][0],
            "please enter amount greater than $0"
        );
    }

    #[test]
    fn test_storage_error() {
        let err = StorageError::ConnectionError {
            backend: "PostgreSQL".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("PostgreSQL"));
        assert!(err.to_string().contains("connection refused"));

        let action_err: ActionError = err.into();
        assert_eq!(action_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(action_err.error_code(), "STORAGE_CONNECTION_ERROR");
    }

    #[test]
    fn test_request_error_status_codes() {
        assert_eq!(
            RequestError::UnsupportedMediaType {
                content_type: "text/plain".to_string()
            }
            .status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            RequestError::UnsupportedMediaType {
                content_type: String::new()
            }
            .to_string(),
            "Missing Content-Type header"
        );
    }

    #[test]
    fn test_config_error() {
        let err = ConfigError::FileNotFound {
            path: "/etc/invoices.yaml".to_string(),
        };
        assert!(err.to_string().contains("/etc/invoices.yaml"));
    }

    #[test]
    fn test_from_anyhow_recovers_storage_error() {
        let err = anyhow::Error::new(StorageError::QueryError {
            backend: "memory".to_string(),
            message: "lock poisoned".to_string(),
        });
        let action_err: ActionError = err.into();
        assert!(matches!(
            action_err,
            ActionError::Storage(StorageError::QueryError { .. })
        ));

        let other: ActionError = anyhow::anyhow!("boom").into();
        assert!(matches!(other, ActionError::Internal(ref m) if m == "boom"));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let inline = ConfigError::ParseError {
            file: None,
            message: "bad indent".to_string(),
        };
        assert_eq!(inline.to_string(), "Failed to parse config: bad indent");

        let from_file = ConfigError::ParseError {
            file: Some("config.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert_eq!(
            from_file.to_string(),
            "Failed to parse config file 'config.yaml': bad indent"
        );

        let err: ActionError = from_file.into();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
