//! Axum extractor for raw form submissions
//!
//! `FormInput` can be pulled straight out of a request. Browser forms post
//! `application/x-www-form-urlencoded`; scripted clients may post a flat JSON
//! object instead. Both end up as the same string-valued field map, so the
//! schema sees identical input either way.

use crate::core::error::{ActionError, RequestError, ValidationError};
use crate::core::form::FormInput;
use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::Value;

impl<S> FromRequest<S> for FormInput
where
    S: Send + Sync,
{
    type Rejection = ActionError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs): Form<Vec<(String, String)>> = Form::from_request(req, state)
                .await
                .map_err(|e| ValidationError::InvalidForm {
                    message: e.body_text(),
                })?;
            Ok(pairs.into_iter().collect())
        } else if content_type.starts_with("application/json") {
            let Json(payload): Json<Value> = Json::from_request(req, state)
                .await
                .map_err(|e| ValidationError::InvalidForm {
                    message: e.body_text(),
                })?;
            Ok(from_json(payload)?)
        } else {
            Err(RequestError::UnsupportedMediaType { content_type }.into())
        }
    }
}

/// Flatten a JSON object into form fields
///
/// Scalars are stringified the way a browser would submit them; `null`
/// means "not submitted". Nested values have no form equivalent.
pub fn from_json(payload: Value) -> Result<FormInput, ValidationError> {
    let Value::Object(map) = payload else {
        return Err(ValidationError::InvalidForm {
            message: "expected a JSON object of form fields".to_string(),
        });
    };

    let mut input = FormInput::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::String(s) => input.append(key, s),
            Value::Number(n) => input.append(key, n.to_string()),
            Value::Bool(b) => input.append(key, b.to_string()),
            Value::Array(_) | Value::Object(_) => {
                return Err(ValidationError::InvalidForm {
                    message: format!("field '{}' must be a scalar value", key),
                });
            }
        }
    }
    Ok(input)
}
