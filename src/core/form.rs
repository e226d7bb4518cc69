//! Form-level types shared by every action
//!
//! A form submission arrives as a flat [`FormInput`] of string fields and
//! leaves as either an [`ActionOutcome::Success`] the boundary turns into a
//! cache invalidation plus redirect, or an [`ActionOutcome::Failure`] whose
//! [`FormState`] is rendered back next to the form.

use crate::core::validation::FieldErrors;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw submitted form fields
///
/// Mirrors the semantics of a browser `FormData`: every value is a string,
/// a missing key is `None`, and when a key is submitted more than once the
/// first value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormInput {
    fields: HashMap<String, String>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used mostly by tests and demos
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(key, value);
        self
    }

    /// Insert a field unless it has already been submitted
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormInput
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut input = FormInput::new();
        for (key, value) in iter {
            input.append(key, value);
        }
        input
    }
}

/// State rendered back to the form after a failed submission
///
/// `errors` holds per-field messages in schema order, `message` the
/// top-level summary. Both are omitted from JSON when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    #[serde(default, skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FormState {
    /// A state carrying only a top-level message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: FieldErrors::new(),
            message: Some(message.into()),
        }
    }

    /// A state carrying field errors and a summary message
    pub fn invalid(errors: FieldErrors, message: impl Into<String>) -> Self {
        Self {
            errors,
            message: Some(message.into()),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Result of a create or update action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The mutation was persisted: revalidate `revalidate`, then navigate to `next_path`
    Success {
        revalidate: String,
        next_path: String,
    },

    /// Nothing was persisted (or the store refused); render `state`
    Failure { state: FormState },
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success { .. })
    }

    /// The form state of a failure, if any
    pub fn state(&self) -> Option<&FormState> {
        match self {
            ActionOutcome::Success { .. } => None,
            ActionOutcome::Failure { state } => Some(state),
        }
    }
}

/// A cached view that must be regenerated after a mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Revalidation {
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_input_first_value_wins() {
        let input: FormInput = vec![("status", "paid"), ("status", "pending")]
            .into_iter()
            .collect();
        assert_eq!(input.get("status"), Some("paid"));
        assert_eq!(input.len(), 1);
    }

    #[test]
    fn test_form_input_missing_key() {
        let input = FormInput::new().with("amount", "12");
        assert_eq!(input.get("customerId"), None);
        assert!(input.contains("amount"));
    }

    #[test]
    fn test_form_state_serialization_omits_empty_parts() {
        let state = FormState::message("Database Error: failed to create invoices");
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("errors").is_none());
        assert_eq!(json["message"], "Database Error: failed to create invoices");

        let empty = serde_json::to_value(FormState::default()).unwrap();
        assert_eq!(empty, serde_json::json!({}));
    }

    #[test]
    fn test_form_state_with_errors() {
        let mut errors = FieldErrors::new();
        errors.push("amount", "please enter amount greater than $0");
        let state = FormState::invalid(errors, "Missing field. failed to create invoice");

        assert!(state.has_errors());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json["errors"]["amount"],
            serde_json::json!(["please enter amount greater than $0"])
        );
    }

    #[test]
    fn test_action_outcome_accessors() {
        let success = ActionOutcome::Success {
            revalidate: "/dashboard/invoices".to_string(),
            next_path: "/dashboard/invoices".to_string(),
        };
        assert!(success.is_success());
        assert!(success.state().is_none());

        let failure = ActionOutcome::Failure {
            state: FormState::message("nope"),
        };
        assert!(!failure.is_success());
        assert_eq!(failure.state().and_then(|s| s.message.as_deref()), Some("nope"));
    }
}
