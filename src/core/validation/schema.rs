//! Declarative form schemas

use crate::core::form::FormInput;
use crate::core::validation::FieldErrors;
use std::fmt;
use std::sync::Arc;

type FieldValidator = Arc<dyn Fn(&str, Option<&str>) -> Result<(), String> + Send + Sync>;

#[derive(Clone)]
struct FieldRules {
    name: String,
    validators: Vec<FieldValidator>,
}

/// Ordered set of field rules
///
/// # Example
///
/// ```rust,ignore
/// let schema = FormSchema::new()
///     .field("customerId", required("Please select a customer"))
///     .field("status", in_list(&["paid", "pending"], "Please select a status"));
///
/// let create_schema = schema.clone().omit(&["id", "date"]);
/// create_schema.validate(&input)?;
/// ```
#[derive(Clone, Default)]
pub struct FormSchema {
    fields: Vec<FieldRules>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator to a field
    ///
    /// Calling this repeatedly for the same field appends validators; the
    /// field keeps the position of its first declaration.
    pub fn field<V>(mut self, name: &str, validator: V) -> Self
    where
        V: Fn(&str, Option<&str>) -> Result<(), String> + Send + Sync + 'static,
    {
        let validator: FieldValidator = Arc::new(validator);
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(rules) => rules.validators.push(validator),
            None => self.fields.push(FieldRules {
                name: name.to_string(),
                validators: vec![validator],
            }),
        }
        self
    }

    /// Drop fields from the schema
    pub fn omit(mut self, names: &[&str]) -> Self {
        self.fields.retain(|f| !names.contains(&f.name.as_str()));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Run every validator of every field against `input`
    pub fn validate(&self, input: &FormInput) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        for rules in &self.fields {
            let value = input.get(&rules.name);
            for validator in &rules.validators {
                if let Err(message) = validator(&rules.name, value) {
                    errors.push(rules.name.clone(), message);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Debug for FormSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSchema")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .finish()
    }
}
