//! Dynamic Input Form: one text field per descriptor argument.

use std::collections::HashMap;

use flickrview_types::{FieldKind, Form, FormField, MethodDescriptor};
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

/// Argument carrying the API credential.
///
/// The client attaches the key itself, so this field is never mandatory
/// for the end user no matter what the descriptor says.
pub const CREDENTIAL_ARGUMENT: &str = "api_key";

/// Inline message shown next to a missing required field.
pub const REQUIRED_FIELD_MESSAGE: &str = "This field is required.";

/// Validated arguments ready for dispatch.
///
/// Only [`validate`] creates values of this type, so every key is a field of
/// the form it was validated against and no value is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubmittedArguments(IndexMap<String, String>);

impl SubmittedArguments {
    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Required fields that were absent or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("missing required field(s): {}", missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<String>,
}

impl ValidationError {
    /// Inline error for `field`, if it is one of the missing ones.
    pub fn field_error(&self, field: &str) -> Option<&'static str> {
        self.missing.iter().any(|name| name == field).then_some(REQUIRED_FIELD_MESSAGE)
    }
}

/// Build the form for `descriptor`: one text field per argument, in order.
pub fn build_form(descriptor: &MethodDescriptor) -> Form {
    let fields = descriptor
        .arguments
        .iter()
        .map(|argument| FormField {
            name: argument.name.clone(),
            help_text: argument.help_text.clone(),
            required: argument.required && argument.name != CREDENTIAL_ARGUMENT,
            kind: FieldKind::Text,
            value: None,
        })
        .collect();

    Form {
        operation: descriptor.operation_name.clone(),
        description: descriptor.description.clone(),
        fields,
    }
}

/// Copy submitted values onto the declared fields for re-rendering.
pub fn prefill(form: &Form, raw_input: &HashMap<String, String>) -> Form {
    let mut prefilled = form.clone();
    for field in &mut prefilled.fields {
        field.value = raw_input.get(&field.name).cloned();
    }
    prefilled
}

/// Bind `raw_input` onto the form's fields and check presence constraints.
///
/// Keys that are not fields of `form` are ignored. Values are trimmed; a
/// required field whose value is absent or empty fails validation, and the
/// error lists every such field. On success, empty values are dropped: the
/// remote treats an empty argument differently from an absent one, and
/// only the absent form is consistent across methods.
pub fn validate(form: &Form, raw_input: &HashMap<String, String>) -> Result<SubmittedArguments, ValidationError> {
    let mut missing = Vec::new();
    let mut bound = IndexMap::new();

    for field in &form.fields {
        let value = raw_input.get(&field.name).map(|value| value.trim()).unwrap_or_default();
        if value.is_empty() {
            if field.required {
                missing.push(field.name.clone());
            }
            continue;
        }
        bound.insert(field.name.clone(), value.to_string());
    }

    if !missing.is_empty() {
        return Err(ValidationError { missing });
    }
    Ok(SubmittedArguments(bound))
}
