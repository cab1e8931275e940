//! Types describing a remote operation and the input form built from it.

use serde::{Deserialize, Serialize};

/// Structured description of a remote operation's accepted named parameters.
///
/// Produced fresh for each explorer request from the remote introspection
/// call; `arguments` keeps the order reported by the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Operation name exactly as the caller supplied it (e.g. `people.getInfo`).
    pub operation_name: String,
    /// Human-readable description of the operation, when the remote reports one.
    #[serde(default)]
    pub description: Option<String>,
    /// Accepted arguments in remote order.
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
}

impl MethodDescriptor {
    /// Look up an argument by name.
    pub fn argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|argument| argument.name == name)
    }

    /// Names of all declared arguments, in order.
    pub fn argument_names(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().map(|argument| argument.name.as_str())
    }
}

/// A single named parameter accepted by a remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Parameter name, unique within its descriptor.
    pub name: String,
    /// Hint shown next to the input field.
    #[serde(default)]
    pub help_text: String,
    /// Whether the remote marks this parameter as mandatory.
    pub required: bool,
}

impl ArgumentSpec {
    pub fn new(name: impl Into<String>, help_text: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            help_text: help_text.into(),
            required,
        }
    }
}

/// Input widget kind for a form field.
///
/// Every argument is rendered as free text today; the remote reflection
/// data carries no type information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
}

/// One input field of a dynamically built form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub help_text: String,
    pub required: bool,
    pub kind: FieldKind,
    /// Current value for prefilled re-rendering.
    #[serde(default)]
    pub value: Option<String>,
}

/// Ordered set of fields synthesized from a [`MethodDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub operation: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FormField>,
}

impl Form {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Fields that must be filled in before submission.
    pub fn required_fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|field| field.required)
    }
}
