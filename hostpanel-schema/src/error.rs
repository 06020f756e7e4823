//! Error types for schema operations.

use crate::field::FieldType;
use crate::store::StoreError;
use hostpanel_types::FieldId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while editing or saving a collection schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("field not found: {0}")]
    FieldNotFound(FieldId),

    #[error("field already exists: {0}")]
    DuplicateId(FieldId),

    #[error("duplicate field key: {0}")]
    DuplicateKey(String),

    #[error("field {0} is deleted; restore it before editing")]
    FieldDeleted(FieldId),

    #[error("field {0} is not deleted")]
    NotDeleted(FieldId),

    /// Changing a field's type is modeled as delete + add.
    #[error("field '{key}' cannot change type from {from} to {to}")]
    TypeChanged {
        key: String,
        from: String,
        to: String,
    },

    #[error("field type {0} cannot be used inside a nested schema")]
    NotNestable(FieldType),

    #[error("field type '{0}' has no editor")]
    UnsupportedType(String),

    #[error("relationship field '{0}' has no related collection")]
    MissingRelationshipTarget(String),

    #[error("move out of range: {from} -> {to} with {len} fields")]
    MoveOutOfRange { from: usize, to: usize, len: usize },

    #[error("invalid field: {0}")]
    Invalid(FieldErrors),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-input validation messages produced by the field editor.
///
/// Keys name the editor input (`label`, `key`, `validation`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for an input. The first message for an input wins.
    pub fn insert(&mut self, input: impl Into<String>, message: impl Into<String>) {
        self.0.entry(input.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, input: &str) -> Option<&str> {
        self.0.get(input).map(String::as_str)
    }

    pub fn contains(&self, input: &str) -> bool {
        self.0.contains_key(input)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (input, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{input}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl From<FieldErrors> for SchemaError {
    fn from(errors: FieldErrors) -> Self {
        SchemaError::Invalid(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_input_wins() {
        let mut errors = FieldErrors::new();
        errors.insert("key", "Key is required");
        errors.insert("key", "Key is too long");
        assert_eq!(errors.get("key"), Some("Key is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn display_lists_inputs_in_order() {
        let mut errors = FieldErrors::new();
        errors.insert("label", "Label is required");
        errors.insert("key", "Key is required");
        assert_eq!(
            errors.to_string(),
            "key: Key is required; label: Label is required"
        );
    }
}
