use chrono::{SecondsFormat, Utc};
use hostpanel_schema::{FieldDefinition, FieldKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Form data for one entry: field key → value.
///
/// The value's shape depends on the field type: strings, numbers, booleans,
/// ISO date strings, file descriptor arrays, related-entry references, and
/// nested objects or arrays of objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRecord(Map<String, Value>);

impl FormRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON object; any other value yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Extract a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    /// Extract a boolean value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(|v| v.as_bool())
    }

    /// Extract a numeric value.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(|v| v.as_f64())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// The value slot for `key`, created as `null` when missing.
    pub(crate) fn slot_mut(&mut self, key: &str) -> &mut Value {
        self.0.entry(key).or_insert(Value::Null)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for FormRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for FormRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Initial values for a set of fields.
///
/// Uses each field's `default_value`; otherwise booleans start `false`,
/// nested lists start empty and date fields flagged `default_to_now` start
/// at the current time.
pub fn default_record(fields: &[FieldDefinition]) -> FormRecord {
    let mut record = FormRecord::new();
    for field in fields {
        if let Some(value) = default_value(field) {
            record.insert(field.key.clone(), value);
        }
    }
    record
}

pub(crate) fn default_value(field: &FieldDefinition) -> Option<Value> {
    if let Some(value) = &field.default_value {
        return Some(value.clone());
    }
    match &field.kind {
        FieldKind::Boolean(_) => Some(Value::Bool(false)),
        FieldKind::NestedSchema(cfg) if cfg.is_multiple => Some(Value::Array(Vec::new())),
        FieldKind::Date(cfg) if cfg.default_to_now => {
            Some(Value::String(Utc::now().date_naive().format("%Y-%m-%d").to_string()))
        }
        FieldKind::Timestamp(cfg) if cfg.default_to_now => Some(Value::String(
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        )),
        _ => None,
    }
}
