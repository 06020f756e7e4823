//! Per-field validation run when an entry is saved.
//!
//! Each field reports at most one message, the first rule it breaks:
//! required, then numeric range, then length, then pattern. Every field is
//! checked; one failure does not stop the others.

use crate::record::FormRecord;
use hostpanel_schema::{FieldDefinition, FieldKind};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

/// Messages keyed by field path (`title`, `links.0.url`).
pub type ValidationErrors = BTreeMap<String, String>;

/// Whether a value counts as filled in.
///
/// `0` and `false` are present. Null, blank strings, empty arrays and empty
/// objects are not.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Bool(_)) | Some(Value::Number(_)) => true,
    }
}

/// Checks one field's value and returns the first rule it breaks.
pub fn validate_field(field: &FieldDefinition, value: Option<&Value>) -> Option<String> {
    let label = &field.label;
    if !is_present(value) {
        return field.required.then(|| format!("{label} is required"));
    }
    let value = value?;
    let rules = &field.validation;

    if matches!(field.kind, FieldKind::Number) {
        let Some(number) = as_number(value) else {
            return Some(format!("{label} must be a number"));
        };
        if let Some(min) = rules.min_value {
            if number < min {
                return Some(format!("{label} must be at least {min}"));
            }
        }
        if let Some(max) = rules.max_value {
            if number > max {
                return Some(format!("{label} must be at most {max}"));
            }
        }
        return None;
    }

    if let Value::String(text) = value {
        let length = text.chars().count();
        if let Some(min) = rules.min_length {
            if length < min {
                return Some(format!("{label} must be at least {min} characters"));
            }
        }
        if let Some(max) = rules.max_length {
            if length > max {
                return Some(format!("{label} must be at most {max} characters"));
            }
        }
        if let Some(pattern) = &rules.pattern {
            // An unparsable pattern is a schema problem, not the author's.
            if let Ok(re) = Regex::new(pattern) {
                if !re.is_match(text) {
                    return Some(format!("{label} has an invalid format"));
                }
            }
        }
    }
    None
}

/// Checks every visible field of a record, descending into nested schemas.
///
/// Hidden fields have no input to show an error under, so they are skipped.
pub fn validate_record(fields: &[FieldDefinition], record: &FormRecord) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    collect_errors(fields, record, "", &mut errors);
    errors
}

fn collect_errors(
    fields: &[FieldDefinition],
    record: &FormRecord,
    prefix: &str,
    errors: &mut ValidationErrors,
) {
    for field in fields.iter().filter(|f| !f.hidden) {
        let path = format!("{prefix}{}", field.key);
        let value = record.get(&field.key);
        if let Some(message) = validate_field(field, value) {
            errors.insert(path, message);
            continue;
        }
        let FieldKind::NestedSchema(cfg) = &field.kind else {
            continue;
        };
        match value {
            Some(Value::Object(map)) if !cfg.is_multiple => {
                let item = FormRecord::from(map.clone());
                collect_errors(&cfg.fields, &item, &format!("{path}."), errors);
            }
            Some(Value::Array(items)) if cfg.is_multiple => {
                for (index, item) in items.iter().enumerate() {
                    let item = FormRecord::from_value(item.clone()).unwrap_or_default();
                    collect_errors(&cfg.fields, &item, &format!("{path}.{index}."), errors);
                }
            }
            _ => {}
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
