//! Field type → widget dispatch.
//!
//! [`FieldRenderer`] turns a field definition plus its current value into a
//! [`Widget`] description. Known types go through one exhaustive `match`
//! on [`FieldKind`]. Types this build does not know are looked up among
//! registered [`WidgetExtension`]s by lower-cased type name and otherwise
//! fall back to a plain text input.
//!
//! Nested schemas recurse: a single nested object renders its sub-fields
//! once; a nested list renders them once per array item.

use crate::nested::RemovalRequest;
use crate::record::FormRecord;
use crate::validate::ValidationErrors;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use hostpanel_schema::{DropdownOption, FieldDefinition, FieldKind};
use hostpanel_types::CollectionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Character counter shown under length-bounded text inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharCounter {
    pub current: usize,
    pub max: usize,
}

impl CharCounter {
    pub fn is_over(&self) -> bool {
        self.current > self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextInputKind {
    Text,
    Email,
}

/// One uploaded file as stored in a file field's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// What to draw for a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Widget {
    TextInput {
        kind: TextInputKind,
        counter: Option<CharCounter>,
    },
    TextArea {
        counter: Option<CharCounter>,
    },
    RichText,
    /// Slug input with a "regenerate from source" action when a source
    /// field is configured.
    SlugInput {
        source_field: Option<String>,
    },
    NumberInput {
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    Toggle {
        true_label: String,
        false_label: String,
    },
    /// Calendar popover storing ISO strings.
    DatePicker {
        include_time: bool,
        min_date: Option<String>,
        max_date: Option<String>,
    },
    Select {
        options: Vec<DropdownOption>,
    },
    FileDropzone {
        allowed_types: Vec<String>,
        max_size_mb: Option<u32>,
        multiple: bool,
        files: Vec<FileDescriptor>,
    },
    JsonEditor {
        text: String,
    },
    /// Shows the current selection and opens a separate selector dialog.
    RelationshipPicker {
        related_collection_id: CollectionId,
        multiple: bool,
        selection_label: Option<String>,
    },
    NestedObject {
        fields: Vec<RenderedField>,
    },
    NestedList {
        items: Vec<RenderedItem>,
    },
    /// Produced by a [`WidgetExtension`].
    Custom {
        type_name: String,
        props: Value,
    },
}

/// A field ready to draw: its chrome, value, inline error and widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    /// Dotted path into the form record (`links.0.title`).
    pub path: String,
    pub key: String,
    pub label: String,
    pub required: bool,
    pub readonly: bool,
    pub help_text: Option<String>,
    pub placeholder: Option<String>,
    pub value: Value,
    pub error: Option<String>,
    pub widget: Widget,
}

/// One item of a nested list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedItem {
    pub index: usize,
    pub fields: Vec<RenderedField>,
    /// The item is awaiting removal confirmation.
    pub pending_removal: bool,
}

/// Renders and coerces values for a field type the core does not know.
pub trait WidgetExtension: Send + Sync {
    /// Wire type name this extension handles; matched case-insensitively.
    fn type_name(&self) -> &str;

    fn widget(&self, field: &FieldDefinition, value: &Value) -> Widget;

    /// Normalizes raw widget input before it is stored.
    fn coerce(&self, _field: &FieldDefinition, input: Value) -> Value {
        input
    }
}

/// Type → widget dispatch with an extension registry.
#[derive(Default)]
pub struct FieldRenderer {
    extensions: HashMap<String, Box<dyn WidgetExtension>>,
}

impl std::fmt::Debug for FieldRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRenderer")
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FieldRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an extension, replacing any earlier one for the same type.
    pub fn register(&mut self, extension: Box<dyn WidgetExtension>) {
        let name = normalize_type_name(extension.type_name());
        debug!(type_name = %name, "widget extension registered");
        self.extensions.insert(name, extension);
    }

    pub fn has_extension(&self, type_name: &str) -> bool {
        self.extensions.contains_key(&normalize_type_name(type_name))
    }

    /// Renders every visible field of a record, in the given order.
    pub fn render(
        &self,
        fields: &[FieldDefinition],
        record: &FormRecord,
        errors: &ValidationErrors,
        removal: Option<&RemovalRequest>,
    ) -> Vec<RenderedField> {
        self.render_level(fields, record, errors, removal, "")
    }

    /// Renders one top-level field.
    pub fn render_field(
        &self,
        field: &FieldDefinition,
        value: Option<&Value>,
        errors: &ValidationErrors,
        removal: Option<&RemovalRequest>,
    ) -> RenderedField {
        self.render_at(field, value, errors, removal, field.key.clone())
    }

    /// Normalizes raw widget input for a field before it is stored.
    pub fn coerce(&self, field: &FieldDefinition, input: Value) -> Value {
        if let FieldKind::Other { type_name } = &field.kind {
            if let Some(ext) = self.extensions.get(&normalize_type_name(type_name)) {
                return ext.coerce(field, input);
            }
        }
        coerce_input(field, input)
    }

    fn render_level(
        &self,
        fields: &[FieldDefinition],
        record: &FormRecord,
        errors: &ValidationErrors,
        removal: Option<&RemovalRequest>,
        prefix: &str,
    ) -> Vec<RenderedField> {
        fields
            .iter()
            .filter(|f| !f.hidden)
            .map(|f| {
                let path = format!("{prefix}{}", f.key);
                self.render_at(f, record.get(&f.key), errors, removal, path)
            })
            .collect()
    }

    fn render_at(
        &self,
        field: &FieldDefinition,
        value: Option<&Value>,
        errors: &ValidationErrors,
        removal: Option<&RemovalRequest>,
        path: String,
    ) -> RenderedField {
        let value = value.cloned().unwrap_or(Value::Null);
        let widget = self.widget_for(field, &value, errors, removal, &path);
        RenderedField {
            error: errors.get(&path).cloned(),
            path,
            key: field.key.clone(),
            label: field.label.clone(),
            required: field.required,
            readonly: field.readonly,
            help_text: field.help_text.clone(),
            placeholder: field.placeholder.clone(),
            value,
            widget,
        }
    }

    fn widget_for(
        &self,
        field: &FieldDefinition,
        value: &Value,
        errors: &ValidationErrors,
        removal: Option<&RemovalRequest>,
        path: &str,
    ) -> Widget {
        let rules = &field.validation;
        let counter = rules.max_length.map(|max| CharCounter {
            current: value.as_str().map_or(0, |s| s.chars().count()),
            max,
        });
        match &field.kind {
            FieldKind::ShortText => Widget::TextInput {
                kind: TextInputKind::Text,
                counter,
            },
            FieldKind::Email => Widget::TextInput {
                kind: TextInputKind::Email,
                counter,
            },
            FieldKind::LongText => Widget::TextArea { counter },
            FieldKind::RichText => Widget::RichText,
            FieldKind::Slug(cfg) => Widget::SlugInput {
                source_field: cfg.source_field.clone(),
            },
            FieldKind::Number => Widget::NumberInput {
                min: rules.min_value,
                max: rules.max_value,
                step: rules.step,
            },
            FieldKind::Boolean(cfg) => Widget::Toggle {
                true_label: cfg.true_label.clone().unwrap_or_else(|| "Yes".to_string()),
                false_label: cfg.false_label.clone().unwrap_or_else(|| "No".to_string()),
            },
            FieldKind::Date(cfg) | FieldKind::Timestamp(cfg) => Widget::DatePicker {
                include_time: matches!(field.kind, FieldKind::Timestamp(_)),
                min_date: cfg.min_date.clone(),
                max_date: cfg.max_date.clone(),
            },
            FieldKind::Dropdown(options) => Widget::Select {
                options: options.clone(),
            },
            FieldKind::File(cfg) => Widget::FileDropzone {
                allowed_types: cfg.allowed_types.clone(),
                max_size_mb: cfg.max_size_mb,
                multiple: cfg.multiple,
                files: file_descriptors(value),
            },
            FieldKind::Json => Widget::JsonEditor {
                text: json_text(value),
            },
            FieldKind::Relationship(cfg) => Widget::RelationshipPicker {
                related_collection_id: cfg.related_collection_id,
                multiple: cfg.is_multiple,
                selection_label: relationship_label(value),
            },
            FieldKind::NestedSchema(cfg) if cfg.is_multiple => {
                let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
                let items = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        let record = FormRecord::from_value(item.clone()).unwrap_or_default();
                        let prefix = format!("{path}.{index}.");
                        RenderedItem {
                            index,
                            fields: self.render_level(&cfg.fields, &record, errors, removal, &prefix),
                            pending_removal: removal
                                .is_some_and(|r| r.key == path && r.index == index),
                        }
                    })
                    .collect();
                Widget::NestedList { items }
            }
            FieldKind::NestedSchema(cfg) => {
                let record = FormRecord::from_value(value.clone()).unwrap_or_default();
                let prefix = format!("{path}.");
                Widget::NestedObject {
                    fields: self.render_level(&cfg.fields, &record, errors, removal, &prefix),
                }
            }
            FieldKind::Other { type_name } => {
                match self.extensions.get(&normalize_type_name(type_name)) {
                    Some(ext) => ext.widget(field, value),
                    None => {
                        debug!(type_name = %type_name, "unknown field type, using text input");
                        Widget::TextInput {
                            kind: TextInputKind::Text,
                            counter,
                        }
                    }
                }
            }
        }
    }
}

/// Normalizes raw widget input for a known field type.
///
/// - JSON: strings are parsed; text that is not valid JSON is kept as the
///   raw string
/// - number: numeric strings become numbers, blank input clears the value,
///   other text is kept so validation can report it
/// - date / timestamp: parsed input is stored as an ISO-8601 string
/// - boolean: `"true"`, `"false"`, `"on"`, `"off"` become booleans
/// - file: a single descriptor or an array, by the field's `multiple` flag
///
/// Everything else is stored as given.
pub fn coerce_input(field: &FieldDefinition, input: Value) -> Value {
    match (&field.kind, input) {
        (FieldKind::Json, Value::String(raw)) => {
            serde_json::from_str(&raw).unwrap_or(Value::String(raw))
        }
        (FieldKind::Number, Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Value::Null;
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Value::from(n as i64),
                Ok(n) => serde_json::Number::from_f64(n).map_or(Value::String(raw), Value::Number),
                Err(_) => Value::String(raw),
            }
        }
        (FieldKind::Date(_), Value::String(raw)) => match parse_datetime(&raw) {
            Some(dt) => Value::String(dt.date_naive().format("%Y-%m-%d").to_string()),
            None => Value::String(raw),
        },
        (FieldKind::Timestamp(_), Value::String(raw)) => match parse_datetime(&raw) {
            Some(dt) => Value::String(
                dt.with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            None => Value::String(raw),
        },
        (FieldKind::Boolean(_), Value::String(raw)) => match raw.trim().to_lowercase().as_str() {
            "true" | "on" | "1" => Value::Bool(true),
            "false" | "off" | "0" | "" => Value::Bool(false),
            _ => Value::String(raw),
        },
        (FieldKind::File(cfg), input) => normalize_files(input, cfg.multiple),
        (_, input) => input,
    }
}

/// Human-readable label for a relationship selection.
///
/// Populated objects are labelled by `name`, then `title`, then `slug`,
/// then `id`; bare ids label themselves. Multiple selections are joined
/// with `", "`. Returns `None` when nothing is selected.
pub fn relationship_label(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let labels: Vec<String> = items.iter().filter_map(relationship_label).collect();
            (!labels.is_empty()).then(|| labels.join(", "))
        }
        Value::Object(map) => ["name", "title", "slug", "id"]
            .iter()
            .filter_map(|k| map.get(*k))
            .find_map(scalar_text),
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn normalize_type_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn json_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(raw) => raw.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

fn file_descriptors(value: &Value) -> Vec<FileDescriptor> {
    let items = match value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        single => vec![single.clone()],
    };
    items
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect()
}

fn normalize_files(input: Value, multiple: bool) -> Value {
    match (input, multiple) {
        (Value::Null, true) => Value::Array(Vec::new()),
        (Value::Array(items), true) => Value::Array(items),
        (single, true) => Value::Array(vec![single]),
        (Value::Array(items), false) => items.into_iter().next().unwrap_or(Value::Null),
        (single, false) => single,
    }
}

/// Parses widget date input, keeping any offset it was written with.
/// Inputs without an offset are taken as UTC.
fn parse_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}
