//! Field editor: collects configuration for one field.
//!
//! The editor holds input for every config bucket, but only the buckets the
//! chosen type shows are validated and emitted. `submit` therefore always
//! produces a normalized definition whatever was typed into hidden inputs.

use crate::error::{FieldErrors, SchemaError, SchemaResult};
use crate::field::{
    BooleanConfig, DateConfig, DropdownOption, FieldDefinition, FieldKind, FieldType, FileConfig,
    NestedSchemaConfig, RelationshipConfig, SlugConfig, ValidationRules,
};
use crate::slug;
use chrono::{DateTime, NaiveDate, Utc};
use hostpanel_types::{CollectionId, FieldId};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

pub const LABEL_MAX_LEN: usize = 100;
pub const KEY_MAX_LEN: usize = 64;

/// File categories offered in the file-type checklist.
pub const FILE_TYPE_OPTIONS: [&str; 7] = [
    "image",
    "video",
    "audio",
    "pdf",
    "document",
    "spreadsheet",
    "archive",
];

/// A group of inputs shown by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorSection {
    /// Label, key, help text, placeholder and the required/readonly/hidden flags.
    General,
    TextValidation,
    NumberValidation,
    DropdownOptions,
    FileConstraints,
    DateRange,
    BooleanLabels,
    Relationship,
    NestedFields,
    SlugSource,
}

impl EditorSection {
    /// Sections shown for a field type, in display order.
    pub fn for_type(field_type: FieldType) -> Vec<EditorSection> {
        let extra = match field_type {
            FieldType::ShortText
            | FieldType::LongText
            | FieldType::RichText
            | FieldType::Email => Some(EditorSection::TextValidation),
            FieldType::Slug => Some(EditorSection::SlugSource),
            FieldType::Number => Some(EditorSection::NumberValidation),
            FieldType::Boolean => Some(EditorSection::BooleanLabels),
            FieldType::Date | FieldType::Timestamp => Some(EditorSection::DateRange),
            FieldType::Dropdown => Some(EditorSection::DropdownOptions),
            FieldType::File => Some(EditorSection::FileConstraints),
            FieldType::Json => None,
            FieldType::Relationship => Some(EditorSection::Relationship),
            FieldType::NestedSchema => Some(EditorSection::NestedFields),
        };
        std::iter::once(EditorSection::General).chain(extra).collect()
    }
}

/// Snapshot of what the editor currently displays.
///
/// Two editors with equal views look identical to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorView {
    pub field_type: FieldType,
    pub sections: Vec<EditorSection>,
    pub label: String,
    pub key: String,
    pub required: bool,
    pub readonly: bool,
    pub hidden: bool,
    pub help_text: String,
    pub placeholder: String,
    pub default_value: Option<Value>,
    pub validation: Option<ValidationRules>,
    pub dropdown_options: Option<Vec<DropdownOption>>,
    pub file: Option<FileConfig>,
    pub date: Option<DateConfig>,
    pub boolean: Option<BooleanConfig>,
    pub relationship: Option<(Option<CollectionId>, bool)>,
    pub nested: Option<(Vec<FieldDefinition>, bool)>,
    pub slug_source: Option<Option<String>>,
}

/// Collects and validates configuration for a single field.
#[derive(Debug, Clone)]
pub struct FieldEditor {
    field_type: FieldType,
    editing: Option<FieldId>,
    label: String,
    key: String,
    key_is_manual: bool,
    required: bool,
    readonly: bool,
    hidden: bool,
    help_text: String,
    placeholder: String,
    default_value: Option<Value>,
    index_order: i64,
    validation: ValidationRules,
    dropdown_options: Vec<DropdownOption>,
    file: FileConfig,
    date: DateConfig,
    boolean: BooleanConfig,
    related_collection: Option<CollectionId>,
    relationship_multiple: bool,
    nested_fields: Vec<FieldDefinition>,
    nested_multiple: bool,
    slug_source: Option<String>,
}

impl FieldEditor {
    /// Starts an editor for a new field of the given type.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            editing: None,
            label: String::new(),
            key: String::new(),
            key_is_manual: false,
            required: false,
            readonly: false,
            hidden: false,
            help_text: String::new(),
            placeholder: String::new(),
            default_value: None,
            index_order: 0,
            validation: ValidationRules::default(),
            dropdown_options: Vec::new(),
            file: FileConfig::default(),
            date: DateConfig::default(),
            boolean: BooleanConfig::default(),
            related_collection: None,
            relationship_multiple: false,
            nested_fields: Vec::new(),
            nested_multiple: false,
            slug_source: None,
        }
    }

    /// Starts an editor pre-filled from an existing field.
    ///
    /// The key of an existing field is treated as manually set, so editing
    /// the label never renames a persisted key.
    pub fn edit(field: &FieldDefinition) -> SchemaResult<Self> {
        let field_type = field
            .field_type()
            .ok_or_else(|| SchemaError::UnsupportedType(field.type_name().to_string()))?;
        let mut editor = Self::new(field_type);
        editor.editing = Some(field.id);
        editor.label = field.label.clone();
        editor.key = field.key.clone();
        editor.key_is_manual = true;
        editor.required = field.required;
        editor.readonly = field.readonly;
        editor.hidden = field.hidden;
        editor.help_text = field.help_text.clone().unwrap_or_default();
        editor.placeholder = field.placeholder.clone().unwrap_or_default();
        editor.default_value = field.default_value.clone();
        editor.index_order = field.index_order;
        editor.validation = field.validation.clone();
        match &field.kind {
            FieldKind::Slug(cfg) => editor.slug_source = cfg.source_field.clone(),
            FieldKind::Boolean(cfg) => editor.boolean = cfg.clone(),
            FieldKind::Date(cfg) | FieldKind::Timestamp(cfg) => editor.date = cfg.clone(),
            FieldKind::Dropdown(options) => editor.dropdown_options = options.clone(),
            FieldKind::File(cfg) => editor.file = cfg.clone(),
            FieldKind::Relationship(cfg) => {
                editor.related_collection = Some(cfg.related_collection_id);
                editor.relationship_multiple = cfg.is_multiple;
            }
            FieldKind::NestedSchema(cfg) => {
                editor.nested_fields = cfg.fields.clone();
                editor.nested_multiple = cfg.is_multiple;
            }
            FieldKind::ShortText
            | FieldKind::LongText
            | FieldKind::RichText
            | FieldKind::Email
            | FieldKind::Number
            | FieldKind::Json
            | FieldKind::Other { .. } => {}
        }
        Ok(editor)
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn key_is_manual(&self) -> bool {
        self.key_is_manual
    }

    pub fn visible_sections(&self) -> Vec<EditorSection> {
        EditorSection::for_type(self.field_type)
    }

    /// Sets the label and, until the key is edited by hand, re-derives the key.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
        if !self.key_is_manual {
            self.key = slug::derive_key(&self.label);
        }
    }

    /// Sets the key by hand; the key stops following the label.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
        self.key_is_manual = true;
    }

    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn set_help_text(&mut self, text: impl Into<String>) {
        self.help_text = text.into();
    }

    pub fn set_placeholder(&mut self, text: impl Into<String>) {
        self.placeholder = text.into();
    }

    pub fn set_default_value(&mut self, value: Option<Value>) {
        self.default_value = value;
    }

    pub fn set_validation(&mut self, validation: ValidationRules) {
        self.validation = validation;
    }

    pub fn add_dropdown_option(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.dropdown_options.push(DropdownOption::new(label, value));
    }

    pub fn remove_dropdown_option(&mut self, index: usize) -> Option<DropdownOption> {
        (index < self.dropdown_options.len()).then(|| self.dropdown_options.remove(index))
    }

    pub fn set_file_config(&mut self, config: FileConfig) {
        self.file = config;
    }

    pub fn set_date_config(&mut self, config: DateConfig) {
        self.date = config;
    }

    pub fn set_boolean_labels(&mut self, true_label: Option<String>, false_label: Option<String>) {
        self.boolean = BooleanConfig {
            true_label,
            false_label,
        };
    }

    pub fn set_relationship(&mut self, related: Option<CollectionId>, multiple: bool) {
        self.related_collection = related;
        self.relationship_multiple = multiple;
    }

    pub fn set_nested_multiple(&mut self, multiple: bool) {
        self.nested_multiple = multiple;
    }

    pub fn set_slug_source(&mut self, source_key: Option<String>) {
        self.slug_source = source_key;
    }

    pub fn sub_fields(&self) -> &[FieldDefinition] {
        &self.nested_fields
    }

    /// Adds a sub-field to a nested schema.
    ///
    /// Relationship and nested-schema sub-fields are rejected so that nesting
    /// cannot recurse.
    pub fn add_sub_field(&mut self, field: FieldDefinition) -> SchemaResult<()> {
        if let Some(t) = field.field_type() {
            if !t.is_nestable() {
                return Err(SchemaError::NotNestable(t));
            }
        }
        if self.nested_fields.iter().any(|f| f.key == field.key) {
            return Err(SchemaError::DuplicateKey(field.key));
        }
        self.nested_fields.push(field);
        Ok(())
    }

    pub fn update_sub_field(&mut self, field: FieldDefinition) -> SchemaResult<()> {
        if let Some(t) = field.field_type() {
            if !t.is_nestable() {
                return Err(SchemaError::NotNestable(t));
            }
        }
        if self
            .nested_fields
            .iter()
            .any(|f| f.id != field.id && f.key == field.key)
        {
            return Err(SchemaError::DuplicateKey(field.key));
        }
        let slot = self
            .nested_fields
            .iter_mut()
            .find(|f| f.id == field.id)
            .ok_or(SchemaError::FieldNotFound(field.id))?;
        *slot = field;
        Ok(())
    }

    pub fn remove_sub_field(&mut self, id: FieldId) -> SchemaResult<FieldDefinition> {
        let pos = self
            .nested_fields
            .iter()
            .position(|f| f.id == id)
            .ok_or(SchemaError::FieldNotFound(id))?;
        Ok(self.nested_fields.remove(pos))
    }

    /// What the editor currently displays for its type.
    pub fn view(&self) -> EditorView {
        let sections = self.visible_sections();
        let shows = |s: EditorSection| sections.contains(&s);
        EditorView {
            field_type: self.field_type,
            label: self.label.clone(),
            key: self.key.clone(),
            required: self.required,
            readonly: self.readonly,
            hidden: self.hidden,
            help_text: self.help_text.clone(),
            placeholder: self.placeholder.clone(),
            default_value: self.default_value.clone(),
            validation: if shows(EditorSection::TextValidation) {
                Some(self.validation.text_only())
            } else if shows(EditorSection::NumberValidation) {
                Some(self.validation.numeric_only())
            } else {
                None
            },
            dropdown_options: shows(EditorSection::DropdownOptions)
                .then(|| self.dropdown_options.clone()),
            file: shows(EditorSection::FileConstraints).then(|| self.file.clone()),
            date: shows(EditorSection::DateRange).then(|| self.date.clone()),
            boolean: shows(EditorSection::BooleanLabels).then(|| self.boolean.clone()),
            relationship: shows(EditorSection::Relationship)
                .then_some((self.related_collection, self.relationship_multiple)),
            nested: shows(EditorSection::NestedFields)
                .then(|| (self.nested_fields.clone(), self.nested_multiple)),
            slug_source: shows(EditorSection::SlugSource).then(|| self.slug_source.clone()),
            sections,
        }
    }

    /// Checks every visible input against the rules and the sibling fields.
    ///
    /// A sibling with the same id as the field being edited is ignored, so a
    /// field never collides with its own prior key.
    pub fn validate(&self, siblings: &[FieldDefinition]) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let label = self.label.trim();
        if label.is_empty() {
            errors.insert("label", "Label is required");
        } else if label.chars().count() > LABEL_MAX_LEN {
            errors.insert(
                "label",
                format!("Label must be at most {LABEL_MAX_LEN} characters"),
            );
        }

        if self.key.is_empty() {
            errors.insert("key", "Key is required");
        } else if self.key.len() > KEY_MAX_LEN {
            errors.insert("key", format!("Key must be at most {KEY_MAX_LEN} characters"));
        } else if !slug::is_valid_key(&self.key) {
            errors.insert(
                "key",
                "Key may only contain lowercase letters, numbers, and underscores",
            );
        } else if siblings
            .iter()
            .any(|f| Some(f.id) != self.editing && f.key == self.key)
        {
            errors.insert(
                "key",
                format!("Key \"{}\" is already used by another field", self.key),
            );
        }

        for section in self.visible_sections() {
            match section {
                EditorSection::General => {}
                EditorSection::TextValidation => self.check_text_rules(&mut errors),
                EditorSection::NumberValidation => self.check_number_rules(&mut errors),
                EditorSection::DropdownOptions => self.check_dropdown(&mut errors),
                EditorSection::FileConstraints => self.check_file(&mut errors),
                EditorSection::DateRange => self.check_dates(&mut errors),
                EditorSection::BooleanLabels => {}
                EditorSection::Relationship => {
                    if self.related_collection.is_none() {
                        errors.insert("relationshipConfig", "Related collection is required");
                    }
                }
                EditorSection::NestedFields => self.check_nested(&mut errors),
                EditorSection::SlugSource => {
                    if let Some(source) = &self.slug_source {
                        if source == &self.key {
                            errors.insert("slugConfig", "A slug cannot be generated from itself");
                        }
                    }
                }
            }
        }

        errors.into_result()
    }

    /// Validates and emits the normalized definition.
    pub fn submit(&self, siblings: &[FieldDefinition]) -> Result<FieldDefinition, FieldErrors> {
        self.validate(siblings)?;
        let kind = self.build_kind()?;
        let validation = if self.field_type.is_textual() && self.field_type != FieldType::Slug {
            self.validation.text_only()
        } else if self.field_type.is_numeric() {
            self.validation.numeric_only()
        } else {
            ValidationRules::default()
        };
        let def = FieldDefinition {
            id: self.editing.unwrap_or_default(),
            label: self.label.trim().to_string(),
            key: self.key.clone(),
            kind,
            required: self.required,
            readonly: self.readonly,
            hidden: self.hidden,
            help_text: non_empty(&self.help_text),
            placeholder: non_empty(&self.placeholder),
            validation,
            default_value: self.default_value.clone(),
            index_order: self.index_order,
        };
        debug!(key = %def.key, field_type = %self.field_type, "field editor submitted");
        Ok(def)
    }

    fn build_kind(&self) -> Result<FieldKind, FieldErrors> {
        Ok(match self.field_type {
            FieldType::ShortText => FieldKind::ShortText,
            FieldType::LongText => FieldKind::LongText,
            FieldType::RichText => FieldKind::RichText,
            FieldType::Slug => FieldKind::Slug(SlugConfig {
                source_field: self.slug_source.clone(),
            }),
            FieldType::Email => FieldKind::Email,
            FieldType::Number => FieldKind::Number,
            FieldType::Boolean => FieldKind::Boolean(BooleanConfig {
                true_label: self.boolean.true_label.as_deref().and_then(non_empty),
                false_label: self.boolean.false_label.as_deref().and_then(non_empty),
            }),
            FieldType::Date => FieldKind::Date(self.date.clone()),
            FieldType::Timestamp => FieldKind::Timestamp(self.date.clone()),
            FieldType::Dropdown => FieldKind::Dropdown(self.dropdown_options.clone()),
            FieldType::File => FieldKind::File(self.file.clone()),
            FieldType::Json => FieldKind::Json,
            FieldType::Relationship => {
                let Some(related) = self.related_collection else {
                    let mut errors = FieldErrors::new();
                    errors.insert("relationshipConfig", "Related collection is required");
                    return Err(errors);
                };
                FieldKind::Relationship(RelationshipConfig {
                    related_collection_id: related,
                    is_multiple: self.relationship_multiple,
                })
            }
            FieldType::NestedSchema => FieldKind::NestedSchema(NestedSchemaConfig {
                fields: self.nested_fields.clone(),
                is_multiple: self.nested_multiple,
            }),
        })
    }

    fn check_text_rules(&self, errors: &mut FieldErrors) {
        if let (Some(min), Some(max)) = (self.validation.min_length, self.validation.max_length) {
            if min > max {
                errors.insert(
                    "validation",
                    "Minimum length cannot be greater than maximum length",
                );
            }
        }
        if let Some(pattern) = &self.validation.pattern {
            if regex::Regex::new(pattern).is_err() {
                errors.insert("validation", "Pattern is not a valid regular expression");
            }
        }
    }

    fn check_number_rules(&self, errors: &mut FieldErrors) {
        if let (Some(min), Some(max)) = (self.validation.min_value, self.validation.max_value) {
            if min > max {
                errors.insert(
                    "validation",
                    "Minimum value cannot be greater than maximum value",
                );
            }
        }
        if let Some(step) = self.validation.step {
            if step <= 0.0 || !step.is_finite() {
                errors.insert("validation", "Step must be a positive number");
            }
        }
    }

    fn check_dropdown(&self, errors: &mut FieldErrors) {
        if self.dropdown_options.is_empty() {
            errors.insert("dropdownOptions", "Add at least one option");
            return;
        }
        let mut seen = HashSet::new();
        for option in &self.dropdown_options {
            if option.value.trim().is_empty() || option.label.trim().is_empty() {
                errors.insert("dropdownOptions", "Every option needs a label and a value");
            } else if !seen.insert(option.value.as_str()) {
                errors.insert(
                    "dropdownOptions",
                    format!("Option value \"{}\" is duplicated", option.value),
                );
            }
        }
    }

    fn check_file(&self, errors: &mut FieldErrors) {
        if let Some(unknown) = self
            .file
            .allowed_types
            .iter()
            .find(|t| !FILE_TYPE_OPTIONS.contains(&t.as_str()))
        {
            errors.insert("fileConfig", format!("Unknown file type \"{unknown}\""));
        }
        if self.file.max_size_mb == Some(0) {
            errors.insert("fileConfig", "Maximum size must be at least 1 MB");
        }
    }

    fn check_dates(&self, errors: &mut FieldErrors) {
        let min = self.date.min_date.as_deref().map(parse_date_bound);
        let max = self.date.max_date.as_deref().map(parse_date_bound);
        if matches!(min, Some(None)) {
            errors.insert("dateConfig", "Minimum date is not a valid date");
        }
        if matches!(max, Some(None)) {
            errors.insert("dateConfig", "Maximum date is not a valid date");
        }
        if let (Some(Some(min)), Some(Some(max))) = (min, max) {
            if min > max {
                errors.insert("dateConfig", "Minimum date cannot be after maximum date");
            }
        }
    }

    fn check_nested(&self, errors: &mut FieldErrors) {
        if self.nested_fields.is_empty() {
            errors.insert("nestedSchemaConfig", "Add at least one sub-field");
            return;
        }
        let mut keys = HashSet::new();
        for field in &self.nested_fields {
            if let Some(t) = field.field_type() {
                if !t.is_nestable() {
                    errors.insert(
                        "nestedSchemaConfig",
                        format!("{t} fields cannot be nested"),
                    );
                }
            }
            let label = field.label.trim();
            if label.is_empty() {
                errors.insert(
                    "nestedSchemaConfig",
                    format!("Sub-field \"{}\" needs a label", field.key),
                );
            } else if label.chars().count() > LABEL_MAX_LEN {
                errors.insert(
                    "nestedSchemaConfig",
                    format!(
                        "Sub-field label \"{label}\" must be at most {LABEL_MAX_LEN} characters"
                    ),
                );
            }
            if field.key.is_empty() {
                errors.insert("nestedSchemaConfig", "Sub-field key is required");
            } else if field.key.len() > KEY_MAX_LEN {
                errors.insert(
                    "nestedSchemaConfig",
                    format!(
                        "Sub-field key \"{}\" must be at most {KEY_MAX_LEN} characters",
                        field.key
                    ),
                );
            } else if !slug::is_valid_key(&field.key) {
                errors.insert(
                    "nestedSchemaConfig",
                    format!("Sub-field key \"{}\" is invalid", field.key),
                );
            } else if !keys.insert(field.key.as_str()) {
                errors.insert(
                    "nestedSchemaConfig",
                    format!("Sub-field key \"{}\" is duplicated", field.key),
                );
            }
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parses an ISO-8601 date or RFC 3339 date-time.
pub(crate) fn parse_date_bound(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
