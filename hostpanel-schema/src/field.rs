//! Field definitions and the field-type union.
//!
//! [`FieldKind`] is the in-memory form: one variant per field type, each
//! carrying only the configuration that type uses. On the wire a field is a
//! flat camelCase object with a `type` string and at most one populated
//! config bucket (`dropdownOptions`, `fileConfig`, ...). The conversion lives
//! in [`FieldRecord`] so the rest of the crate never sees the flat shape.

use crate::error::SchemaError;
use hostpanel_types::{CollectionId, FieldId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The data kind of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    ShortText,
    LongText,
    RichText,
    Slug,
    Email,
    Number,
    Boolean,
    Date,
    Timestamp,
    Dropdown,
    File,
    Json,
    Relationship,
    NestedSchema,
}

impl FieldType {
    pub const ALL: [FieldType; 14] = [
        FieldType::ShortText,
        FieldType::LongText,
        FieldType::RichText,
        FieldType::Slug,
        FieldType::Email,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Date,
        FieldType::Timestamp,
        FieldType::Dropdown,
        FieldType::File,
        FieldType::Json,
        FieldType::Relationship,
        FieldType::NestedSchema,
    ];

    /// Wire name of the type (`short_text`, `nested_schema`, ...).
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldType::ShortText => "short_text",
            FieldType::LongText => "long_text",
            FieldType::RichText => "rich_text",
            FieldType::Slug => "slug",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Timestamp => "timestamp",
            FieldType::Dropdown => "dropdown",
            FieldType::File => "file",
            FieldType::Json => "json",
            FieldType::Relationship => "relationship",
            FieldType::NestedSchema => "nested_schema",
        }
    }

    /// Parses a type name after trimming and lower-casing it.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
    }

    /// Whether the type may appear as a sub-field of a nested schema.
    ///
    /// Relationships and nested schemas are excluded so nesting stays one
    /// level deep.
    pub const fn is_nestable(&self) -> bool {
        !matches!(self, FieldType::Relationship | FieldType::NestedSchema)
    }

    /// Types whose value is a string subject to length rules.
    pub const fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldType::ShortText
                | FieldType::LongText
                | FieldType::RichText
                | FieldType::Slug
                | FieldType::Email
        )
    }

    pub const fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value rules checked when an entry is saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl ValidationRules {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Keeps only the rules that apply to string values.
    pub fn text_only(&self) -> Self {
        Self {
            min_length: self.min_length,
            max_length: self.max_length,
            pattern: self.pattern.clone(),
            ..Self::default()
        }
    }

    /// Keeps only the rules that apply to numeric values.
    pub fn numeric_only(&self) -> Self {
        Self {
            min_value: self.min_value,
            max_value: self.max_value,
            step: self.step,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    /// Accepted file categories, drawn from `FILE_TYPE_OPTIONS`.
    #[serde(default)]
    pub allowed_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size_mb: Option<u32>,
    #[serde(default)]
    pub multiple: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateConfig {
    /// Inclusive lower bound as an ISO-8601 date or date-time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    #[serde(default)]
    pub default_to_now: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipConfig {
    pub related_collection_id: CollectionId,
    #[serde(default)]
    pub is_multiple: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedSchemaConfig {
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub is_multiple: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugConfig {
    /// Key of the sibling field the slug is generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
}

/// A field's type together with its type-specific configuration.
///
/// New field types are added as a variant here; every consumer matches
/// exhaustively, so the compiler points at each place that needs a branch.
/// Types this build does not know survive as [`FieldKind::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    ShortText,
    LongText,
    RichText,
    Slug(SlugConfig),
    Email,
    Number,
    Boolean(BooleanConfig),
    Date(DateConfig),
    Timestamp(DateConfig),
    Dropdown(Vec<DropdownOption>),
    File(FileConfig),
    Json,
    Relationship(RelationshipConfig),
    NestedSchema(NestedSchemaConfig),
    Other { type_name: String },
}

impl FieldKind {
    /// The known type, or `None` for [`FieldKind::Other`].
    pub fn field_type(&self) -> Option<FieldType> {
        Some(match self {
            FieldKind::ShortText => FieldType::ShortText,
            FieldKind::LongText => FieldType::LongText,
            FieldKind::RichText => FieldType::RichText,
            FieldKind::Slug(_) => FieldType::Slug,
            FieldKind::Email => FieldType::Email,
            FieldKind::Number => FieldType::Number,
            FieldKind::Boolean(_) => FieldType::Boolean,
            FieldKind::Date(_) => FieldType::Date,
            FieldKind::Timestamp(_) => FieldType::Timestamp,
            FieldKind::Dropdown(_) => FieldType::Dropdown,
            FieldKind::File(_) => FieldType::File,
            FieldKind::Json => FieldType::Json,
            FieldKind::Relationship(_) => FieldType::Relationship,
            FieldKind::NestedSchema(_) => FieldType::NestedSchema,
            FieldKind::Other { .. } => return None,
        })
    }

    /// Wire name of the type, including unknown ones.
    pub fn type_name(&self) -> &str {
        match self {
            FieldKind::Other { type_name } => type_name,
            known => known.field_type().map_or("", |t| t.as_str()),
        }
    }

    /// Builds the kind for a type with empty configuration.
    ///
    /// Relationships need a target collection and are built directly.
    pub fn empty(field_type: FieldType) -> Option<Self> {
        Some(match field_type {
            FieldType::ShortText => FieldKind::ShortText,
            FieldType::LongText => FieldKind::LongText,
            FieldType::RichText => FieldKind::RichText,
            FieldType::Slug => FieldKind::Slug(SlugConfig::default()),
            FieldType::Email => FieldKind::Email,
            FieldType::Number => FieldKind::Number,
            FieldType::Boolean => FieldKind::Boolean(BooleanConfig::default()),
            FieldType::Date => FieldKind::Date(DateConfig::default()),
            FieldType::Timestamp => FieldKind::Timestamp(DateConfig::default()),
            FieldType::Dropdown => FieldKind::Dropdown(Vec::new()),
            FieldType::File => FieldKind::File(FileConfig::default()),
            FieldType::Json => FieldKind::Json,
            FieldType::Relationship => return None,
            FieldType::NestedSchema => FieldKind::NestedSchema(NestedSchemaConfig::default()),
        })
    }
}

/// One field of a collection schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "FieldRecord", try_from = "FieldRecord")]
pub struct FieldDefinition {
    pub id: FieldId,
    pub label: String,
    /// Unique among sibling fields; the record key for entry data.
    pub key: String,
    pub kind: FieldKind,
    pub required: bool,
    pub readonly: bool,
    pub hidden: bool,
    pub help_text: Option<String>,
    pub placeholder: Option<String>,
    pub validation: ValidationRules,
    pub default_value: Option<Value>,
    /// Display position; entry forms sort by this.
    pub index_order: i64,
}

impl FieldDefinition {
    pub fn new(label: impl Into<String>, key: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: FieldId::new(),
            label: label.into(),
            key: key.into(),
            kind,
            required: false,
            readonly: false,
            hidden: false,
            help_text: None,
            placeholder: None,
            validation: ValidationRules::default(),
            default_value: None,
            index_order: 0,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_validation(mut self, validation: ValidationRules) -> Self {
        self.validation = validation;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    #[must_use]
    pub fn at(mut self, index_order: i64) -> Self {
        self.index_order = index_order;
        self
    }

    pub fn field_type(&self) -> Option<FieldType> {
        self.kind.field_type()
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    /// Equality ignoring `index_order`; position is tracked separately.
    pub fn same_content(&self, other: &Self) -> bool {
        self.id == other.id
            && self.label == other.label
            && self.key == other.key
            && self.kind == other.kind
            && self.required == other.required
            && self.readonly == other.readonly
            && self.hidden == other.hidden
            && self.help_text == other.help_text
            && self.placeholder == other.placeholder
            && self.validation == other.validation
            && self.default_value == other.default_value
    }
}

/// Persisted JSON layout of a field definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldRecord {
    id: FieldId,
    label: String,
    key: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    readonly: bool,
    #[serde(default)]
    hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "ValidationRules::is_empty")]
    validation: ValidationRules,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dropdown_options: Option<Vec<DropdownOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_config: Option<FileConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_config: Option<DateConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    boolean_config: Option<BooleanConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relationship_config: Option<RelationshipConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nested_schema_config: Option<NestedSchemaConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slug_config: Option<SlugConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<Value>,
    #[serde(default)]
    index_order: i64,
}

impl From<FieldDefinition> for FieldRecord {
    fn from(def: FieldDefinition) -> Self {
        let type_name = def.kind.type_name().to_string();
        let mut record = FieldRecord {
            id: def.id,
            label: def.label,
            key: def.key,
            type_name,
            required: def.required,
            readonly: def.readonly,
            hidden: def.hidden,
            help_text: def.help_text,
            placeholder: def.placeholder,
            validation: def.validation,
            dropdown_options: None,
            file_config: None,
            date_config: None,
            boolean_config: None,
            relationship_config: None,
            nested_schema_config: None,
            slug_config: None,
            default_value: def.default_value,
            index_order: def.index_order,
        };
        match def.kind {
            FieldKind::Slug(cfg) => record.slug_config = Some(cfg),
            FieldKind::Boolean(cfg) => record.boolean_config = Some(cfg),
            FieldKind::Date(cfg) | FieldKind::Timestamp(cfg) => record.date_config = Some(cfg),
            FieldKind::Dropdown(options) => record.dropdown_options = Some(options),
            FieldKind::File(cfg) => record.file_config = Some(cfg),
            FieldKind::Relationship(cfg) => record.relationship_config = Some(cfg),
            FieldKind::NestedSchema(cfg) => record.nested_schema_config = Some(cfg),
            FieldKind::ShortText
            | FieldKind::LongText
            | FieldKind::RichText
            | FieldKind::Email
            | FieldKind::Number
            | FieldKind::Json
            | FieldKind::Other { .. } => {}
        }
        record
    }
}

impl TryFrom<FieldRecord> for FieldDefinition {
    type Error = SchemaError;

    fn try_from(record: FieldRecord) -> Result<Self, Self::Error> {
        let kind = match FieldType::parse(&record.type_name) {
            None => FieldKind::Other {
                type_name: record.type_name,
            },
            Some(FieldType::ShortText) => FieldKind::ShortText,
            Some(FieldType::LongText) => FieldKind::LongText,
            Some(FieldType::RichText) => FieldKind::RichText,
            Some(FieldType::Slug) => FieldKind::Slug(record.slug_config.unwrap_or_default()),
            Some(FieldType::Email) => FieldKind::Email,
            Some(FieldType::Number) => FieldKind::Number,
            Some(FieldType::Boolean) => {
                FieldKind::Boolean(record.boolean_config.unwrap_or_default())
            }
            Some(FieldType::Date) => FieldKind::Date(record.date_config.unwrap_or_default()),
            Some(FieldType::Timestamp) => {
                FieldKind::Timestamp(record.date_config.unwrap_or_default())
            }
            Some(FieldType::Dropdown) => {
                FieldKind::Dropdown(record.dropdown_options.unwrap_or_default())
            }
            Some(FieldType::File) => FieldKind::File(record.file_config.unwrap_or_default()),
            Some(FieldType::Json) => FieldKind::Json,
            Some(FieldType::Relationship) => FieldKind::Relationship(
                record
                    .relationship_config
                    .ok_or_else(|| SchemaError::MissingRelationshipTarget(record.key.clone()))?,
            ),
            Some(FieldType::NestedSchema) => {
                FieldKind::NestedSchema(record.nested_schema_config.unwrap_or_default())
            }
        };
        Ok(FieldDefinition {
            id: record.id,
            label: record.label,
            key: record.key,
            kind,
            required: record.required,
            readonly: record.readonly,
            hidden: record.hidden,
            help_text: record.help_text,
            placeholder: record.placeholder,
            validation: record.validation,
            default_value: record.default_value,
            index_order: record.index_order,
        })
    }
}
