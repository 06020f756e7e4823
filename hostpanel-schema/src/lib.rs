//! Collection schema model for hostpanel.
//!
//! Defines the types that describe a content collection's shape:
//! - [`FieldDefinition`]: one field of a collection, serialized in the
//!   persisted camelCase JSON layout
//! - [`FieldKind`]: closed tagged union of field types and their
//!   type-specific configuration
//! - [`FieldEditor`]: collects configuration for a single field and emits a
//!   normalized definition
//! - [`SchemaManager`]: tracks an ordered field list against the last-saved
//!   snapshot and forwards saves to a [`SchemaStore`]
//!
//! These types are consumed by the entry form, the REST client and the
//! preview server.

mod editor;
mod error;
mod field;
mod manager;
pub mod slug;
mod store;

pub use editor::{EditorSection, EditorView, FieldEditor, FILE_TYPE_OPTIONS, KEY_MAX_LEN, LABEL_MAX_LEN};
pub use error::{FieldErrors, SchemaError, SchemaResult};
pub use field::{
    BooleanConfig, DateConfig, DropdownOption, FieldDefinition, FieldKind, FieldType, FileConfig,
    NestedSchemaConfig, RelationshipConfig, SlugConfig, ValidationRules,
};
pub use manager::{ChangeStatus, SchemaManager, TrackedField};
pub use store::{SchemaStore, StoreError};
