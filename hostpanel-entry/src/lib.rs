//! Collection entry model for hostpanel.
//!
//! - [`Entry`]: one record of a collection with separate live and draft
//!   payloads
//! - [`FormRecord`]: flat `key → value` map edited by the entry form
//! - [`validate_record`]: per-field rules checked on save
//! - [`FieldRenderer`]: type → widget dispatch, recursive for nested schemas
//! - [`EntryForm`]: form state, nested edit buffering and the
//!   save/publish/unpublish action bar
//! - [`EntryStore`]: the persistence collaborator behind those actions

mod config;
mod entry;
mod error;
mod form;
mod nested;
mod record;
mod render;
mod store;
mod validate;

pub use config::FormConfig;
pub use entry::{Entry, PublicationState};
pub use error::{EntryError, EntryResult};
pub use form::{ActionBar, Button, EntryForm};
pub use nested::{NestedEdit, NestedEditBuffer, RemovalRequest};
pub use record::{default_record, FormRecord};
pub use render::{
    coerce_input, relationship_label, CharCounter, FieldRenderer, FileDescriptor, RenderedField,
    RenderedItem, TextInputKind, Widget, WidgetExtension,
};
pub use store::EntryStore;
pub use validate::{is_present, validate_field, validate_record, ValidationErrors};
