//! Error types for entry operations.

use crate::validate::ValidationErrors;
use hostpanel_schema::StoreError;
use thiserror::Error;

/// Result type for entry operations.
pub type EntryResult<T> = Result<T, EntryError>;

/// Errors that can occur while editing or persisting an entry.
#[derive(Debug, Error)]
pub enum EntryError {
    /// One or more fields failed their rules; the map is keyed by field path.
    #[error("{} field(s) failed validation", .0.len())]
    Validation(ValidationErrors),

    /// The persistence collaborator rejected the action.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field '{0}' is read-only")]
    ReadOnly(String),

    #[error("field '{0}' is not a list of nested items")]
    NotNestedList(String),

    #[error("field '{0}' is not a nested object")]
    NotNestedObject(String),

    #[error("field '{0}' is not a slug field")]
    NotSlugField(String),

    #[error("item {index} of '{key}' does not exist")]
    ItemOutOfRange { key: String, index: usize },

    #[error("no matching removal is awaiting confirmation")]
    NoRemovalPending,

    #[error("{0} is not available in the current state")]
    ActionUnavailable(&'static str),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
