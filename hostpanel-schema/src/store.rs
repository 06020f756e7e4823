use crate::FieldDefinition;
use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by an external persistence collaborator.
///
/// Carries the message to surface in a general error banner; the
/// collaborator decides whether it came from the server or is a generic
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Persists a collection's field list.
///
/// Implemented by the REST client; tests supply in-memory versions.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Replaces the collection's fields and returns the list as stored.
    async fn save_fields(
        &self,
        fields: Vec<FieldDefinition>,
    ) -> Result<Vec<FieldDefinition>, StoreError>;
}
