//! Schema manager: an ordered field list tracked against its saved snapshot.
//!
//! Change status is never stored. It is derived on demand by diffing the
//! working list against the immutable snapshot taken at load (or at the
//! last successful save):
//!
//! - not in the snapshot → `Added`
//! - soft-deleted → `Deleted`
//! - content differs, or its rank among persisted fields moved → `Updated`
//! - otherwise → `Unchanged`
//!
//! Rank is counted among persisted fields only, so adding or discarding a
//! never-saved field does not shift anyone else's position.

use crate::error::{SchemaError, SchemaResult};
use crate::field::FieldDefinition;
use crate::store::SchemaStore;
use hostpanel_types::FieldId;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// How a field differs from the last-saved snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Unchanged,
    Added,
    Updated,
    Deleted,
}

/// A working field together with its derived status, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedField {
    #[serde(flatten)]
    pub field: FieldDefinition,
    pub change_status: ChangeStatus,
}

/// Tracks edits to a collection's fields until they are saved.
#[derive(Debug, Clone, Default)]
pub struct SchemaManager {
    original: Vec<FieldDefinition>,
    working: Vec<FieldDefinition>,
    deleted: HashSet<FieldId>,
}

impl SchemaManager {
    /// Loads a field list; it becomes the saved snapshot.
    pub fn new(mut fields: Vec<FieldDefinition>) -> Self {
        fields.sort_by_key(|f| f.index_order);
        Self {
            original: fields.clone(),
            working: fields,
            deleted: HashSet::new(),
        }
    }

    /// The snapshot the working list is compared against.
    pub fn original_fields(&self) -> &[FieldDefinition] {
        &self.original
    }

    /// Working fields in display order, soft-deleted ones included.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.working
    }

    /// Working fields that are not soft-deleted.
    pub fn live_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.working
            .iter()
            .filter(|f| !self.deleted.contains(&f.id))
    }

    pub fn get(&self, id: FieldId) -> Option<&FieldDefinition> {
        self.working.iter().find(|f| f.id == id)
    }

    pub fn tracked_fields(&self) -> Vec<TrackedField> {
        self.working
            .iter()
            .map(|f| TrackedField {
                field: f.clone(),
                change_status: self.derive_status(f),
            })
            .collect()
    }

    pub fn status_of(&self, id: FieldId) -> Option<ChangeStatus> {
        self.get(id).map(|f| self.derive_status(f))
    }

    /// True when any field's status is not `Unchanged`.
    pub fn has_changes(&self) -> bool {
        self.working
            .iter()
            .any(|f| self.derive_status(f) != ChangeStatus::Unchanged)
    }

    /// Appends a new field. Its key must not collide with any tracked field,
    /// soft-deleted ones included, so that a later restore cannot collide.
    pub fn add(&mut self, field: FieldDefinition) -> SchemaResult<()> {
        if self.working.iter().any(|f| f.id == field.id) {
            return Err(SchemaError::DuplicateId(field.id));
        }
        self.ensure_key_free(&field.key, field.id)?;
        debug!(key = %field.key, "schema field added");
        self.working.push(field);
        Ok(())
    }

    /// Replaces a field's content. The type is fixed once a field exists.
    pub fn edit(&mut self, field: FieldDefinition) -> SchemaResult<()> {
        if self.deleted.contains(&field.id) {
            return Err(SchemaError::FieldDeleted(field.id));
        }
        self.ensure_key_free(&field.key, field.id)?;
        let slot = self
            .working
            .iter_mut()
            .find(|f| f.id == field.id)
            .ok_or(SchemaError::FieldNotFound(field.id))?;
        if slot.type_name() != field.type_name() {
            return Err(SchemaError::TypeChanged {
                key: slot.key.clone(),
                from: slot.type_name().to_string(),
                to: field.type_name().to_string(),
            });
        }
        debug!(key = %field.key, "schema field edited");
        *slot = field;
        Ok(())
    }

    /// Deletes a field. Never-saved fields are dropped outright; persisted
    /// fields are soft-deleted and can be restored.
    pub fn delete(&mut self, id: FieldId) -> SchemaResult<()> {
        let pos = self
            .working
            .iter()
            .position(|f| f.id == id)
            .ok_or(SchemaError::FieldNotFound(id))?;
        if self.is_persisted(id) {
            self.deleted.insert(id);
            debug!(%id, "schema field soft-deleted");
        } else {
            self.working.remove(pos);
            debug!(%id, "unsaved schema field discarded");
        }
        Ok(())
    }

    /// Undoes a soft delete, reverting the field to its snapshot content.
    pub fn restore(&mut self, id: FieldId) -> SchemaResult<()> {
        if !self.deleted.contains(&id) {
            return Err(SchemaError::NotDeleted(id));
        }
        let original = self
            .original
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or(SchemaError::FieldNotFound(id))?;
        self.ensure_key_free(&original.key, id)?;
        if let Some(slot) = self.working.iter_mut().find(|f| f.id == id) {
            *slot = original;
        }
        self.deleted.remove(&id);
        debug!(%id, "schema field restored");
        Ok(())
    }

    /// Moves the field at `from` to position `to` (drag and drop).
    pub fn move_field(&mut self, from: usize, to: usize) -> SchemaResult<()> {
        let len = self.working.len();
        if from >= len || to >= len {
            return Err(SchemaError::MoveOutOfRange { from, to, len });
        }
        let field = self.working.remove(from);
        self.working.insert(to, field);
        debug!(from, to, "schema field moved");
        Ok(())
    }

    /// The list a save would send: soft-deleted fields removed,
    /// `index_order` renumbered to display order. No status is attached.
    pub fn pending_save(&self) -> Vec<FieldDefinition> {
        self.live_fields()
            .cloned()
            .enumerate()
            .map(|(i, mut f)| {
                f.index_order = i as i64;
                f
            })
            .collect()
    }

    /// Resets the snapshot to a saved list; every status becomes `Unchanged`.
    pub fn mark_saved(&mut self, saved: Vec<FieldDefinition>) {
        *self = Self::new(saved);
    }

    /// Forwards the pending list to the store and, on success, makes the
    /// stored list the new snapshot. On failure nothing changes.
    pub async fn save(&mut self, store: &dyn SchemaStore) -> SchemaResult<Vec<FieldDefinition>> {
        let fields = self.pending_save();
        let count = fields.len();
        match store.save_fields(fields).await {
            Ok(saved) => {
                info!(fields = count, "collection schema saved");
                self.mark_saved(saved.clone());
                Ok(saved)
            }
            Err(e) => {
                warn!(error = %e, "collection schema save failed");
                Err(e.into())
            }
        }
    }

    fn is_persisted(&self, id: FieldId) -> bool {
        self.original.iter().any(|f| f.id == id)
    }

    fn ensure_key_free(&self, key: &str, own_id: FieldId) -> SchemaResult<()> {
        if self.working.iter().any(|f| f.id != own_id && f.key == key) {
            return Err(SchemaError::DuplicateKey(key.to_string()));
        }
        Ok(())
    }

    fn persisted_rank(&self, id: FieldId) -> Option<usize> {
        self.working
            .iter()
            .filter(|f| self.is_persisted(f.id))
            .position(|f| f.id == id)
    }

    fn derive_status(&self, field: &FieldDefinition) -> ChangeStatus {
        let Some((original_rank, original)) = self
            .original
            .iter()
            .enumerate()
            .find(|(_, f)| f.id == field.id)
        else {
            return ChangeStatus::Added;
        };
        if self.deleted.contains(&field.id) {
            return ChangeStatus::Deleted;
        }
        if !field.same_content(original) || self.persisted_rank(field.id) != Some(original_rank) {
            return ChangeStatus::Updated;
        }
        ChangeStatus::Unchanged
    }
}
