//! Collection entry form.
//!
//! Holds the form record being edited next to the last-saved record, so
//! "unsaved changes" is a plain comparison of the two (plus any nested item
//! edits still inside their debounce window). The action bar is derived
//! from that and the entry's publication state:
//!
//! | state                    | save            | publish / publish changes | unpublish |
//! |--------------------------|-----------------|---------------------------|-----------|
//! | draft                    | unsaved changes | draft exists, all saved   | hidden    |
//! | published, draft ahead   | unsaved changes | all saved                 | hidden    |
//! | published, draft ≡ live  | unsaved changes | hidden                    | always    |
//!
//! Collaborator failures never become field errors; they are kept as a
//! single general error message for a banner.

use crate::config::FormConfig;
use crate::entry::{Entry, PublicationState};
use crate::error::{EntryError, EntryResult};
use crate::nested::{NestedEdit, NestedEditBuffer, RemovalRequest};
use crate::record::{default_record, FormRecord};
use crate::render::{FieldRenderer, RenderedField};
use crate::store::EntryStore;
use crate::validate::{validate_record, ValidationErrors};
use hostpanel_schema::slug::derive_slug;
use hostpanel_schema::{FieldDefinition, FieldKind, NestedSchemaConfig, StoreError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// One action bar button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Button {
    pub enabled: bool,
}

impl Button {
    const fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

/// Buttons shown for the current entry state. `None` means hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionBar {
    pub state: PublicationState,
    pub save: Button,
    pub publish: Option<Button>,
    pub publish_changes: Option<Button>,
    pub unpublish: Option<Button>,
}

/// Editing state for one entry of a collection.
#[derive(Debug)]
pub struct EntryForm {
    entry: Entry,
    fields: Vec<FieldDefinition>,
    form_data: FormRecord,
    saved_data: FormRecord,
    errors: ValidationErrors,
    general_error: Option<String>,
    manual_slugs: HashSet<String>,
    nested: NestedEditBuffer,
    pending_removal: Option<RemovalRequest>,
    renderer: FieldRenderer,
}

impl EntryForm {
    /// Opens an entry for editing.
    ///
    /// The form starts from the entry's draft (or live data when there is
    /// no draft) layered over the fields' defaults. That starting record
    /// is the saved baseline, so defaults alone never count as unsaved.
    pub fn new(entry: Entry, mut fields: Vec<FieldDefinition>, config: &FormConfig) -> Self {
        fields.sort_by_key(|f| f.index_order);
        let mut form_data = default_record(&fields);
        for (key, value) in entry.working_record().iter() {
            form_data.insert(key, value.clone());
        }
        let manual_slugs = fields
            .iter()
            .filter(|f| slug_was_edited(f, &form_data))
            .map(|f| f.key.clone())
            .collect();
        debug!(entry = %entry.id, fields = fields.len(), "entry form opened");
        Self {
            saved_data: form_data.clone(),
            form_data,
            entry,
            fields,
            errors: ValidationErrors::new(),
            general_error: None,
            manual_slugs,
            nested: NestedEditBuffer::new(config.nested_debounce()),
            pending_removal: None,
            renderer: FieldRenderer::new(),
        }
    }

    /// Replaces the renderer, e.g. with one carrying widget extensions.
    pub fn with_renderer(mut self, renderer: FieldRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Fields in `index_order`.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn form_data(&self) -> &FormRecord {
        &self.form_data
    }

    pub fn saved_data(&self) -> &FormRecord {
        &self.saved_data
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn general_error(&self) -> Option<&str> {
        self.general_error.as_deref()
    }

    pub fn pending_removal(&self) -> Option<&RemovalRequest> {
        self.pending_removal.as_ref()
    }

    pub fn has_pending_nested_edits(&self) -> bool {
        self.nested.has_pending()
    }

    pub fn is_slug_manual(&self, key: &str) -> bool {
        self.manual_slugs.contains(key)
    }

    // ---- change tracking ----

    pub fn has_unsaved_changes(&self) -> bool {
        self.nested.has_pending() || self.form_data != self.saved_data
    }

    pub fn can_publish(&self) -> bool {
        self.entry.has_draft() && !self.has_unsaved_changes()
    }

    pub fn can_publish_changes(&self) -> bool {
        self.entry.published && self.entry.has_draft_changes() && !self.has_unsaved_changes()
    }

    pub fn action_bar(&self) -> ActionBar {
        let state = self.entry.publication_state();
        let save = Button::new(self.has_unsaved_changes());
        let (publish, publish_changes, unpublish) = match state {
            PublicationState::Draft => (Some(Button::new(self.can_publish())), None, None),
            PublicationState::PublishedWithChanges => {
                (None, Some(Button::new(self.can_publish_changes())), None)
            }
            PublicationState::Published => (None, None, Some(Button::new(true))),
        };
        ActionBar {
            state,
            save,
            publish,
            publish_changes,
            unpublish,
        }
    }

    // ---- top-level values ----

    /// Stores a widget's input for a top-level field.
    ///
    /// Slug fields following this field as their source are regenerated
    /// unless they were edited by hand. Editing a slug field directly marks
    /// it as hand-edited.
    pub fn set_value(&mut self, key: &str, input: Value) -> EntryResult<()> {
        let field = self.editable_field(key)?;
        let is_slug = matches!(field.kind, FieldKind::Slug(_));
        let value = self.renderer.coerce(field, input);
        if is_slug {
            self.manual_slugs.insert(key.to_string());
        }
        self.errors.remove(key);
        self.form_data.insert(key, value);

        let followers: Vec<String> = self
            .fields
            .iter()
            .filter(|f| slug_source(f) == Some(key) && !self.manual_slugs.contains(&f.key))
            .map(|f| f.key.clone())
            .collect();
        for follower in followers {
            let slug = derive_slug(self.form_data.get_str(key).unwrap_or_default());
            self.form_data.insert(follower, Value::String(slug));
        }
        Ok(())
    }

    /// Rebuilds a slug from its source field and resumes following it.
    ///
    /// Without a configured source the slug's own text is normalized.
    pub fn regenerate_slug(&mut self, key: &str) -> EntryResult<String> {
        let field = self.field(key)?;
        let FieldKind::Slug(cfg) = &field.kind else {
            return Err(EntryError::NotSlugField(key.to_string()));
        };
        let source_key = cfg.source_field.as_deref().unwrap_or(key);
        let slug = derive_slug(self.form_data.get_str(source_key).unwrap_or_default());
        self.manual_slugs.remove(key);
        self.errors.remove(key);
        self.form_data.insert(key, Value::String(slug.clone()));
        Ok(slug)
    }

    // ---- nested schema values ----

    /// Appends a default-valued item to a nested list and returns its index.
    pub fn add_nested_item(&mut self, key: &str) -> EntryResult<usize> {
        self.editable_field(key)?;
        let item = default_record(&self.nested_list_config(key)?.fields).into_value();
        let pending = self.nested.flush_key(key);
        self.apply_edits(pending);
        let items = self.list_mut(key)?;
        items.push(item);
        let index = items.len() - 1;
        debug!(key, index, "nested item added");
        Ok(index)
    }

    /// Edits one sub-field of a nested list item.
    ///
    /// The change is visible immediately through [`EntryForm::display_record`]
    /// and reaches the form record once the item's debounce window elapses.
    pub fn edit_nested_item(
        &mut self,
        key: &str,
        index: usize,
        sub_key: &str,
        input: Value,
    ) -> EntryResult<()> {
        self.editable_field(key)?;
        let cfg = self.nested_list_config(key)?;
        let sub_field = cfg
            .fields
            .iter()
            .find(|f| f.key == sub_key)
            .ok_or_else(|| EntryError::UnknownField(format!("{key}.{sub_key}")))?;
        if sub_field.readonly {
            return Err(EntryError::ReadOnly(format!("{key}.{sub_key}")));
        }
        let value = self.renderer.coerce(sub_field, input);

        let mut item = match self.nested.pending_value(key, index) {
            Some(pending) => pending.clone(),
            None => self.list_item(key, index)?.clone(),
        };
        match item.as_object_mut() {
            Some(map) => {
                map.insert(sub_key.to_string(), value);
            }
            None => {
                let mut map = Map::new();
                map.insert(sub_key.to_string(), value);
                item = Value::Object(map);
            }
        }
        self.errors.remove(&format!("{key}.{index}.{sub_key}"));
        self.nested.record(key, index, item);
        Ok(())
    }

    /// Asks for confirmation before removing a nested list item.
    pub fn request_removal(&mut self, key: &str, index: usize) -> EntryResult<()> {
        self.editable_field(key)?;
        self.nested_list_config(key)?;
        self.list_item(key, index)?;
        self.pending_removal = Some(RemovalRequest {
            key: key.to_string(),
            index,
        });
        Ok(())
    }

    pub fn cancel_removal(&mut self) {
        self.pending_removal = None;
    }

    /// Removes the item awaiting confirmation and returns it.
    ///
    /// Pending edits of that list are applied first so that no edit lands
    /// on a shifted index.
    pub fn confirm_removal(&mut self) -> EntryResult<Value> {
        let request = self
            .pending_removal
            .take()
            .ok_or(EntryError::NoRemovalPending)?;
        let pending = self.nested.flush_key(&request.key);
        self.apply_edits(pending);
        let items = self.list_mut(&request.key)?;
        if request.index >= items.len() {
            return Err(EntryError::ItemOutOfRange {
                key: request.key,
                index: request.index,
            });
        }
        let removed = items.remove(request.index);
        let prefix = format!("{}.", request.key);
        self.errors.retain(|path, _| !path.starts_with(&prefix));
        debug!(key = %request.key, index = request.index, "nested item removed");
        Ok(removed)
    }

    /// Sets one sub-field of a single nested object. Not debounced.
    pub fn set_nested_object_value(
        &mut self,
        key: &str,
        sub_key: &str,
        input: Value,
    ) -> EntryResult<()> {
        let field = self.editable_field(key)?;
        let FieldKind::NestedSchema(cfg) = &field.kind else {
            return Err(EntryError::NotNestedObject(key.to_string()));
        };
        if cfg.is_multiple {
            return Err(EntryError::NotNestedObject(key.to_string()));
        }
        let sub_field = cfg
            .fields
            .iter()
            .find(|f| f.key == sub_key)
            .ok_or_else(|| EntryError::UnknownField(format!("{key}.{sub_key}")))?;
        if sub_field.readonly {
            return Err(EntryError::ReadOnly(format!("{key}.{sub_key}")));
        }
        let value = self.renderer.coerce(sub_field, input);

        let slot = self
            .form_data
            .get_mut(key)
            .filter(|v| v.is_object());
        match slot {
            Some(Value::Object(map)) => {
                map.insert(sub_key.to_string(), value);
            }
            _ => {
                let mut map = Map::new();
                map.insert(sub_key.to_string(), value);
                self.form_data.insert(key, Value::Object(map));
            }
        }
        self.errors.remove(&format!("{key}.{sub_key}"));
        Ok(())
    }

    /// Applies nested edits whose window has elapsed by `now`.
    pub fn apply_due_edits(&mut self, now: Instant) -> usize {
        let due = self.nested.take_due(now);
        self.apply_edits(due)
    }

    /// Waits out every pending debounce window, applying edits as they
    /// become due.
    pub async fn settle(&mut self) {
        while let Some(due) = self.nested.next_due() {
            tokio::time::sleep_until(due).await;
            self.apply_due_edits(Instant::now());
        }
    }

    /// Applies every pending nested edit immediately.
    pub fn flush_pending(&mut self) -> usize {
        let all = self.nested.flush();
        self.apply_edits(all)
    }

    /// The form record with pending nested edits layered on top; what the
    /// user currently sees.
    pub fn display_record(&self) -> FormRecord {
        let mut record = self.form_data.clone();
        for field in &self.fields {
            let Some(Value::Array(items)) = record.get_mut(&field.key) else {
                continue;
            };
            for (index, item) in items.iter_mut().enumerate() {
                if let Some(pending) = self.nested.pending_value(&field.key, index) {
                    *item = pending.clone();
                }
            }
        }
        record
    }

    /// Widgets for every visible field, with inline errors attached.
    pub fn render(&self) -> Vec<RenderedField> {
        self.renderer.render(
            &self.fields,
            &self.display_record(),
            &self.errors,
            self.pending_removal.as_ref(),
        )
    }

    /// Runs every field's rules and keeps the result for inline display.
    pub fn validate(&mut self) -> bool {
        self.errors = validate_record(&self.fields, &self.form_data);
        self.errors.is_empty()
    }

    // ---- actions ----

    /// Saves the form record as the entry's draft.
    ///
    /// Pending nested edits are flushed first so a save inside a debounce
    /// window still carries the latest input.
    pub async fn save(&mut self, store: &dyn EntryStore) -> EntryResult<Entry> {
        if !self.action_bar().save.enabled {
            return Err(EntryError::ActionUnavailable("save"));
        }
        self.flush_pending();
        self.general_error = None;
        if !self.validate() {
            debug!(entry = %self.entry.id, errors = self.errors.len(), "entry failed validation");
            return Err(EntryError::Validation(self.errors.clone()));
        }
        let data = self.form_data.clone();
        let result = store.save_draft(self.entry.id, data.clone()).await;
        let entry = self.accept(result, "save")?;
        self.saved_data = data;
        Ok(entry)
    }

    /// Publishes the draft, or publishes pending changes of a live entry.
    pub async fn publish(&mut self, store: &dyn EntryStore) -> EntryResult<Entry> {
        let bar = self.action_bar();
        let enabled = bar
            .publish
            .or(bar.publish_changes)
            .is_some_and(|b| b.enabled);
        if !enabled {
            return Err(EntryError::ActionUnavailable("publish"));
        }
        self.general_error = None;
        let result = store.publish(self.entry.id).await;
        self.accept(result, "publish")
    }

    pub async fn unpublish(&mut self, store: &dyn EntryStore) -> EntryResult<Entry> {
        if !self.action_bar().unpublish.is_some_and(|b| b.enabled) {
            return Err(EntryError::ActionUnavailable("unpublish"));
        }
        self.general_error = None;
        let result = store.unpublish(self.entry.id).await;
        self.accept(result, "unpublish")
    }

    fn accept(&mut self, result: Result<Entry, StoreError>, action: &str) -> EntryResult<Entry> {
        match result {
            Ok(entry) => {
                info!(entry = %entry.id, action, published = entry.published, "entry updated");
                self.entry = entry.clone();
                Ok(entry)
            }
            Err(e) => {
                warn!(entry = %self.entry.id, action, error = %e, "entry action failed");
                self.general_error = Some(e.message.clone());
                Err(e.into())
            }
        }
    }

    // ---- helpers ----

    fn field(&self, key: &str) -> EntryResult<&FieldDefinition> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| EntryError::UnknownField(key.to_string()))
    }

    /// The field for `key`, refusing read-only ones.
    fn editable_field(&self, key: &str) -> EntryResult<&FieldDefinition> {
        let field = self.field(key)?;
        if field.readonly {
            return Err(EntryError::ReadOnly(key.to_string()));
        }
        Ok(field)
    }

    fn nested_list_config(&self, key: &str) -> EntryResult<NestedSchemaConfig> {
        match &self.field(key)?.kind {
            FieldKind::NestedSchema(cfg) if cfg.is_multiple => Ok(cfg.clone()),
            _ => Err(EntryError::NotNestedList(key.to_string())),
        }
    }

    fn list_item(&self, key: &str, index: usize) -> EntryResult<&Value> {
        self.form_data
            .get(key)
            .and_then(Value::as_array)
            .and_then(|items| items.get(index))
            .ok_or_else(|| EntryError::ItemOutOfRange {
                key: key.to_string(),
                index,
            })
    }

    fn list_mut(&mut self, key: &str) -> EntryResult<&mut Vec<Value>> {
        let slot = self.form_data.slot_mut(key);
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        slot.as_array_mut()
            .ok_or_else(|| EntryError::NotNestedList(key.to_string()))
    }

    fn apply_edits(&mut self, edits: Vec<NestedEdit>) -> usize {
        let mut applied = 0;
        for edit in edits {
            let slot = self
                .form_data
                .get_mut(&edit.key)
                .and_then(Value::as_array_mut)
                .and_then(|items| items.get_mut(edit.index));
            match slot {
                Some(item) => {
                    *item = edit.value;
                    applied += 1;
                }
                None => debug!(key = %edit.key, index = edit.index, "dropped edit for missing item"),
            }
        }
        applied
    }
}

fn slug_source(field: &FieldDefinition) -> Option<&str> {
    match &field.kind {
        FieldKind::Slug(cfg) => cfg.source_field.as_deref(),
        _ => None,
    }
}

/// A stored slug that no longer matches its source was typed by hand.
fn slug_was_edited(field: &FieldDefinition, record: &FormRecord) -> bool {
    let Some(source) = slug_source(field) else {
        return false;
    };
    match record.get_str(&field.key) {
        Some(slug) if !slug.is_empty() => {
            slug != derive_slug(record.get_str(source).unwrap_or_default())
        }
        _ => false,
    }
}
