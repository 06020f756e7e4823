use crate::record::FormRecord;
use chrono::{DateTime, Utc};
use hostpanel_types::{CollectionId, EntryId};
use serde::{Deserialize, Serialize};

/// One record of a collection.
///
/// `data` is what the live site serves; `data_draft` is the working copy
/// the editor saves into. Publishing copies the draft to `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub collection_id: CollectionId,
    #[serde(default)]
    pub data: FormRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_draft: Option<FormRecord>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Where an entry sits in the draft/publish cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationState {
    /// Never published, or unpublished.
    Draft,
    /// Live, and the draft holds edits the live payload lacks.
    PublishedWithChanges,
    /// Live, and the draft matches the live payload.
    Published,
}

impl Entry {
    /// A new, empty, unpublished entry.
    pub fn new(collection_id: CollectionId) -> Self {
        Self {
            id: EntryId::new(),
            collection_id,
            data: FormRecord::new(),
            data_draft: None,
            published: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// True when a non-empty draft exists.
    pub fn has_draft(&self) -> bool {
        self.data_draft.as_ref().is_some_and(|d| !d.is_empty())
    }

    /// True when the draft differs from the live payload.
    pub fn has_draft_changes(&self) -> bool {
        self.data_draft
            .as_ref()
            .is_some_and(|d| !d.is_empty() && d != &self.data)
    }

    pub fn publication_state(&self) -> PublicationState {
        match (self.published, self.has_draft_changes()) {
            (false, _) => PublicationState::Draft,
            (true, true) => PublicationState::PublishedWithChanges,
            (true, false) => PublicationState::Published,
        }
    }

    /// The payload an editor should start from: the draft if one exists,
    /// otherwise the live data.
    pub fn working_record(&self) -> FormRecord {
        match &self.data_draft {
            Some(draft) if !draft.is_empty() => draft.clone(),
            _ => self.data.clone(),
        }
    }
}
