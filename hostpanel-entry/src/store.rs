use crate::entry::Entry;
use crate::record::FormRecord;
use async_trait::async_trait;
use hostpanel_schema::StoreError;
use hostpanel_types::EntryId;

/// Persists entry drafts and publication state.
///
/// Every call returns the entry as the server now holds it.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Stores `data` as the entry's working draft.
    async fn save_draft(&self, entry_id: EntryId, data: FormRecord) -> Result<Entry, StoreError>;

    /// Copies the draft to the live payload and marks the entry published.
    async fn publish(&self, entry_id: EntryId) -> Result<Entry, StoreError>;

    /// Takes the entry offline; the draft is kept.
    async fn unpublish(&self, entry_id: EntryId) -> Result<Entry, StoreError>;
}
