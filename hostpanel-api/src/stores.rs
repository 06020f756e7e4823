//! [`SchemaStore`] and [`EntryStore`] backed by the REST client.
//!
//! API failures become [`StoreError`]s carrying the banner message.

use crate::client::ApiClient;
use async_trait::async_trait;
use hostpanel_entry::{Entry, EntryStore, FormRecord};
use hostpanel_schema::{FieldDefinition, SchemaStore, StoreError};
use hostpanel_types::{CollectionId, EntryId};

/// Saves one collection's field list.
#[derive(Debug, Clone)]
pub struct CollectionSchemaStore {
    client: ApiClient,
    collection_id: CollectionId,
}

impl CollectionSchemaStore {
    pub fn new(client: ApiClient, collection_id: CollectionId) -> Self {
        Self {
            client,
            collection_id,
        }
    }
}

#[async_trait]
impl SchemaStore for CollectionSchemaStore {
    async fn save_fields(
        &self,
        fields: Vec<FieldDefinition>,
    ) -> Result<Vec<FieldDefinition>, StoreError> {
        let collection = self
            .client
            .update_collection_fields(self.collection_id, &fields)
            .await?;
        Ok(collection.fields)
    }
}

#[derive(Debug, Clone)]
pub struct CollectionEntryStore {
    client: ApiClient,
}

impl CollectionEntryStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EntryStore for CollectionEntryStore {
    async fn save_draft(&self, entry_id: EntryId, data: FormRecord) -> Result<Entry, StoreError> {
        Ok(self.client.save_entry_draft(entry_id, &data).await?)
    }

    async fn publish(&self, entry_id: EntryId) -> Result<Entry, StoreError> {
        Ok(self.client.publish_entry(entry_id).await?)
    }

    async fn unpublish(&self, entry_id: EntryId) -> Result<Entry, StoreError> {
        Ok(self.client.unpublish_entry(entry_id).await?)
    }
}
