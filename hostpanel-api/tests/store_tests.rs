//! The REST-backed collaborators driven through the schema manager and
//! entry form.

use chrono::{TimeDelta, Utc};
use hostpanel_api::{
    ApiClient, ApiConfig, CollectionEntryStore, CollectionSchemaStore, Role, Session,
    SessionManager, TokenPair,
};
use hostpanel_entry::{Entry, EntryForm, FormConfig};
use hostpanel_schema::{FieldDefinition, FieldKind, SchemaManager};
use hostpanel_types::CollectionId;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    let session = Session {
        user_id: "user-1".to_string(),
        role: Role::Client,
        tokens: TokenPair::issued("access-1", "refresh-1", Utc::now()),
    };
    let manager = Arc::new(SessionManager::with_session(session));
    ApiClient::new(ApiConfig::new(format!("{}/api/v1", server.uri())), manager).unwrap()
}

// ── Schema store ────────────────────────────────────────────────

#[tokio::test]
async fn schema_manager_saves_through_api() {
    let server = MockServer::start().await;
    let collection_id = CollectionId::new();
    let title = FieldDefinition::new("Title", "title", FieldKind::ShortText);
    Mock::given(method("PUT"))
        .and(path(format!("/api/v1/cms/collections/{collection_id}/fields")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": collection_id.to_string(),
            "name": "Posts",
            "slug": "posts",
            "fields": [serde_json::to_value(title.clone().at(0)).unwrap()],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = CollectionSchemaStore::new(client(&server), collection_id);
    let mut manager = SchemaManager::new(Vec::new());
    manager.add(title).unwrap();
    let saved = manager.save(&store).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert!(!manager.has_changes());
}

#[tokio::test]
async fn schema_save_failure_keeps_pending_changes() {
    let server = MockServer::start().await;
    let collection_id = CollectionId::new();
    Mock::given(method("PUT"))
        .and(path(format!("/api/v1/cms/collections/{collection_id}/fields")))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Duplicate key" })),
        )
        .mount(&server)
        .await;

    let store = CollectionSchemaStore::new(client(&server), collection_id);
    let mut manager = SchemaManager::new(Vec::new());
    manager
        .add(FieldDefinition::new("Title", "title", FieldKind::ShortText))
        .unwrap();
    let err = manager.save(&store).await.unwrap_err();
    assert!(err.to_string().contains("Duplicate key"));
    assert!(manager.has_changes());
}

// ── Entry store ─────────────────────────────────────────────────

#[tokio::test]
async fn entry_form_save_error_shows_server_message() {
    let server = MockServer::start().await;
    let entry = Entry::new(CollectionId::new());
    Mock::given(method("PATCH"))
        .and(path(format!("/api/v1/cms/entries/{}/draft", entry.id)))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "Slug already in use" })),
        )
        .mount(&server)
        .await;

    let store = CollectionEntryStore::new(client(&server));
    let fields = vec![FieldDefinition::new("Title", "title", FieldKind::ShortText)];
    let mut form = EntryForm::new(entry, fields, &FormConfig::default());
    form.set_value("title", json!("Hello")).unwrap();

    assert!(form.save(&store).await.is_err());
    assert_eq!(form.general_error(), Some("Slug already in use"));
    assert!(form.has_unsaved_changes());
}

#[tokio::test]
async fn entry_form_publish_round_trip() {
    let server = MockServer::start().await;
    let entry = Entry::new(CollectionId::new());
    let saved = json!({
        "id": entry.id.to_string(),
        "collectionId": entry.collection_id.to_string(),
        "data": {},
        "dataDraft": { "title": "Hello" },
        "published": false,
        "updatedAt": (Utc::now() - TimeDelta::seconds(1)).to_rfc3339(),
    });
    let published = json!({
        "id": entry.id.to_string(),
        "collectionId": entry.collection_id.to_string(),
        "data": { "title": "Hello" },
        "dataDraft": { "title": "Hello" },
        "published": true,
    });
    Mock::given(method("PATCH"))
        .and(path(format!("/api/v1/cms/entries/{}/draft", entry.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(saved))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/cms/entries/{}/publish", entry.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(published))
        .expect(1)
        .mount(&server)
        .await;

    let store = CollectionEntryStore::new(client(&server));
    let fields = vec![FieldDefinition::new("Title", "title", FieldKind::ShortText)];
    let mut form = EntryForm::new(entry, fields, &FormConfig::default());
    form.set_value("title", json!("Hello")).unwrap();
    form.save(&store).await.unwrap();
    assert!(!form.has_unsaved_changes());
    assert!(form.can_publish());

    let live = form.publish(&store).await.unwrap();
    assert!(live.published);
    assert!(form.general_error().is_none());
}
