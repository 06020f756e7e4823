use hostpanel_api::{
    ApiClient, ApiConfig, ApiError, Role, Session, SessionManager, StatusKind, TokenPair,
    ORG_USER_HEADER,
};
use chrono::{TimeDelta, Utc};
use hostpanel_entry::FormRecord;
use hostpanel_schema::{FieldDefinition, FieldKind, StoreError};
use hostpanel_types::{CollectionId, EntryId};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session(access_valid_for: TimeDelta) -> Session {
    let now = Utc::now();
    Session {
        user_id: "user-1".to_string(),
        role: Role::Client,
        tokens: TokenPair {
            access_token: "access-1".to_string(),
            refresh_token: "refresh-1".to_string(),
            access_expires_at: now + access_valid_for,
            refresh_expires_at: now + TimeDelta::days(7),
        },
    }
}

fn mock_config(server: &MockServer) -> ApiConfig {
    ApiConfig::new(format!("{}/api/v1", server.uri()))
}

fn signed_in_client(server: &MockServer) -> ApiClient {
    let manager = Arc::new(SessionManager::with_session(session(TimeDelta::minutes(10))));
    ApiClient::new(mock_config(server), manager).unwrap()
}

fn entry_json(id: EntryId, collection_id: CollectionId, published: bool) -> Value {
    json!({
        "id": id.to_string(),
        "collectionId": collection_id.to_string(),
        "data": { "title": "Live" },
        "dataDraft": { "title": "Draft" },
        "published": published,
    })
}

fn record(value: Value) -> FormRecord {
    FormRecord::from_value(value).unwrap()
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn config_default_leaves_timeout_to_transport() {
    let cfg = ApiConfig::default();
    assert_eq!(cfg.base_url, "http://localhost:4000/api/v1");
    assert!(cfg.timeout_secs.is_none());
    assert!(cfg.user_agent.starts_with("hostpanel/"));
}

#[test]
fn config_serde_roundtrip() {
    let cfg = ApiConfig {
        timeout_secs: Some(20),
        ..ApiConfig::new("https://cms.test/api/v1")
    };
    let json = serde_json::to_value(&cfg).unwrap();
    assert_eq!(json["baseUrl"], json!("https://cms.test/api/v1"));
    assert_eq!(json["timeoutSecs"], json!(20));
    let back: ApiConfig = serde_json::from_value(json).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn empty_base_url_is_rejected() {
    let err = ApiClient::new(ApiConfig::new("  "), Arc::new(SessionManager::new())).unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
}

// ── Error mapping ───────────────────────────────────────────────

#[test]
fn status_kinds_cover_declared_codes() {
    assert_eq!(StatusKind::from_status(400), StatusKind::BadRequest);
    assert_eq!(StatusKind::from_status(401), StatusKind::Unauthorized);
    assert_eq!(StatusKind::from_status(403), StatusKind::Forbidden);
    assert_eq!(StatusKind::from_status(404), StatusKind::NotFound);
    assert_eq!(StatusKind::from_status(409), StatusKind::Conflict);
    assert_eq!(StatusKind::from_status(410), StatusKind::Gone);
    assert_eq!(StatusKind::from_status(500), StatusKind::Server);
    assert_eq!(StatusKind::from_status(418), StatusKind::Other);
}

#[test]
fn server_message_is_preferred() {
    let err = ApiError::from_response(409, r#"{"message":"Slug already taken"}"#);
    assert_eq!(err.user_message(), "Slug already taken");
    assert_eq!(err.status(), Some(409));
}

#[test]
fn message_lists_are_joined() {
    let err = ApiError::from_response(400, r#"{"message":["title is required","slug too long"]}"#);
    assert_eq!(err.user_message(), "title is required; slug too long");
}

#[test]
fn missing_message_falls_back_per_kind() {
    let err = ApiError::from_response(404, "<html>not json</html>");
    assert!(err.is_not_found());
    assert_eq!(
        err.user_message(),
        StatusKind::NotFound.fallback_message()
    );
    let blank = ApiError::from_response(500, r#"{"message":"  "}"#);
    assert_eq!(blank.user_message(), StatusKind::Server.fallback_message());
}

#[test]
fn api_errors_become_store_errors() {
    let err: StoreError = ApiError::from_response(403, r#"{"message":"Nope"}"#).into();
    assert_eq!(err.message, "Nope");
    let err: StoreError = ApiError::AuthRequired.into();
    assert_eq!(err.message, StatusKind::Unauthorized.fallback_message());
}

// ── Login ───────────────────────────────────────────────────────

#[tokio::test]
async fn login_stores_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({ "email": "a@b.test", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "acc",
            "refreshToken": "ref",
            "user": { "id": "u-9", "role": "super_admin" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = Arc::new(SessionManager::new());
    let client = ApiClient::new(mock_config(&server), manager.clone()).unwrap();
    let session = client.login("a@b.test", "pw").await.unwrap();

    assert_eq!(session.user_id, "u-9");
    assert!(session.role.is_super_admin());
    assert_eq!(session.tokens.access_token, "acc");
    let stored = manager.current().await.unwrap();
    assert_eq!(stored, session);
    assert_eq!(
        stored.tokens.refresh_expires_at - stored.tokens.access_expires_at,
        TimeDelta::days(7) - TimeDelta::minutes(15)
    );
}

#[tokio::test]
async fn bad_credentials_are_auth_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let manager = Arc::new(SessionManager::new());
    let client = ApiClient::new(mock_config(&server), manager.clone()).unwrap();
    let err = client.login("a@b.test", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::AuthFailed(ref m) if m == "Invalid credentials"));
    assert!(!manager.is_signed_in().await);
}

#[tokio::test]
async fn logout_clears_session() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server);
    client.logout().await;
    assert!(matches!(
        client.list_collections().await,
        Err(ApiError::AuthRequired)
    ));
}

#[tokio::test]
async fn calls_without_session_never_reach_the_server() {
    let server = MockServer::start().await;
    let client = ApiClient::new(mock_config(&server), Arc::new(SessionManager::new())).unwrap();
    let err = client.list_collections().await.unwrap_err();
    assert!(matches!(err, ApiError::AuthRequired));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Collections ─────────────────────────────────────────────────

#[tokio::test]
async fn get_collection_sends_bearer_and_parses_fields() {
    let server = MockServer::start().await;
    let id = CollectionId::new();
    let field = FieldDefinition::new("Title", "title", FieldKind::ShortText).required();
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/cms/collections/{id}")))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id.to_string(),
            "name": "Posts",
            "slug": "posts",
            "fields": [serde_json::to_value(&field).unwrap()],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let collection = signed_in_client(&server).get_collection(id).await.unwrap();
    assert_eq!(collection.name, "Posts");
    assert_eq!(collection.fields, vec![field]);
    assert!(collection.description.is_none());
}

#[tokio::test]
async fn list_collections_sends_org_header_when_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/cms/collections"))
        .and(header(ORG_USER_HEADER, "org-user-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server).with_org_user("org-user-7");
    assert!(client.list_collections().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_fields_puts_field_list() {
    let server = MockServer::start().await;
    let id = CollectionId::new();
    let fields = vec![FieldDefinition::new("Title", "title", FieldKind::ShortText)];
    let wire = serde_json::to_value(&fields).unwrap();
    Mock::given(method("PUT"))
        .and(path(format!("/api/v1/cms/collections/{id}/fields")))
        .and(body_json(json!({ "fields": wire })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id.to_string(),
            "name": "Posts",
            "slug": "posts",
            "fields": wire,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let collection = signed_in_client(&server)
        .update_collection_fields(id, &fields)
        .await
        .unwrap();
    assert_eq!(collection.fields, fields);
}

// ── Entries ─────────────────────────────────────────────────────

#[tokio::test]
async fn create_entry_posts_draft() {
    let server = MockServer::start().await;
    let collection_id = CollectionId::new();
    let entry_id = EntryId::new();
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/cms/collections/{collection_id}/entries")))
        .and(body_json(json!({ "dataDraft": { "title": "Draft" } })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(entry_json(entry_id, collection_id, false)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let entry = signed_in_client(&server)
        .create_entry(collection_id, &record(json!({ "title": "Draft" })))
        .await
        .unwrap();
    assert_eq!(entry.id, entry_id);
    assert!(!entry.published);
}

#[tokio::test]
async fn entry_lifecycle_endpoints() {
    let server = MockServer::start().await;
    let collection_id = CollectionId::new();
    let id = EntryId::new();
    let base = format!("/api/v1/cms/entries/{id}");

    Mock::given(method("GET"))
        .and(path(base.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_json(id, collection_id, false)))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{base}/draft")))
        .and(body_json(json!({ "dataDraft": { "title": "Draft" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_json(id, collection_id, false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{base}/publish")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_json(id, collection_id, true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{base}/unpublish")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_json(id, collection_id, false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(base.clone()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server);
    let entry = client.get_entry(id).await.unwrap();
    assert_eq!(entry.working_record(), record(json!({ "title": "Draft" })));
    client
        .save_entry_draft(id, &record(json!({ "title": "Draft" })))
        .await
        .unwrap();
    assert!(client.publish_entry(id).await.unwrap().published);
    assert!(!client.unpublish_entry(id).await.unwrap().published);
    client.delete_entry(id).await.unwrap();
}

#[tokio::test]
async fn list_entries_for_collection() {
    let server = MockServer::start().await;
    let collection_id = CollectionId::new();
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/cms/collections/{collection_id}/entries")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            entry_json(EntryId::new(), collection_id, true),
            entry_json(EntryId::new(), collection_id, false),
        ])))
        .mount(&server)
        .await;

    let entries = signed_in_client(&server)
        .list_entries(collection_id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.collection_id == collection_id));
}

// ── Status errors ───────────────────────────────────────────────

#[tokio::test]
async fn not_found_carries_server_message() {
    let server = MockServer::start().await;
    let id = EntryId::new();
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/cms/entries/{id}")))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Entry not found" })),
        )
        .mount(&server)
        .await;

    let err = signed_in_client(&server).get_entry(id).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Entry not found");
}

#[tokio::test]
async fn gone_without_body_uses_fallback() {
    let server = MockServer::start().await;
    let id = EntryId::new();
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/cms/entries/{id}/publish")))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let err = signed_in_client(&server).publish_entry(id).await.unwrap_err();
    match err {
        ApiError::Status {
            kind,
            status,
            message,
        } => {
            assert_eq!(kind, StatusKind::Gone);
            assert_eq!(status, 410);
            assert_eq!(message, StatusKind::Gone.fallback_message());
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/cms/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = signed_in_client(&server).list_collections().await.unwrap_err();
    assert!(matches!(err, ApiError::Serialization(_)));
}
