//! CMS REST client.

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult, StatusKind};
use crate::model::{
    Collection, DraftBody, FieldsBody, LoginBody, LoginResponse, RefreshBody, RefreshResponse,
};
use crate::session::{Session, SessionManager, TokenPair, TokenRefresher};
use async_trait::async_trait;
use chrono::Utc;
use hostpanel_entry::{Entry, FormRecord};
use hostpanel_schema::FieldDefinition;
use hostpanel_types::{CollectionId, EntryId};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Header that scopes wallet and billing calls to an organization member.
pub const ORG_USER_HEADER: &str = "x-org-user-id";

/// Typed client for the collection and entry endpoints.
///
/// Cloning is cheap; clones share the HTTP pool and the session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Arc<ApiConfig>,
    http: Client,
    session: Arc<SessionManager>,
    org_user_id: Option<String>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: Arc<SessionManager>) -> ApiResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::Config("base URL is empty".to_string()));
        }
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            config: Arc::new(config),
            http: builder.build()?,
            session,
            org_user_id: None,
        })
    }

    /// Sends `x-org-user-id` on every authenticated request.
    pub fn with_org_user(mut self, org_user_id: impl Into<String>) -> Self {
        self.org_user_id = Some(org_user_id.into());
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    // ---- auth ----

    /// Signs in with credentials and stores the resulting session.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        let request = self
            .http
            .post(self.config.url("auth/login"))
            .json(&LoginBody { email, password });
        let response: LoginResponse = match self.execute(request).await {
            Err(ApiError::Status {
                kind: StatusKind::Unauthorized,
                message,
                ..
            }) => return Err(ApiError::AuthFailed(message)),
            other => other?,
        };
        let session = Session {
            user_id: response.user.id,
            role: response.user.role,
            tokens: TokenPair::issued(response.access_token, response.refresh_token, Utc::now()),
        };
        self.session.set(session.clone()).await;
        info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }

    pub async fn logout(&self) {
        self.session.clear().await;
        info!("signed out");
    }

    // ---- collections ----

    pub async fn list_collections(&self) -> ApiResult<Vec<Collection>> {
        let request = self.authorized(Method::GET, "cms/collections").await?;
        self.execute(request).await
    }

    pub async fn get_collection(&self, id: CollectionId) -> ApiResult<Collection> {
        let request = self
            .authorized(Method::GET, &format!("cms/collections/{id}"))
            .await?;
        self.execute(request).await
    }

    /// Replaces a collection's field list; returns the collection as stored.
    pub async fn update_collection_fields(
        &self,
        id: CollectionId,
        fields: &[FieldDefinition],
    ) -> ApiResult<Collection> {
        let request = self
            .authorized(Method::PUT, &format!("cms/collections/{id}/fields"))
            .await?
            .json(&FieldsBody { fields });
        let collection: Collection = self.execute(request).await?;
        info!(collection_id = %id, fields = collection.fields.len(), "collection fields saved");
        Ok(collection)
    }

    // ---- entries ----

    pub async fn list_entries(&self, collection_id: CollectionId) -> ApiResult<Vec<Entry>> {
        let request = self
            .authorized(Method::GET, &format!("cms/collections/{collection_id}/entries"))
            .await?;
        self.execute(request).await
    }

    /// Creates an unpublished entry holding `data` as its draft.
    pub async fn create_entry(
        &self,
        collection_id: CollectionId,
        data: &FormRecord,
    ) -> ApiResult<Entry> {
        let request = self
            .authorized(Method::POST, &format!("cms/collections/{collection_id}/entries"))
            .await?
            .json(&DraftBody { data_draft: data });
        let entry: Entry = self.execute(request).await?;
        info!(entry_id = %entry.id, %collection_id, "entry created");
        Ok(entry)
    }

    pub async fn get_entry(&self, id: EntryId) -> ApiResult<Entry> {
        let request = self
            .authorized(Method::GET, &format!("cms/entries/{id}"))
            .await?;
        self.execute(request).await
    }

    pub async fn save_entry_draft(&self, id: EntryId, data: &FormRecord) -> ApiResult<Entry> {
        let request = self
            .authorized(Method::PATCH, &format!("cms/entries/{id}/draft"))
            .await?
            .json(&DraftBody { data_draft: data });
        self.execute(request).await
    }

    pub async fn publish_entry(&self, id: EntryId) -> ApiResult<Entry> {
        let request = self
            .authorized(Method::POST, &format!("cms/entries/{id}/publish"))
            .await?;
        self.execute(request).await
    }

    pub async fn unpublish_entry(&self, id: EntryId) -> ApiResult<Entry> {
        let request = self
            .authorized(Method::POST, &format!("cms/entries/{id}/unpublish"))
            .await?;
        self.execute(request).await
    }

    pub async fn delete_entry(&self, id: EntryId) -> ApiResult<()> {
        let request = self
            .authorized(Method::DELETE, &format!("cms/entries/{id}"))
            .await?;
        self.send(request).await?;
        info!(entry_id = %id, "entry deleted");
        Ok(())
    }

    // ---- transport ----

    /// A request carrying the bearer token and, when set, the org header.
    async fn authorized(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let token = self.session.access_token(self).await?;
        let mut request = self
            .http
            .request(method, self.config.url(path))
            .bearer_auth(token);
        if let Some(org_user_id) = &self.org_user_id {
            request = request.header(ORG_USER_HEADER, org_user_id);
        }
        Ok(request)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.send(request).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "API response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &body);
        warn!("API request failed: {err}");
        Err(err)
    }
}

#[async_trait]
impl TokenRefresher for ApiClient {
    async fn refresh_tokens(&self, current: &TokenPair) -> ApiResult<TokenPair> {
        let request = self
            .http
            .post(self.config.url("auth/refresh"))
            .json(&RefreshBody {
                refresh_token: &current.refresh_token,
            });
        let response: RefreshResponse = self.execute(request).await?;
        let now = Utc::now();
        Ok(match response.refresh_token {
            Some(refresh_token) => TokenPair::issued(response.access_token, refresh_token, now),
            None => TokenPair {
                access_token: response.access_token,
                refresh_token: current.refresh_token.clone(),
                access_expires_at: now + crate::session::ACCESS_TOKEN_TTL,
                refresh_expires_at: current.refresh_expires_at,
            },
        })
    }
}
