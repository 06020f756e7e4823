use chrono::{DateTime, Utc};
use hostpanel_entry::FormRecord;
use hostpanel_schema::FieldDefinition;
use hostpanel_types::CollectionId;
use serde::{Deserialize, Serialize};

/// A content collection as the API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub(crate) struct FieldsBody<'a> {
    pub fields: &'a [FieldDefinition],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DraftBody<'a> {
    pub data_draft: &'a FormRecord,
}

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshBody<'a> {
    pub refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: LoginUser,
}

#[derive(Deserialize)]
pub(crate) struct LoginUser {
    pub id: String,
    pub role: crate::session::Role,
}

/// The refresh endpoint may or may not rotate the refresh token.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}
