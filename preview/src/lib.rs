//! HTTP API for previewing hostpanel content.
//!
//! Serves the field type catalog, validates and renders entry data against
//! a field list, and exports campaigns to email HTML.

use axum::{
    extract::State,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use hostpanel_campaign::{render_html, Campaign};
use hostpanel_entry::{validate_record, FieldRenderer, FormRecord, RenderedField, ValidationErrors};
use hostpanel_schema::{EditorSection, FieldDefinition, FieldType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// One entry of the field type catalog.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldTypeInfo {
    #[serde(rename = "type")]
    pub type_name: String,
    /// Allowed inside a nested schema.
    pub nestable: bool,
    /// Editor sections, in display order.
    pub sections: Vec<String>,
}

impl FieldTypeInfo {
    fn of(field_type: FieldType) -> Self {
        Self {
            type_name: field_type.as_str().to_string(),
            nestable: field_type.is_nestable(),
            sections: EditorSection::for_type(field_type)
                .into_iter()
                .filter_map(|s| serde_json::to_value(s).ok())
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct EntryRequest {
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub data: FormRecord,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValidateResponse {
    pub valid: bool,
    pub errors: ValidationErrors,
}

/// Shared router state.
#[derive(Default)]
pub struct PreviewState {
    pub renderer: FieldRenderer,
}

async fn field_types_handler() -> Json<Vec<FieldTypeInfo>> {
    Json(FieldType::ALL.into_iter().map(FieldTypeInfo::of).collect())
}

async fn render_campaign_handler(Json(campaign): Json<Campaign>) -> Html<String> {
    debug!(
        sections = campaign.sections.len(),
        elements = campaign.elements.len(),
        "rendering campaign"
    );
    Html(render_html(&campaign))
}

async fn validate_entry_handler(Json(request): Json<EntryRequest>) -> Json<ValidateResponse> {
    let errors = validate_record(&request.fields, &request.data);
    Json(ValidateResponse {
        valid: errors.is_empty(),
        errors,
    })
}

/// Widgets for the data, with validation errors attached inline.
async fn render_entry_handler(
    State(state): State<Arc<PreviewState>>,
    Json(request): Json<EntryRequest>,
) -> Json<Vec<RenderedField>> {
    let errors = validate_record(&request.fields, &request.data);
    Json(
        state
            .renderer
            .render(&request.fields, &request.data, &errors, None),
    )
}

/// Build the HTTP API router with the given state.
pub fn build_router(state: Arc<PreviewState>) -> Router {
    Router::new()
        .route("/api/v1/field-types", get(field_types_handler))
        .route("/api/v1/campaigns/render", post(render_campaign_handler))
        .route("/api/v1/entries/validate", post(validate_entry_handler))
        .route("/api/v1/entries/render", post(render_entry_handler))
        .with_state(state)
}
