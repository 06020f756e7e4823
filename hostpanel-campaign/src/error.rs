//! Error types for campaign editing.

use crate::model::ElementKind;
use hostpanel_types::{ElementId, SectionId};
use thiserror::Error;

/// Result type for campaign operations.
pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("section not found: {0}")]
    SectionNotFound(SectionId),

    #[error("element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("nothing is selected")]
    NoSelection,

    #[error("unknown style property: {0}")]
    UnknownStyleProperty(String),

    #[error("'{value}' is not a valid value for {property}")]
    InvalidStyleValue { property: String, value: String },

    #[error("cannot {action} on a {kind} element")]
    WrongElementKind {
        kind: ElementKind,
        action: &'static str,
    },

    #[error("cannot move from {from} to {to}: {len} item(s)")]
    MoveOutOfRange { from: usize, to: usize, len: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
