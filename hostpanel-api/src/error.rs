//! REST client error types.

use hostpanel_schema::StoreError;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Category of a non-success HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Gone,
    Server,
    Other,
}

impl StatusKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => StatusKind::BadRequest,
            401 => StatusKind::Unauthorized,
            403 => StatusKind::Forbidden,
            404 => StatusKind::NotFound,
            409 => StatusKind::Conflict,
            410 => StatusKind::Gone,
            500..=599 => StatusKind::Server,
            _ => StatusKind::Other,
        }
    }

    /// Message shown when the server did not send one.
    pub const fn fallback_message(&self) -> &'static str {
        match self {
            StatusKind::BadRequest => "The request was invalid",
            StatusKind::Unauthorized => "Your session has expired, please sign in again",
            StatusKind::Forbidden => "You do not have permission to do that",
            StatusKind::NotFound => "The requested item could not be found",
            StatusKind::Conflict => "This item was changed elsewhere",
            StatusKind::Gone => "This item is no longer available",
            StatusKind::Server => "Something went wrong on our end, please try again",
            StatusKind::Other => "The request failed, please try again",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusKind::BadRequest => "bad request",
            StatusKind::Unauthorized => "unauthorized",
            StatusKind::Forbidden => "forbidden",
            StatusKind::NotFound => "not found",
            StatusKind::Conflict => "conflict",
            StatusKind::Gone => "gone",
            StatusKind::Server => "server error",
            StatusKind::Other => "unexpected status",
        };
        f.write_str(name)
    }
}

/// Errors that can occur talking to the CMS API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{kind} ({status}): {message}")]
    Status {
        kind: StatusKind,
        status: u16,
        message: String,
    },

    #[error("authentication required")]
    AuthRequired,

    #[error("session expired")]
    SessionExpired,

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Builds a status error from a response body, preferring the server's
    /// `message` field.
    pub fn from_response(status: u16, body: &str) -> Self {
        let kind = StatusKind::from_status(status);
        let message = server_message(body).unwrap_or_else(|| kind.fallback_message().to_string());
        ApiError::Status {
            kind,
            status,
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::Status {
                kind: StatusKind::NotFound,
                ..
            }
        )
    }

    /// Text for a general error banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::AuthRequired | ApiError::SessionExpired => {
                StatusKind::Unauthorized.fallback_message().to_string()
            }
            ApiError::AuthFailed(message) => message.clone(),
            ApiError::Http(_) => "Could not reach the server, please try again".to_string(),
            ApiError::Serialization(_) | ApiError::Config(_) => {
                StatusKind::Other.fallback_message().to_string()
            }
        }
    }
}

impl From<ApiError> for StoreError {
    fn from(err: ApiError) -> Self {
        StoreError::new(err.user_message())
    }
}

/// Error bodies carry `message` as a string or a list of strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum MessageField {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<MessageField>,
}

fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let message = match parsed.message? {
        MessageField::One(message) => message,
        MessageField::Many(messages) => messages.join("; "),
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}
