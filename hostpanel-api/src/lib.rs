//! REST client for the hostpanel CMS API.
//!
//! - [`ApiClient`]: typed calls for collections and entries
//! - [`SessionManager`]: the injected session with single-flight token
//!   refresh
//! - [`CollectionSchemaStore`] / [`CollectionEntryStore`]: the schema and
//!   entry persistence collaborators backed by the client
//!
//! Non-success responses map to [`ApiError::Status`] with the server's
//! message or a per-status fallback.

mod client;
mod config;
mod error;
mod model;
mod session;
mod stores;

pub use client::{ApiClient, ORG_USER_HEADER};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, StatusKind};
pub use model::Collection;
pub use session::{
    Role, Session, SessionManager, TokenPair, TokenRefresher, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL,
};
pub use stores::{CollectionEntryStore, CollectionSchemaStore};
