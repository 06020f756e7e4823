//! Authenticated session state.
//!
//! The session is an explicit object injected into [`crate::ApiClient`]
//! rather than ambient global state. Refresh runs while the session lock is
//! held, so concurrent callers that find an expired access token wait for
//! the one in-flight refresh and then read its result.

use crate::error::{ApiError, ApiResult, StatusKind};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Lifetime of an access token.
pub const ACCESS_TOKEN_TTL: TimeDelta = TimeDelta::minutes(15);

/// Lifetime of a refresh token.
pub const REFRESH_TOKEN_TTL: TimeDelta = TimeDelta::days(7);

/// An access token this close to expiry is refreshed before use.
const EXPIRY_SKEW: TimeDelta = TimeDelta::seconds(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Client,
}

impl Role {
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl TokenPair {
    /// A freshly issued pair with the standard lifetimes.
    pub fn issued(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            access_expires_at: now + ACCESS_TOKEN_TTL,
            refresh_expires_at: now + REFRESH_TOKEN_TTL,
        }
    }

    pub fn access_expired(&self, now: DateTime<Utc>) -> bool {
        now + EXPIRY_SKEW >= self.access_expires_at
    }

    pub fn refresh_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.refresh_expires_at
    }
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub tokens: TokenPair,
}

/// Exchanges a refresh token for a new pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh_tokens(&self, current: &TokenPair) -> ApiResult<TokenPair>;
}

/// Owns the current session and coordinates token refresh.
#[derive(Debug, Default)]
pub struct SessionManager {
    session: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    pub async fn set(&self, session: Session) {
        debug!(user_id = %session.user_id, role = ?session.role, "session set");
        *self.session.lock().await = Some(session);
    }

    pub async fn clear(&self) {
        *self.session.lock().await = None;
    }

    pub async fn current(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Returns a usable access token, refreshing it first if it has expired.
    ///
    /// A session whose refresh token has expired, or whose refresh is
    /// rejected with 401, is cleared and reported as
    /// [`ApiError::SessionExpired`].
    pub async fn access_token(&self, refresher: &dyn TokenRefresher) -> ApiResult<String> {
        let mut guard = self.session.lock().await;
        let Some(session) = guard.as_mut() else {
            return Err(ApiError::AuthRequired);
        };

        let now = Utc::now();
        if !session.tokens.access_expired(now) {
            return Ok(session.tokens.access_token.clone());
        }
        if session.tokens.refresh_expired(now) {
            warn!(user_id = %session.user_id, "refresh token expired, signing out");
            *guard = None;
            return Err(ApiError::SessionExpired);
        }

        debug!(user_id = %session.user_id, "access token expired, refreshing");
        let current = session.tokens.clone();
        match refresher.refresh_tokens(&current).await {
            Ok(tokens) => {
                info!(user_id = %session.user_id, "access token refreshed");
                let token = tokens.access_token.clone();
                session.tokens = tokens;
                Ok(token)
            }
            Err(ApiError::Status {
                kind: StatusKind::Unauthorized,
                ..
            }) => {
                warn!("refresh rejected, signing out");
                *guard = None;
                Err(ApiError::SessionExpired)
            }
            Err(e) => {
                warn!("token refresh failed: {e}");
                Err(e)
            }
        }
    }
}
