//! Cookie sessions.
//!
//! `POST /login` issues a random token kept in memory; restarting the
//! service logs everybody out.

use crate::errors::AppError;
use crate::server::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "rtt_session";

#[derive(Debug, Clone)]
struct SessionEntry {
    username: String,
    issued_at: DateTime<Utc>,
}

pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// New token for `username`. Expired tokens are purged on the way.
    pub fn create(&self, username: &str, now: DateTime<Utc>) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let mut map = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        let ttl = self.ttl;
        map.retain(|_, s| now - s.issued_at < ttl);
        map.insert(
            token.clone(),
            SessionEntry {
                username: username.to_string(),
                issued_at: now,
            },
        );
        token
    }

    /// Username behind a live token.
    pub fn resolve(&self, token: &str, now: DateTime<Utc>) -> Option<String> {
        let map = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        map.get(token)
            .filter(|s| now - s.issued_at < self.ttl)
            .map(|s| s.username.clone())
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }
}

/// Value of the session cookie, if the request carries one.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
        })
}

/// The logged-in user; requests without a live session get `401`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AppError::Unauthenticated)?;
        let now = state.tracker.clock().now();

        state
            .sessions
            .resolve(token, now)
            .map(AuthUser)
            .ok_or(AppError::Unauthenticated)
    }
}

