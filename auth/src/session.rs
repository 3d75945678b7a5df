//! Bearer sessions.

use crate::error::{AuthError, Result};
use crate::user::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque session identifier, handed to clients as the bearer token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Creates a new random `SessionId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = AuthError;

    /// Any token that is not a UUID cannot name a session.
    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| AuthError::SessionNotFound)
    }
}

/// Server-side state bound to a bearer token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session ID
    pub session_id: SessionId,
    /// Owner
    pub user_id: UserId,
    /// Owner's username
    pub username: String,
    /// When the session was issued
    pub created_at: DateTime<Utc>,
    /// When the session stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is past its expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Session store.
///
/// This trait abstracts over session storage (Redis).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create session.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network request fails
    /// - Session ID already exists
    async fn create_session(&self, session: &Session, ttl: Duration) -> Result<()>;

    /// Get session.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network request fails
    /// - Session not found → `AuthError::SessionNotFound`
    async fn get_session(&self, session_id: SessionId) -> Result<Session>;

    /// Delete session. Deleting an unknown session succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if network request fails.
    async fn delete_session(&self, session_id: SessionId) -> Result<()>;
}
