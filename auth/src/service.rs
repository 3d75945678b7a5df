//! Registration, login and token verification.

use crate::error::{AuthError, Result};
use crate::password::PasswordHasher;
use crate::session::{Session, SessionId, SessionStore};
use crate::user::{User, UserId, UserRepository};
use chrono::Duration;
use experiences_core::Clock;
use std::sync::Arc;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    /// Bearer token for subsequent requests
    pub token: String,
    /// Seconds until the token stops being accepted
    pub expires_in: u64,
    /// The stored session
    pub session: Session,
}

/// Account and session operations.
///
/// Password hashing runs on the blocking pool so request workers are not
/// stalled by the configured bcrypt cost.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
}

impl AuthService {
    /// Create a service over the given stores.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        hasher: PasswordHasher,
        clock: Arc<dyn Clock>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            clock,
            session_ttl,
        }
    }

    /// Session lifetime in whole seconds.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn session_ttl_secs(&self) -> u64 {
        self.session_ttl.num_seconds().max(0) as u64
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingCredentials` if username or password is blank
    /// - `AuthError::UsernameTaken` if the username exists
    /// - storage errors from the repository
    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let hasher = self.hasher;
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::InternalError(format!("Password hashing task failed: {e}")))??;

        let user = User {
            id: UserId::new(),
            username: username.to_string(),
            password_hash,
            created_at: self.clock.now(),
        };
        self.users.create_user(&user).await?;

        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Check credentials and open a session.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingCredentials` if username or password is blank
    /// - `AuthError::InvalidCredentials` for an unknown user or wrong password
    /// - storage errors from either store
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginGrant> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = self.users.find_by_username(username).await?;

        let hasher = self.hasher;
        let password = password.to_string();
        let stored = user.as_ref().map(|u| u.password_hash.clone());
        let matches = tokio::task::spawn_blocking(move || match stored {
            Some(stored) => hasher.verify(&password, &stored),
            // Unknown usernames pay for a full hash too.
            None => hasher.hash(&password).map(|_| false),
        })
        .await
        .map_err(|e| AuthError::InternalError(format!("Password check task failed: {e}")))??;

        let Some(user) = user.filter(|_| matches) else {
            return Err(AuthError::InvalidCredentials);
        };

        let now = self.clock.now();
        let session = Session {
            session_id: SessionId::new(),
            user_id: user.id,
            username: user.username,
            created_at: now,
            expires_at: now + self.session_ttl,
        };
        self.sessions
            .create_session(&session, self.session_ttl)
            .await?;

        tracing::info!(user_id = %session.user_id, "Opened session");
        Ok(LoginGrant {
            token: session.session_id.to_string(),
            expires_in: self.session_ttl_secs(),
            session,
        })
    }

    /// Resolve a bearer token to its live session.
    ///
    /// # Errors
    ///
    /// - `AuthError::SessionNotFound` for a token we never issued
    /// - `AuthError::SessionExpired` once the TTL has passed
    /// - storage errors from the session store
    pub async fn authenticate(&self, token: &str) -> Result<Session> {
        let session_id: SessionId = token.parse()?;
        let session = self.sessions.get_session(session_id).await?;

        if session.is_expired(self.clock.now()) {
            self.sessions.delete_session(session_id).await?;
            return Err(AuthError::SessionExpired);
        }

        Ok(session)
    }

    /// Drop the session behind a token.
    ///
    /// # Errors
    ///
    /// Returns storage errors from the session store.
    pub async fn logout(&self, token: &str) -> Result<()> {
        let session_id: SessionId = token.parse()?;
        self.sessions.delete_session(session_id).await
    }
}
