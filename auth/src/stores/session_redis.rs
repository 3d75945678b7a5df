//! Redis-based session store implementation.
//!
//! Sessions are stored under `session:{session_id}` as bincode-encoded
//! [`Session`] values with a TTL equal to the session lifetime, so Redis
//! evicts them on its own.
//!
//! # Example
//!
//! ```no_run
//! use experiences_auth::stores::RedisSessionStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisSessionStore::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::session::{Session, SessionId, SessionStore};
use async_trait::async_trait;
use chrono::Duration;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// Redis-based session store with TTL-based expiration.
#[derive(Clone)]
pub struct RedisSessionStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
}

impl RedisSessionStore {
    /// Create a new Redis session store.
    ///
    /// # Errors
    ///
    /// Returns error if connection to Redis fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            AuthError::InternalError(format!("Failed to create Redis client: {e}"))
        })?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            AuthError::InternalError(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self { conn_manager })
    }

    /// Check that Redis answers.
    ///
    /// # Errors
    ///
    /// Returns error if the PING fails.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| AuthError::InternalError(format!("Redis ping failed: {e}")))?;
        Ok(())
    }

    fn session_key(session_id: SessionId) -> String {
        format!("session:{}", session_id.0)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create_session(&self, session: &Session, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let session_key = Self::session_key(session.session_id);

        let session_bytes =
            bincode::serialize(session).map_err(|e| AuthError::SerializationError(e.to_string()))?;

        #[allow(clippy::cast_sign_loss)]
        let ttl_seconds = ttl.num_seconds().max(1) as u64;

        // NX: a colliding session id must never overwrite another user's session
        let reply: Option<String> = redis::cmd("SET")
            .arg(&session_key)
            .arg(session_bytes)
            .arg("EX")
            .arg(ttl_seconds)
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(|e| AuthError::InternalError(format!("Failed to create session: {e}")))?;

        if reply.is_none() {
            return Err(AuthError::InternalError("Session ID already exists".into()));
        }

        tracing::debug!(
            session_id = %session.session_id,
            user_id = %session.user_id,
            ttl_seconds,
            "Created session in Redis"
        );

        Ok(())
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Session> {
        let mut conn = self.conn_manager.clone();
        let session_key = Self::session_key(session_id);

        let session_bytes: Option<Vec<u8>> = conn.get(&session_key).await.map_err(|e| {
            AuthError::InternalError(format!("Failed to get session from Redis: {e}"))
        })?;

        match session_bytes {
            Some(bytes) => bincode::deserialize(&bytes)
                .map_err(|e| AuthError::SerializationError(e.to_string())),
            None => Err(AuthError::SessionNotFound),
        }
    }

    async fn delete_session(&self, session_id: SessionId) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let session_key = Self::session_key(session_id);

        let _: () = conn.del(&session_key).await.map_err(|e| {
            AuthError::InternalError(format!("Failed to delete session from Redis: {e}"))
        })?;

        tracing::debug!(session_id = %session_id, "Deleted session from Redis");
        Ok(())
    }
}
