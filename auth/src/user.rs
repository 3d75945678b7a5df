//! Accounts and the user repository trait.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Creates a new random `UserId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// User ID
    pub id: UserId,
    /// Unique login name
    pub username: String,
    /// Encoded salted hash, see [`crate::PasswordHasher`]
    pub password_hash: String,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

/// User repository.
///
/// Implemented by the PostgreSQL crate and by
/// [`crate::mocks::MockUserRepository`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Username already exists → `AuthError::UsernameTaken`
    /// - Database query fails
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Look up a user by exact username.
    ///
    /// # Errors
    ///
    /// Returns error if database query fails.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}
