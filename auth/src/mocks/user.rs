//! Mock user repository for testing.

use crate::error::{AuthError, Result};
use crate::user::{User, UserRepository};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock user repository.
///
/// Uses in-memory storage keyed by username.
#[derive(Debug, Clone, Default)]
pub struct MockUserRepository {
    users_by_username: Arc<Mutex<HashMap<String, User>>>,
}

impl MockUserRepository {
    /// Create a new mock user repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self
            .users_by_username
            .lock()
            .map_err(|_| AuthError::InternalError("Mutex lock failed".to_string()))?;

        if users.contains_key(&user.username) {
            return Err(AuthError::UsernameTaken);
        }

        users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users_by_username
            .lock()
            .map_err(|_| AuthError::InternalError("Mutex lock failed".to_string()))?
            .get(username)
            .cloned())
    }
}
