//! Account storage for `experiences-auth`.

use async_trait::async_trait;
use experiences_auth::{AuthError, Result, User, UserId, UserRepository};
use sqlx::{PgPool, Row};

const USERNAME_CONSTRAINT: &str = "users_username_key";

/// [`UserRepository`] backed by the `users` table.
#[derive(Clone, Debug)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Share an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, fields(username = %user.username))]
    async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(user.id.0)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(USERNAME_CONSTRAINT) =>
            {
                AuthError::UsernameTaken
            }
            _ => AuthError::DatabaseError(e.to_string()),
        })?;

        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        row.map(|row| -> std::result::Result<User, sqlx::Error> {
            Ok(User {
                id: UserId(row.try_get("id")?),
                username: row.try_get("username")?,
                password_hash: row.try_get("password_hash")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .transpose()
        .map_err(|e| AuthError::DatabaseError(e.to_string()))
    }
}
