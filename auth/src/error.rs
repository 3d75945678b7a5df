//! Error types for account and session operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of registration, login and token verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Username or password was blank.
    #[error("Username and password are required")]
    MissingCredentials,

    /// Another account already uses the username.
    #[error("Username already taken")]
    UsernameTaken,

    /// Unknown username or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token is not a session id we issued.
    #[error("Invalid or expired token")]
    SessionNotFound,

    /// Session outlived its TTL.
    #[error("Invalid or expired token")]
    SessionExpired,

    /// Stored password hash could not be parsed.
    #[error("Malformed password hash")]
    MalformedHash,

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Session encoding failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Returns `true` if the caller presented no usable session.
    ///
    /// # Examples
    ///
    /// ```
    /// # use experiences_auth::AuthError;
    /// assert!(AuthError::SessionExpired.is_session_error());
    /// assert!(!AuthError::InvalidCredentials.is_session_error());
    /// ```
    #[must_use]
    pub const fn is_session_error(&self) -> bool {
        matches!(self, Self::SessionNotFound | Self::SessionExpired)
    }

    /// Returns `true` for failures caused by the backing services rather
    /// than by the caller.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::MalformedHash
                | Self::DatabaseError(_)
                | Self::SerializationError(_)
                | Self::InternalError(_)
        )
    }
}
