//! Authenticated-session extractor.
//!
//! ```rust,ignore
//! async fn handler(user: SessionUser) -> Result<String, AppError> {
//!     Ok(user.session.username)
//! }
//! ```

use super::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use experiences_auth::Session;
use experiences_web::{AppError, BearerToken};

/// Caller with a live session.
///
/// Rejects with 403 when the bearer token is missing, unknown or expired.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// The presented bearer token
    pub token: String,
    /// The session it resolves to
    pub session: Session,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let session = state.auth.authenticate(&token).await?;
        Ok(Self { token, session })
    }
}
