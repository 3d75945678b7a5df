//! Account endpoints.
//!
//! - POST /auth/register - Create an account
//! - POST /auth/login - Exchange credentials for a bearer token
//! - POST /auth/logout - Drop the caller's session (requires auth)

use crate::metrics;
use crate::server::{AppState, SessionUser};
use axum::{Json, extract::State, http::StatusCode};
use experiences_web::{ApiJson, AppError};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Register and login body. Missing fields are reported as 400 by the
/// account service rather than as a body error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsRequest {
    /// Account name
    pub username: Option<String>,
    /// Plain-text password
    pub password: Option<String>,
}

impl CredentialsRequest {
    fn parts(&self) -> (&str, &str) {
        (
            self.username.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
        )
    }
}

/// Registration response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Confirmation text
    pub message: &'static str,
}

/// Login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create an account.
///
/// # Errors
///
/// 400 for a blank username or password, 409 if the username is taken.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (username, password) = request.parts();
    state.auth.register(username, password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
        }),
    ))
}

/// Open a session.
///
/// # Errors
///
/// 400 for blank credentials, 401 for unknown users or wrong passwords.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (username, password) = request.parts();
    let result = state.auth.login(username, password).await;
    metrics::record_login(result.is_ok());
    let grant = result?;

    Ok(Json(LoginResponse {
        token: grant.token,
        expires_in: grant.expires_in,
    }))
}

/// Drop the caller's session.
///
/// # Errors
///
/// 403 without a live session.
pub async fn logout(
    State(state): State<AppState>,
    user: SessionUser,
) -> Result<StatusCode, AppError> {
    state.auth.logout(&user.token).await?;
    tracing::info!(user_id = %user.session.user_id, "Session closed");
    Ok(StatusCode::NO_CONTENT)
}
