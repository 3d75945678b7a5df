use thiserror::Error;

/// Failure modes of [`ExperiencesClient`](crate::ExperiencesClient) calls.
#[derive(Debug, Error)]
pub enum ClientError {
    // ── Session ─────────────────────────────────────────────────────
    /// An authenticated call was made without logging in.
    #[error("Not logged in")]
    NotAuthenticated,

    /// The held session passed its expiry; it has been discarded.
    #[error("Session expired -- log in again")]
    SessionExpired,

    /// The server refused the session (401/403); it has been discarded.
    #[error("Session rejected by the server -- log in again")]
    ReauthenticationRequired,

    // ── API ─────────────────────────────────────────────────────────
    /// Any other non-success response, carrying the server's message.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status
        status: u16,
        /// The server's `error` text
        message: String,
        /// The server's machine-readable code, when present
        code: Option<String>,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// Connection, TLS or body decoding failure.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Returns `true` if logging in again may resolve the error.
    #[must_use]
    pub const fn needs_login(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated | Self::SessionExpired | Self::ReauthenticationRequired
        )
    }

    /// Returns `true` for a 409 from the server, such as a taken slot.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Api { status: 409, .. })
    }
}
