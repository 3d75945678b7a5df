//! # Experiences Client
//!
//! Typed async client for the booking service's REST API.
//!
//! The client owns its [`Session`] explicitly:
//!
//! - [`ExperiencesClient::login`] stores the bearer token and its expiry
//! - every authenticated call checks the expiry first and fails with
//!   [`ClientError::SessionExpired`] without touching the network
//! - a 401/403 from the server discards the session and fails with
//!   [`ClientError::ReauthenticationRequired`]
//!
//! ```no_run
//! use experiences_client::ExperiencesClient;
//!
//! # async fn run() -> Result<(), experiences_client::ClientError> {
//! let mut client = ExperiencesClient::new("http://localhost:5000");
//! client.login("alice", "secret123").await?;
//! for experience in client.list_experiences().await? {
//!     println!("{} ({})", experience.title, experience.price);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod types;

pub use error::ClientError;
pub use types::{BookingConfirmation, ExperienceDetail, NewBooking, PromoStatus, Session};

use chrono::Duration;
use experiences_core::{Booking, Clock, Experience, ExperienceId, SystemClock};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use types::{Credentials, ErrorBody, LoginBody};

/// HTTP client for the booking service.
pub struct ExperiencesClient {
    http: reqwest::Client,
    base_url: String,
    clock: Arc<dyn Clock>,
    session: Option<Session>,
}

impl ExperiencesClient {
    /// Client for the service at `base_url`, e.g. `http://localhost:5000`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_clock(base_url, Arc::new(SystemClock))
    }

    /// Client that judges session expiry by `clock`.
    #[must_use]
    pub fn with_clock(base_url: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            clock,
            session: None,
        }
    }

    /// The held session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // ── Accounts ────────────────────────────────────────────────────

    /// Create an account.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] with status 400 or 409 for rejected input.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(&Credentials { username, password })
            .send()
            .await?;
        expect_success(response).await.map(drop)
    }

    /// Log in and hold the resulting session.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] with status 401 for wrong credentials.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<&Session, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&Credentials { username, password })
            .send()
            .await?;
        let body: LoginBody = decode(response).await?;

        let lifetime = i64::try_from(body.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(Duration::zero);
        let session = Session {
            token: body.token,
            expires_at: self.clock.now() + lifetime,
        };
        debug!(expires_at = %session.expires_at, "Logged in");
        Ok(&*self.session.insert(session))
    }

    /// Drop the session here and on the server.
    ///
    /// The local session is discarded even if the server call fails.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`] without a session, or a transport
    /// error.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let session = self.session.take().ok_or(ClientError::NotAuthenticated)?;
        let response = self
            .http
            .post(self.url("/auth/logout"))
            .bearer_auth(&session.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(()),
            _ => expect_success(response).await.map(drop),
        }
    }

    // ── Catalog ─────────────────────────────────────────────────────

    /// Active experiences.
    ///
    /// # Errors
    ///
    /// Session errors, or [`ClientError::Api`] on server failure.
    pub async fn list_experiences(&mut self) -> Result<Vec<Experience>, ClientError> {
        let request = self.http.get(self.url("/experiences"));
        self.authorized(request).await
    }

    /// One experience with its open dates and times.
    ///
    /// # Errors
    ///
    /// Session errors, or [`ClientError::Api`] with status 404 if unknown.
    pub async fn get_experience(&mut self, id: ExperienceId) -> Result<ExperienceDetail, ClientError> {
        let request = self.http.get(self.url(&format!("/experiences/{id}")));
        self.authorized(request).await
    }

    // ── Bookings ────────────────────────────────────────────────────

    /// Book a slot. No session is needed.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] with status 400, 404 or 409 when refused.
    pub async fn create_booking(&self, booking: &NewBooking) -> Result<BookingConfirmation, ClientError> {
        let response = self
            .http
            .post(self.url("/experiences/bookings"))
            .json(booking)
            .send()
            .await?;
        decode(response).await
    }

    /// Look up a booking by reference.
    ///
    /// # Errors
    ///
    /// Session errors, or [`ClientError::Api`] with status 404 if unknown.
    pub async fn get_booking(&mut self, reference: &str) -> Result<Booking, ClientError> {
        let request = self
            .http
            .get(self.url(&format!("/experiences/bookings/{reference}")));
        self.authorized(request).await
    }

    /// Cancel a booking.
    ///
    /// # Errors
    ///
    /// Session errors, or [`ClientError::Api`] with status 404 or 409.
    pub async fn cancel_booking(&mut self, reference: &str) -> Result<Booking, ClientError> {
        let request = self
            .http
            .post(self.url(&format!("/experiences/bookings/{reference}/cancel")));
        self.authorized(request).await
    }

    // ── Promos ──────────────────────────────────────────────────────

    /// Check a promo code. No session is needed.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on server failure.
    pub async fn validate_promo(&self, code: &str) -> Result<PromoStatus, ClientError> {
        let response = self
            .http
            .post(self.url("/promos/validate"))
            .json(&serde_json::json!({ "code": code }))
            .send()
            .await?;
        decode(response).await
    }

    // ── Session handling ────────────────────────────────────────────

    fn bearer(&mut self) -> Result<String, ClientError> {
        let now = self.clock.now();
        let Some(session) = &self.session else {
            return Err(ClientError::NotAuthenticated);
        };
        if session.is_expired(now) {
            self.session = None;
            return Err(ClientError::SessionExpired);
        }
        Ok(session.token.clone())
    }

    async fn authorized<T: DeserializeOwned>(&mut self, request: RequestBuilder) -> Result<T, ClientError> {
        let token = self.bearer()?;
        let response = request.bearer_auth(token).send().await?;

        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            debug!(status = %response.status(), "Server rejected session");
            self.session = None;
            return Err(ClientError::ReauthenticationRequired);
        }
        decode(response).await
    }
}

async fn expect_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await?;
    let (message, code) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.error, body.code),
        Err(_) => (text, None),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
        code,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(expect_success(response).await?.json().await?)
}
