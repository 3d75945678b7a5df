//! Shared setup for the HTTP tests: the full router over in-memory stores
//! and a fixed clock (2025-01-01 00:00 UTC).

#![allow(dead_code)]
#![allow(clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use bookings::config::{AppEnv, BookingConfig};
use bookings::server::{AppState, Stores, build_router};
use chrono::Duration;
use experiences_auth::mocks::{MockSessionStore, MockUserRepository};
use experiences_auth::{AuthService, PasswordHasher};
use experiences_core::{Clock, Experience};
use experiences_testing::{FixedClock, InMemoryStore, fixtures, test_clock};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Router plus handles on its backing state.
#[derive(Clone)]
pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
    pub clock: FixedClock,
}

/// A response reduced to what tests assert on.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_env(AppEnv::Development)
    }

    pub fn with_env(app_env: AppEnv) -> Self {
        let store = InMemoryStore::new();
        let clock = test_clock();
        let auth = AuthService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockSessionStore::new()),
            PasswordHasher::new(4),
            Arc::new(clock.clone()),
            Duration::hours(1),
        );
        let state = AppState::new(
            Stores::shared(Arc::new(store.clone())),
            auth,
            Arc::new(clock.clone()),
            &BookingConfig::default(),
            app_env,
        );
        let router = build_router(
            state,
            "http://localhost:3000".parse().expect("valid origin"),
        );

        Self {
            router,
            store,
            clock,
        }
    }

    /// Add an active experience priced at `price`.
    pub fn experience(&self, title: &str, price: u32) -> Experience {
        let experience = fixtures::experience(title, price, self.clock.now());
        self.store.add_experience(experience.clone());
        experience
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let raw = body.map(|b| b.to_string());
        self.send_raw(method, uri, token, raw).await
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    /// Register `alice` and return a bearer token.
    pub async fn login(&self) -> String {
        let credentials = serde_json::json!({ "username": "alice", "password": "secret123" });
        let registered = self.post("/auth/register", None, credentials.clone()).await;
        assert_eq!(registered.status, StatusCode::CREATED);

        let login = self.post("/auth/login", None, credentials).await;
        assert_eq!(login.status, StatusCode::OK);
        login.body["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    /// Booking body for `experience` on `date` at `time`.
    pub fn booking_body(experience: &Experience, date: &str, time: &str) -> Value {
        serde_json::json!({
            "experienceId": experience.id.to_string(),
            "date": date,
            "time": time,
            "quantity": 1,
            "fullName": "Alice Example",
            "email": "alice@example.com",
        })
    }
}
