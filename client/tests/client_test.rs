//! End-to-end client tests against the booking router served on an
//! ephemeral local port.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use bookings::config::{AppEnv, BookingConfig};
use bookings::server::{AppState, Stores, build_router};
use chrono::{Duration, NaiveDate};
use experiences_auth::mocks::{MockSessionStore, MockUserRepository};
use experiences_auth::{AuthService, PasswordHasher};
use experiences_client::{ClientError, ExperiencesClient, NewBooking};
use experiences_core::{Clock, DiscountKind, Experience};
use experiences_testing::{FixedClock, InMemoryStore, fixtures, test_clock};
use std::sync::Arc;

struct Server {
    base_url: String,
    store: InMemoryStore,
    clock: FixedClock,
}

impl Server {
    async fn start() -> Self {
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
            AppEnv::Development,
        );
        let router = build_router(state, "http://localhost:3000".parse().unwrap());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            store,
            clock,
        }
    }

    /// Client sharing the server's clock.
    fn client(&self) -> ExperiencesClient {
        ExperiencesClient::with_clock(&self.base_url, Arc::new(self.clock.clone()))
    }

    fn experience(&self, title: &str, price: u32) -> Experience {
        let experience = fixtures::experience(title, price, self.clock.now());
        self.store.add_experience(experience.clone());
        experience
    }
}

async fn logged_in(client: &mut ExperiencesClient) {
    client.register("alice", "secret123").await.unwrap();
    client.login("alice", "secret123").await.unwrap();
}

fn new_booking(experience: &Experience, date: &str, time: &str) -> NewBooking {
    NewBooking {
        experience_id: experience.id,
        date: date.parse().unwrap(),
        time: time.to_string(),
        quantity: 1,
        full_name: "Alice Example".to_string(),
        email: "alice@example.com".to_string(),
        promo_code: None,
    }
}

#[tokio::test]
async fn test_browse_book_and_cancel() {
    let server = Server::start().await;
    let kayaking = server.experience("Kayaking", 999);
    let mut client = server.client();
    logged_in(&mut client).await;

    let session = client.session().unwrap();
    assert_eq!(session.expires_at, server.clock.now() + Duration::hours(1));

    let listed = client.list_experiences().await.unwrap();
    assert_eq!(listed, vec![kayaking.clone()]);

    let detail = client.get_experience(kayaking.id).await.unwrap();
    assert_eq!(detail.title, "Kayaking");
    assert_eq!(detail.price, 999);
    assert_eq!(detail.available_dates.len(), 7);
    assert_eq!(
        detail.available_dates[0],
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    );
    assert!(detail.available_times.contains(&"09:00".to_string()));

    let confirmation = client
        .create_booking(&new_booking(&kayaking, "2025-01-02", "09:00"))
        .await
        .unwrap();
    assert_eq!(confirmation.message, "Booking successful!");
    assert_eq!(confirmation.total, 1049);

    let booking = client
        .get_booking(&confirmation.booking_reference)
        .await
        .unwrap();
    assert_eq!(booking.experience_id, kayaking.id);
    assert_eq!(booking.price.total, confirmation.total);

    let cancelled = client
        .cancel_booking(&confirmation.booking_reference)
        .await
        .unwrap();
    assert_eq!(cancelled.reference, booking.reference);

    let again = client
        .cancel_booking(&confirmation.booking_reference)
        .await
        .unwrap_err();
    assert!(again.is_conflict());
    assert!(!again.needs_login());
}

#[tokio::test]
async fn test_taken_slot_carries_server_message() {
    let server = Server::start().await;
    let kayaking = server.experience("Kayaking", 999);
    let client = server.client();
    let request = new_booking(&kayaking, "2025-01-03", "11:00");

    client.create_booking(&request).await.unwrap();
    let err = client.create_booking(&request).await.unwrap_err();

    match err {
        ClientError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 409);
            assert_eq!(message, "This time slot is already booked");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_account_errors() {
    let server = Server::start().await;
    let mut client = server.client();
    client.register("alice", "secret123").await.unwrap();

    let taken = client.register("alice", "secret123").await.unwrap_err();
    assert!(matches!(taken, ClientError::Api { status: 409, .. }));

    let wrong = client.login("alice", "nope").await.unwrap_err();
    assert!(matches!(wrong, ClientError::Api { status: 401, .. }));
    assert!(client.session().is_none());
}

#[tokio::test]
async fn test_authenticated_calls_need_login() {
    let server = Server::start().await;
    let mut client = server.client();

    let err = client.list_experiences().await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
    assert!(err.needs_login());

    assert!(matches!(
        client.logout().await.unwrap_err(),
        ClientError::NotAuthenticated
    ));
}

#[tokio::test]
async fn test_expired_session_is_discarded_locally() {
    let server = Server::start().await;
    let mut client = server.client();
    logged_in(&mut client).await;

    server.clock.advance(Duration::hours(1));

    let err = client.list_experiences().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(client.session().is_none());

    client.login("alice", "secret123").await.unwrap();
    assert!(client.list_experiences().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_rejection_requires_reauthentication() {
    let server = Server::start().await;

    // The client's clock stays behind, so only the server sees the expiry.
    let mut client = ExperiencesClient::with_clock(&server.base_url, Arc::new(test_clock()));
    logged_in(&mut client).await;
    server.clock.advance(Duration::hours(2));

    let err = client.list_experiences().await.unwrap_err();
    assert!(matches!(err, ClientError::ReauthenticationRequired));
    assert!(client.session().is_none());
}

#[tokio::test]
async fn test_logout_ends_server_session() {
    let server = Server::start().await;
    let mut client = server.client();
    logged_in(&mut client).await;
    let token = client.session().unwrap().token.clone();

    client.logout().await.unwrap();
    assert!(client.session().is_none());

    let status = reqwest::Client::new()
        .get(format!("{}/experiences", server.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status.as_u16(), 403);
}

#[tokio::test]
async fn test_promo_validation() {
    let server = Server::start().await;
    let now = server.clock.now();
    server.store.add_promo(fixtures::promo(
        "SAVE10",
        DiscountKind::Percent,
        10,
        Some(now + Duration::days(30)),
        true,
    ));
    let client = server.client();

    let valid = client.validate_promo("save10").await.unwrap();
    assert!(valid.valid);
    assert_eq!(valid.kind, Some(DiscountKind::Percent));
    assert_eq!(valid.amount, Some(10));
    assert_eq!(valid.expires_at, Some(now + Duration::days(30)));

    let unknown = client.validate_promo("NOPE").await.unwrap();
    assert!(!unknown.valid);
    assert_eq!(unknown.kind, None);
}
