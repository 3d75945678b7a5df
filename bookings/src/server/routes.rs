//! Router configuration.

use super::state::AppState;
use crate::api::{auth, bookings, experiences, promos, seed};
use axum::{
    Router,
    http::{
        HeaderName, HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use experiences_web::{correlation_id_layer, handlers::health_check};
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the complete router.
///
/// Only `cors_origin` may call the API from a browser.
pub fn build_router(state: AppState, cors_origin: HeaderValue) -> Router {
    let correlation = HeaderName::from_static("x-correlation-id");
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            correlation.clone(),
        ])
        .expose_headers([correlation])
        .max_age(Duration::from_secs(60 * 60));

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes)
        .route("/experiences", get(experiences::list_experiences))
        .route("/experiences/bookings", post(bookings::create_booking))
        .route("/experiences/bookings/:reference", get(bookings::get_booking))
        .route(
            "/experiences/bookings/:reference/cancel",
            post(bookings::cancel_booking),
        )
        .route("/experiences/:id", get(experiences::get_experience))
        .route("/promos/validate", post(promos::validate_promo))
        .route("/seed", post(seed::seed))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(correlation_id_layer())
}
