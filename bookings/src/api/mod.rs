//! HTTP API handlers.
//!
//! Handlers are thin: they extract, call a domain service from
//! [`AppState`](crate::server::AppState) and convert errors into
//! [`AppError`](experiences_web::AppError).

pub mod auth;
pub mod bookings;
pub mod experiences;
pub mod promos;
pub mod seed;
