//! # Bookings
//!
//! REST backend for browsing travel experiences and booking time slots.
//!
//! ## Components
//!
//! - [`availability`]: open dates and times derived from the fixed
//!   [`SlotPolicy`](config::SlotPolicy) minus active bookings
//! - [`admission`]: ordered validation, pricing and atomic insert of a
//!   confirmed booking
//! - [`ledger`]: booking lookup and cancellation
//! - [`promo`]: promo code validation (lookup only, never priced)
//! - [`seed`]: development catalog
//! - [`api`] and [`server`]: the axum surface
//!
//! ## Slot exclusivity
//!
//! A slot is binary: open, or held by exactly one active booking. The
//! admission pre-check gives a friendly early 409; the store's atomic insert
//! decides races.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bookings::config::{AppEnv, BookingConfig};
//! use bookings::server::{AppState, Stores, build_router};
//! # async fn wire(
//! #     store: Arc<experiences_testing::InMemoryStore>,
//! #     auth: experiences_auth::AuthService,
//! # ) {
//! let state = AppState::new(
//!     Stores::shared(store),
//!     auth,
//!     Arc::new(experiences_core::SystemClock),
//!     &BookingConfig::default(),
//!     AppEnv::Development,
//! );
//! let app = build_router(state, "http://localhost:3000".parse().unwrap());
//! # }
//! ```

pub mod admission;
pub mod api;
pub mod availability;
pub mod config;
pub mod ledger;
pub mod metrics;
pub mod pricing;
pub mod promo;
pub mod seed;
pub mod server;

pub use admission::{AdmissionError, BookingAdmission, BookingRequest};
pub use availability::Availability;
pub use config::{Config, ConfigError, SlotPolicy};
pub use ledger::{BookingLedger, CancellationError};
pub use pricing::Pricing;
pub use promo::{PromoValidation, PromoValidator};
pub use server::{AppState, Stores, build_router};
