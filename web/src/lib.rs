//! Axum integration for the travel experiences booking service.
//!
//! Shared HTTP plumbing used by the application router:
//!
//! - [`AppError`]: the single handler error type, rendered as
//!   `{"error": ..., "code": ...}`
//! - [`middleware::correlation_id_layer`]: per-request correlation ids
//! - [`extractors`]: correlation id, bearer token and JSON body extractors
//! - [`handlers::health_check`]: liveness endpoint
//!
//! # Example
//!
//! ```
//! use axum::{Router, routing::get};
//! use experiences_web::{AppError, BearerToken, correlation_id_layer, handlers::health_check};
//!
//! async fn whoami(BearerToken(token): BearerToken) -> Result<String, AppError> {
//!     Ok(token)
//! }
//!
//! let app: Router = Router::new()
//!     .route("/health", get(health_check))
//!     .route("/whoami", get(whoami))
//!     .layer(correlation_id_layer());
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{ApiJson, BearerToken, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
