//! # Experiences Authentication
//!
//! Username/password accounts with opaque bearer sessions.
//!
//! ## Flow
//!
//! ```text
//! register(username, password) → User (salted hash stored)
//! login(username, password)    → LoginGrant { token, expires_in }
//! authenticate(token)          → Session { user_id, username, expires_at }
//! ```
//!
//! The token is the session id. Sessions live in a [`SessionStore`]
//! (Redis in production) and expire after a fixed TTL with no refresh.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::Duration;
//! use experiences_auth::{AuthService, PasswordHasher};
//! use experiences_auth::mocks::{MockSessionStore, MockUserRepository};
//! use experiences_core::SystemClock;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let auth = AuthService::new(
//!     Arc::new(MockUserRepository::new()),
//!     Arc::new(MockSessionStore::new()),
//!     PasswordHasher::new(8),
//!     Arc::new(SystemClock),
//!     Duration::hours(1),
//! );
//!
//! auth.register("alice", "secret123").await.unwrap();
//! let grant = auth.login("alice", "secret123").await.unwrap();
//! let session = auth.authenticate(&grant.token).await.unwrap();
//! assert_eq!(session.username, "alice");
//! # });
//! ```

pub mod error;
pub mod password;
pub mod service;
pub mod session;
pub mod stores;
pub mod user;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use error::{AuthError, Result};
pub use password::PasswordHasher;
pub use service::{AuthService, LoginGrant};
pub use session::{Session, SessionId, SessionStore};
pub use user::{User, UserId, UserRepository};
