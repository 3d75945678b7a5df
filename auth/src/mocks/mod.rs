//! In-memory store implementations for testing.

pub mod session;
pub mod user;

pub use session::MockSessionStore;
pub use user::MockUserRepository;
