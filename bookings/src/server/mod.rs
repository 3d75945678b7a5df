//! HTTP server module.
//!
//! - Application state wiring
//! - Session extraction for protected endpoints
//! - Router configuration

pub mod routes;
pub mod session;
pub mod state;

pub use routes::build_router;
pub use session::SessionUser;
pub use state::{AppState, Stores};
