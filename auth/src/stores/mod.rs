//! Concrete session store implementations.

pub mod session_redis;

pub use session_redis::RedisSessionStore;
