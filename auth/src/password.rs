//! bcrypt password hashing.
//!
//! Hashes use the modular crypt format (`$2b$<cost>$...`). The cost travels
//! with the hash so it can be raised without invalidating stored accounts.

use crate::error::{AuthError, Result};

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Hashes and verifies passwords.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Cost used when none is configured.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hasher producing hashes at `cost`, clamped to bcrypt's 4..=31.
    #[must_use]
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    /// Cost applied to new hashes.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `password` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if bcrypt fails.
    pub fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AuthError::InternalError(format!("Password hashing failed: {e}")))
    }

    /// Check `password` against a stored hash, using the hash's own cost.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedHash` if `encoded` is not a bcrypt hash.
    pub fn verify(&self, password: &str, encoded: &str) -> Result<bool> {
        bcrypt::verify(password, encoded).map_err(|_| AuthError::MalformedHash)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}
