//! Storage abstractions.
//!
//! Each trait is object safe so the application can hold
//! `Arc<dyn BookingStore>` and swap the PostgreSQL implementation for the
//! in-memory one in tests.

use crate::booking::{BookedSlot, Booking, BookingReference, SlotKey};
use crate::experience::{Experience, ExperienceId};
use crate::promo::{Promo, PromoCode};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Errors reported by store implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Another active booking already holds the slot.
    #[error("slot already held by an active booking")]
    SlotTaken,

    /// The generated booking reference is already in use.
    #[error("booking reference already in use")]
    DuplicateReference,

    /// The booking was cancelled before.
    #[error("booking {0} is already cancelled")]
    AlreadyCancelled(String),

    /// Backend failure.
    #[error("database error: {0}")]
    Database(String),
}

/// Read access to the experience catalog.
#[async_trait]
pub trait ExperienceStore: Send + Sync {
    /// All active experiences, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on backend failure.
    async fn list_experiences(&self) -> Result<Vec<Experience>, StoreError>;

    /// One experience by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on backend failure.
    async fn get_experience(&self, id: ExperienceId) -> Result<Option<Experience>, StoreError>;
}

/// The booking ledger.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Slots held by active bookings of `experience_id` with dates in
    /// `from..=until`. Rows whose date or time cannot be read are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on backend failure.
    async fn active_slots(
        &self,
        experience_id: ExperienceId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<BookedSlot>, StoreError>;

    /// Whether an active booking holds `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on backend failure.
    async fn is_slot_taken(&self, slot: &SlotKey) -> Result<bool, StoreError>;

    /// Persist a new booking.
    ///
    /// Implementations must check and insert atomically.
    ///
    /// # Errors
    ///
    /// - [`StoreError::SlotTaken`] if an active booking holds the slot
    /// - [`StoreError::DuplicateReference`] if the reference is in use
    /// - [`StoreError::Database`] on backend failure
    async fn insert_booking(&self, booking: &Booking) -> Result<(), StoreError>;

    /// One booking by reference.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on backend failure.
    async fn find_booking(&self, reference: &BookingReference)
    -> Result<Option<Booking>, StoreError>;

    /// Cancel a booking and return its new state.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no booking has the reference
    /// - [`StoreError::AlreadyCancelled`] if it is already cancelled
    /// - [`StoreError::Database`] on backend failure
    async fn cancel_booking(
        &self,
        reference: &BookingReference,
        at: DateTime<Utc>,
    ) -> Result<Booking, StoreError>;
}

/// Promo lookup.
#[async_trait]
pub trait PromoStore: Send + Sync {
    /// One promo by normalized code.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on backend failure.
    async fn find_promo(&self, code: &PromoCode) -> Result<Option<Promo>, StoreError>;
}

/// Development seeding.
#[async_trait]
pub trait CatalogSeeder: Send + Sync {
    /// Delete all bookings, experiences and promos, then insert the given
    /// catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on backend failure.
    async fn replace_catalog(
        &self,
        experiences: &[Experience],
        promos: &[Promo],
    ) -> Result<(), StoreError>;

    /// Number of experiences currently stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on backend failure.
    async fn experience_count(&self) -> Result<u64, StoreError>;
}
