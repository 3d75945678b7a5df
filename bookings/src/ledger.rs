//! Booking lookup and cancellation.

use crate::metrics;
use experiences_core::{Booking, BookingReference, BookingStore, Clock, StoreError};
use experiences_web::AppError;
use std::sync::Arc;
use thiserror::Error;

/// Errors from looking up or cancelling a booking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CancellationError {
    /// No booking has the reference (malformed references included).
    #[error("Booking not found")]
    NotFound,

    /// The booking was already cancelled.
    #[error("Booking is already cancelled")]
    AlreadyCancelled,

    /// Storage failure.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CancellationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound,
            StoreError::AlreadyCancelled(_) => Self::AlreadyCancelled,
            other => Self::Store(other),
        }
    }
}

impl From<CancellationError> for AppError {
    fn from(err: CancellationError) -> Self {
        match err {
            CancellationError::NotFound => {
                Self::not_found(err.to_string()).with_code("BOOKING_NOT_FOUND")
            }
            CancellationError::AlreadyCancelled => {
                Self::conflict(err.to_string()).with_code("ALREADY_CANCELLED")
            }
            CancellationError::Store(source) => Self::from(source),
        }
    }
}

/// Read and cancel bookings by reference.
#[derive(Clone)]
pub struct BookingLedger {
    bookings: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
}

impl BookingLedger {
    /// Create a ledger over `bookings`.
    #[must_use]
    pub fn new(bookings: Arc<dyn BookingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { bookings, clock }
    }

    /// The booking with `reference` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CancellationError::NotFound`] for unknown or malformed
    /// references.
    pub async fn find(&self, reference: &str) -> Result<Booking, CancellationError> {
        let reference = BookingReference::parse(reference).ok_or(CancellationError::NotFound)?;
        self.bookings
            .find_booking(&reference)
            .await?
            .ok_or(CancellationError::NotFound)
    }

    /// Cancel the booking with `reference`, releasing its slot.
    ///
    /// # Errors
    ///
    /// - [`CancellationError::NotFound`] for unknown or malformed references
    /// - [`CancellationError::AlreadyCancelled`] if it was cancelled before
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, reference: &str) -> Result<Booking, CancellationError> {
        let reference = BookingReference::parse(reference).ok_or(CancellationError::NotFound)?;
        let booking = self
            .bookings
            .cancel_booking(&reference, self.clock.now())
            .await?;

        metrics::record_cancellation();
        tracing::info!(reference = %booking.reference, "Booking cancelled");
        Ok(booking)
    }
}
