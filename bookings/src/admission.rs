//! Booking admission.
//!
//! [`BookingAdmission::admit`] validates a request in a fixed order and
//! stops at the first failure:
//!
//! 1. required fields present
//! 2. experience id well formed
//! 3. experience exists
//! 4. date inside the booking window
//! 5. time is an offered label
//! 6. slot not held by an active booking
//!
//! It then prices the booking and inserts it as confirmed. The pre-check in
//! step 6 is only an early exit; the store's atomic insert is what keeps two
//! concurrent requests from both holding a slot, and a lost race is reported
//! as [`AdmissionError::DuplicateBooking`].

use crate::config::SlotPolicy;
use crate::metrics;
use crate::pricing::Pricing;
use experiences_core::{
    Booking, BookingId, BookingReference, BookingStatus, BookingStore, Clock, ExperienceId,
    ExperienceStore, PromoCode, SlotKey, StoreError, TimeLabel, parse_calendar_day,
};
use experiences_web::AppError;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Attempts at drawing an unused booking reference.
pub const MAX_REFERENCE_ATTEMPTS: usize = 5;

/// Largest party size a booking can hold; stored as a signed 32-bit integer.
pub const MAX_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// Booking request body. Every field is optional so that absence is
/// reported as [`AdmissionError::MissingFields`] rather than a body error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Experience UUID
    pub experience_id: Option<String>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    pub date: Option<String>,
    /// `HH:MM`
    pub time: Option<String>,
    /// Party size
    pub quantity: Option<i64>,
    /// Contact name
    pub full_name: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Optional promo code, stored normalized
    pub promo_code: Option<String>,
}

/// Reasons a booking request is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// A required field is absent or blank, or quantity is zero.
    #[error("Missing required fields")]
    MissingFields,

    /// Quantity is negative or above [`MAX_QUANTITY`].
    #[error("Quantity must be between 1 and {}", MAX_QUANTITY)]
    InvalidQuantity,

    /// The experience id is not a UUID.
    #[error("Invalid experience ID format")]
    InvalidExperienceId,

    /// No experience has the id.
    #[error("Experience not found")]
    ExperienceNotFound,

    /// Unparseable date or outside the window.
    #[error("Selected date not available")]
    DateNotAvailable,

    /// Not one of the offered time labels.
    #[error("Selected time not available")]
    TimeNotAvailable,

    /// An active booking already holds the slot.
    #[error("This time slot is already booked")]
    SlotTaken,

    /// A concurrent admission won the slot between check and insert.
    #[error("Duplicate booking detected for this slot")]
    DuplicateBooking,

    /// Every generated reference collided.
    #[error("Could not allocate a booking reference")]
    ReferenceExhausted,

    /// Storage failure.
    #[error(transparent)]
    Store(StoreError),
}

impl AdmissionError {
    /// Metrics label for this rejection.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::SlotTaken | Self::DuplicateBooking => "conflict",
            Self::ReferenceExhausted | Self::Store(_) => "error",
            _ => "rejected",
        }
    }
}

impl From<AdmissionError> for AppError {
    fn from(err: AdmissionError) -> Self {
        let message = err.to_string();
        match err {
            AdmissionError::MissingFields => Self::bad_request(message).with_code("MISSING_FIELDS"),
            AdmissionError::InvalidQuantity => {
                Self::bad_request(message).with_code("INVALID_QUANTITY")
            }
            AdmissionError::InvalidExperienceId => {
                Self::bad_request(message).with_code("INVALID_EXPERIENCE_ID")
            }
            AdmissionError::ExperienceNotFound => {
                Self::not_found(message).with_code("EXPERIENCE_NOT_FOUND")
            }
            AdmissionError::DateNotAvailable => {
                Self::bad_request(message).with_code("DATE_NOT_AVAILABLE")
            }
            AdmissionError::TimeNotAvailable => {
                Self::bad_request(message).with_code("TIME_NOT_AVAILABLE")
            }
            AdmissionError::SlotTaken => Self::conflict(message).with_code("SLOT_TAKEN"),
            AdmissionError::DuplicateBooking => {
                Self::conflict(message).with_code("DUPLICATE_BOOKING")
            }
            AdmissionError::ReferenceExhausted => {
                Self::internal("Failed to create booking").with_source(err)
            }
            AdmissionError::Store(source) => Self::from(source),
        }
    }
}

/// Fields of a request that passed the presence check.
struct Required<'a> {
    experience_id: &'a str,
    date: &'a str,
    time: &'a str,
    quantity: u32,
    full_name: &'a str,
    email: &'a str,
}

fn present(field: Option<&String>) -> Option<&str> {
    field.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl BookingRequest {
    fn required(&self) -> Result<Required<'_>, AdmissionError> {
        let fields = (
            present(self.experience_id.as_ref()),
            present(self.date.as_ref()),
            present(self.time.as_ref()),
            self.quantity.filter(|&q| q != 0),
            present(self.full_name.as_ref()),
            present(self.email.as_ref()),
        );
        let (Some(experience_id), Some(date), Some(time), Some(quantity), Some(full_name), Some(email)) =
            fields
        else {
            return Err(AdmissionError::MissingFields);
        };

        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|&q| q <= MAX_QUANTITY)
            .ok_or(AdmissionError::InvalidQuantity)?;

        Ok(Required {
            experience_id,
            date,
            time,
            quantity,
            full_name,
            email,
        })
    }
}

/// Validates and persists booking requests.
#[derive(Clone)]
pub struct BookingAdmission {
    experiences: Arc<dyn ExperienceStore>,
    bookings: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
    policy: SlotPolicy,
    pricing: Pricing,
}

impl BookingAdmission {
    /// Create an admission controller.
    #[must_use]
    pub fn new(
        experiences: Arc<dyn ExperienceStore>,
        bookings: Arc<dyn BookingStore>,
        clock: Arc<dyn Clock>,
        policy: SlotPolicy,
        pricing: Pricing,
    ) -> Self {
        Self {
            experiences,
            bookings,
            clock,
            policy,
            pricing,
        }
    }

    /// Admit `request` as a confirmed booking.
    ///
    /// # Errors
    ///
    /// Returns the first [`AdmissionError`] in validation order, or a
    /// conflict if the slot is held.
    #[tracing::instrument(skip_all, fields(experience_id = ?request.experience_id, date = ?request.date, time = ?request.time))]
    pub async fn admit(&self, request: &BookingRequest) -> Result<Booking, AdmissionError> {
        let result = self.try_admit(request).await;
        match &result {
            Ok(booking) => {
                metrics::record_admission("admitted");
                metrics::record_revenue(booking.price.total);
                tracing::info!(
                    reference = %booking.reference,
                    total = booking.price.total,
                    "Booking admitted"
                );
            }
            Err(e) => {
                metrics::record_admission(e.outcome());
                tracing::info!(reason = %e, "Booking refused");
            }
        }
        result
    }

    async fn try_admit(&self, request: &BookingRequest) -> Result<Booking, AdmissionError> {
        let fields = request.required()?;

        let experience_id: ExperienceId = fields
            .experience_id
            .parse()
            .map_err(|_| AdmissionError::InvalidExperienceId)?;

        let experience = self
            .experiences
            .get_experience(experience_id)
            .await
            .map_err(AdmissionError::Store)?
            .filter(|e| e.active)
            .ok_or(AdmissionError::ExperienceNotFound)?;

        let now = self.clock.now();
        let date = parse_calendar_day(fields.date, self.policy.utc_offset())
            .filter(|&date| self.policy.in_window(date, now))
            .ok_or(AdmissionError::DateNotAvailable)?;

        let time = TimeLabel::parse(fields.time)
            .ok()
            .filter(|label| self.policy.offers(label))
            .ok_or(AdmissionError::TimeNotAvailable)?;

        let slot = SlotKey {
            experience_id,
            date,
            time,
        };
        if self
            .bookings
            .is_slot_taken(&slot)
            .await
            .map_err(AdmissionError::Store)?
        {
            return Err(AdmissionError::SlotTaken);
        }

        let mut booking = Booking {
            id: BookingId::new(),
            reference: BookingReference::random(),
            experience_id,
            full_name: fields.full_name.to_string(),
            email: fields.email.to_string(),
            date: slot.date,
            time: slot.time,
            quantity: fields.quantity,
            price: self.pricing.quote(experience.effective_price(), fields.quantity),
            promo_code: request
                .promo_code
                .as_deref()
                .and_then(PromoCode::parse)
                .map(|code| code.as_str().to_string()),
            status: BookingStatus::Confirmed,
            created_at: now,
            updated_at: now,
        };

        for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
            match self.bookings.insert_booking(&booking).await {
                Ok(()) => return Ok(booking),
                Err(StoreError::SlotTaken) => return Err(AdmissionError::DuplicateBooking),
                Err(StoreError::DuplicateReference) => {
                    tracing::warn!(attempt, reference = %booking.reference, "Booking reference collision");
                    booking.reference = BookingReference::random();
                }
                Err(e) => return Err(AdmissionError::Store(e)),
            }
        }

        Err(AdmissionError::ReferenceExhausted)
    }
}
