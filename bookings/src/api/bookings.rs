//! Booking endpoints.
//!
//! - POST /experiences/bookings - Admit a booking
//! - GET /experiences/bookings/:reference - Look up a booking (requires auth)
//! - POST /experiences/bookings/:reference/cancel - Cancel a booking (requires auth)

use crate::admission::BookingRequest;
use crate::server::{AppState, SessionUser};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use experiences_core::{Booking, BookingReference};
use experiences_web::{ApiJson, AppError};
use serde::Serialize;

/// Admission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreated {
    /// Confirmation text
    pub message: &'static str,
    /// Code to quote when looking the booking up
    pub booking_reference: BookingReference,
    /// Total charged
    pub total: u64,
}

/// Admit a booking.
///
/// ```bash
/// curl -X POST http://localhost:5000/experiences/bookings \
///   -H "Content-Type: application/json" \
///   -d '{"experienceId": "...", "date": "2025-03-10", "time": "09:00",
///        "quantity": 2, "fullName": "Alice", "email": "alice@example.com"}'
/// ```
///
/// # Errors
///
/// 400 for invalid input, 404 for an unknown experience, 409 when the slot
/// is held.
pub async fn create_booking(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BookingRequest>,
) -> Result<(StatusCode, Json<BookingCreated>), AppError> {
    let booking = state.admission.admit(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingCreated {
            message: "Booking successful!",
            booking_reference: booking.reference,
            total: booking.price.total,
        }),
    ))
}

/// Look up a booking.
///
/// # Errors
///
/// 403 without a live session, 404 for an unknown reference.
pub async fn get_booking(
    State(state): State<AppState>,
    _user: SessionUser,
    Path(reference): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.ledger.find(&reference).await?))
}

/// Cancel a booking and release its slot.
///
/// # Errors
///
/// 403 without a live session, 404 for an unknown reference, 409 if it was
/// already cancelled.
pub async fn cancel_booking(
    State(state): State<AppState>,
    user: SessionUser,
    Path(reference): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.ledger.cancel(&reference).await?;
    tracing::debug!(user_id = %user.session.user_id, reference = %booking.reference, "Cancelled on request");
    Ok(Json(booking))
}
