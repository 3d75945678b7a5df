//! Business metrics for the booking service.
//!
//! # Exported Metrics
//!
//! - `bookings_admissions_total{outcome}` - Admission attempts by outcome
//! - `bookings_revenue_total` - Sum of admitted booking totals
//! - `bookings_cancellations_total` - Bookings moved to cancelled
//! - `bookings_promo_validations_total{valid}` - Promo lookups by result
//! - `bookings_logins_total{outcome}` - Login attempts by outcome

use metrics::describe_counter;

/// Register all metric descriptions.
///
/// Call once at startup, after installing the exporter.
pub fn register_business_metrics() {
    describe_counter!(
        "bookings_admissions_total",
        "Booking admission attempts by outcome (admitted, rejected, conflict, error)"
    );
    describe_counter!(
        "bookings_revenue_total",
        "Sum of admitted booking totals in the smallest currency unit"
    );
    describe_counter!(
        "bookings_cancellations_total",
        "Number of bookings cancelled"
    );
    describe_counter!(
        "bookings_promo_validations_total",
        "Promo code validations by result"
    );
    describe_counter!(
        "bookings_logins_total",
        "Login attempts by outcome (success, failure)"
    );

    tracing::info!("Business metrics registered");
}

/// Record an admission attempt. `outcome` is a short label such as
/// `admitted` or `conflict`.
pub fn record_admission(outcome: &'static str) {
    metrics::counter!("bookings_admissions_total", "outcome" => outcome).increment(1);
}

/// Record revenue from an admitted booking.
pub fn record_revenue(total: u64) {
    metrics::counter!("bookings_revenue_total").increment(total);
}

/// Record a cancellation.
pub fn record_cancellation() {
    metrics::counter!("bookings_cancellations_total").increment(1);
}

/// Record a promo validation.
pub fn record_promo_validation(valid: bool) {
    let valid = if valid { "true" } else { "false" };
    metrics::counter!("bookings_promo_validations_total", "valid" => valid).increment(1);
}

/// Record a login attempt.
pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("bookings_logins_total", "outcome" => outcome).increment(1);
    tracing::debug!(outcome, "Recorded login metric");
}
