//! Request and response bodies.

use chrono::{DateTime, NaiveDate, Utc};
use experiences_core::{DiscountKind, ExperienceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bearer session held by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token
    pub token: String,
    /// When the server stops accepting the token
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is past its expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// One experience with its live availability.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceDetail {
    /// Experience ID
    pub id: ExperienceId,
    /// Display title
    pub title: String,
    /// Long description
    pub description: String,
    /// Quoting price
    pub price: u32,
    /// Where it takes place
    pub location: String,
    /// Image reference
    pub image: String,
    /// Minimum participant age
    pub minimum_age: u32,
    /// What the price covers
    #[serde(default)]
    pub included_items: Vec<String>,
    /// What participants must bring
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Days with at least one open slot
    pub available_dates: Vec<NaiveDate>,
    /// Every offered time label
    pub available_times: Vec<String>,
    /// Open labels per listed day
    #[serde(default)]
    pub open_slots: BTreeMap<NaiveDate, Vec<String>>,
}

/// Booking request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    /// Experience to book
    pub experience_id: ExperienceId,
    /// Calendar day
    pub date: NaiveDate,
    /// `HH:MM` label
    pub time: String,
    /// Party size
    pub quantity: u32,
    /// Contact name
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// Optional promo code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
}

/// Admission response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    /// Confirmation text
    pub message: String,
    /// Reference code
    pub booking_reference: String,
    /// Total charged
    pub total: u64,
}

/// Promo validation result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoStatus {
    /// Whether the code is redeemable now
    pub valid: bool,
    /// Discount type, when valid
    #[serde(rename = "type")]
    pub kind: Option<DiscountKind>,
    /// Discount amount, when valid
    pub amount: Option<u32>,
    /// Expiry, when valid and set
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginBody {
    pub token: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    pub code: Option<String>,
}
