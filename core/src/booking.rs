//! Booking ledger types.
//!
//! A [`Booking`] holds one slot of one experience. The slot is identified by
//! [`SlotKey`]; its time component is a validated [`TimeLabel`] so that two
//! spellings of the same start time can never occupy the slot twice.

use crate::experience::ExperienceId;
use crate::store::StoreError;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `BookingId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rejected time label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time label '{0}', expected HH:MM")]
pub struct InvalidTimeLabel(pub String);

/// A start time in canonical 24-hour `HH:MM` form.
///
/// ```
/// use experiences_core::TimeLabel;
///
/// let label = TimeLabel::parse("09:00").unwrap();
/// assert_eq!(label.as_str(), "09:00");
/// assert!(TimeLabel::parse("9:00").is_err());
/// assert!(TimeLabel::parse("24:00").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeLabel(String);

impl TimeLabel {
    /// Validate and wrap a label.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTimeLabel`] unless the input is two hour digits below
    /// 24, a colon, and two minute digits below 60.
    pub fn parse(input: &str) -> Result<Self, InvalidTimeLabel> {
        let bytes = input.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
        if !well_formed {
            return Err(InvalidTimeLabel(input.to_string()));
        }

        let hour = u32::from(bytes[0] - b'0') * 10 + u32::from(bytes[1] - b'0');
        let minute = u32::from(bytes[3] - b'0') * 10 + u32::from(bytes[4] - b'0');
        if hour >= 24 || minute >= 60 {
            return Err(InvalidTimeLabel(input.to_string()));
        }

        Ok(Self(input.to_string()))
    }

    /// The label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TimeLabel {
    type Err = InvalidTimeLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeLabel {
    type Error = InvalidTimeLabel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeLabel> for String {
    fn from(label: TimeLabel) -> Self {
        label.0
    }
}

/// Parse a submitted booking date into a calendar day.
///
/// Accepts a plain `YYYY-MM-DD` day, or an RFC 3339 timestamp whose day is
/// taken in `offset`.
///
/// ```
/// use chrono::{FixedOffset, NaiveDate};
/// use experiences_core::parse_calendar_day;
///
/// let utc = FixedOffset::east_opt(0).unwrap();
/// let ist = FixedOffset::east_opt(330 * 60).unwrap();
/// let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
///
/// assert_eq!(parse_calendar_day("2025-01-02", utc), Some(day));
/// assert_eq!(parse_calendar_day("2025-01-01T20:00:00Z", ist), Some(day));
/// assert_eq!(parse_calendar_day("tomorrow", utc), None);
/// ```
#[must_use]
pub fn parse_calendar_day(input: &str, offset: FixedOffset) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(day);
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|instant| instant.with_timezone(&offset).date_naive())
}

/// The `(experience, date, time)` triple a booking occupies.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SlotKey {
    /// Experience
    pub experience_id: ExperienceId,
    /// Calendar day
    pub date: NaiveDate,
    /// Start time
    pub time: TimeLabel,
}

/// A slot held by an active booking, as read back from the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BookedSlot {
    /// Calendar day
    pub date: NaiveDate,
    /// Start time
    pub time: TimeLabel,
}

impl BookedSlot {
    /// Build from raw stored text. Rows that do not parse yield `None`.
    #[must_use]
    pub fn parse(date: &str, time: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
        let time = TimeLabel::parse(time.trim()).ok()?;
        Some(Self { date, time })
    }
}

const REFERENCE_PREFIX: &str = "HUF";
const REFERENCE_SUFFIX_LEN: usize = 5;
const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Human-facing booking code: `HUF` followed by five characters of `A-Z0-9`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingReference(String);

impl BookingReference {
    /// Draw a fresh reference from `rng`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut code = String::with_capacity(REFERENCE_PREFIX.len() + REFERENCE_SUFFIX_LEN);
        code.push_str(REFERENCE_PREFIX);
        for _ in 0..REFERENCE_SUFFIX_LEN {
            let index = rng.gen_range(0..REFERENCE_ALPHABET.len());
            code.push(char::from(REFERENCE_ALPHABET[index]));
        }
        Self(code)
    }

    /// Draw a fresh reference from the thread-local generator.
    #[must_use]
    pub fn random() -> Self {
        Self::generate(&mut rand::thread_rng())
    }

    /// Validate a reference supplied by a caller. Lowercase input is accepted.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let code = input.trim().to_ascii_uppercase();
        let suffix = code.strip_prefix(REFERENCE_PREFIX)?;
        let valid = suffix.len() == REFERENCE_SUFFIX_LEN
            && suffix.bytes().all(|b| REFERENCE_ALPHABET.contains(&b));
        valid.then_some(Self(code))
    }

    /// The reference text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Booking lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting confirmation (not produced by admission)
    Pending,
    /// Holding its slot
    Confirmed,
    /// Released; terminal
    Cancelled,
}

impl BookingStatus {
    /// Storage and wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a booking in this state holds its slot.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown booking status '{other}'")),
        }
    }
}

/// Derived price fields stored with a booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Unit price times quantity
    pub subtotal: u64,
    /// Tax on the subtotal
    pub taxes: u64,
    /// Subtotal plus taxes
    pub total: u64,
}

impl PriceBreakdown {
    /// Assemble a breakdown; the total is always the sum of the parts.
    #[must_use]
    pub const fn new(subtotal: u64, taxes: u64) -> Self {
        Self {
            subtotal,
            taxes,
            total: subtotal + taxes,
        }
    }
}

/// A reservation of one slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Booking ID
    pub id: BookingId,
    /// Human-facing code
    pub reference: BookingReference,
    /// Booked experience
    pub experience_id: ExperienceId,
    /// Contact name
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// Calendar day
    pub date: NaiveDate,
    /// Start time
    pub time: TimeLabel,
    /// Party size
    pub quantity: u32,
    /// Derived price
    #[serde(flatten)]
    pub price: PriceBreakdown,
    /// Normalized promo code as supplied; not applied to the price
    pub promo_code: Option<String>,
    /// Lifecycle state
    pub status: BookingStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// The slot this booking occupies.
    #[must_use]
    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            experience_id: self.experience_id,
            date: self.date,
            time: self.time.clone(),
        }
    }

    /// Move to [`BookingStatus::Cancelled`], releasing the slot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyCancelled`] if the booking is already
    /// cancelled.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), StoreError> {
        if self.status == BookingStatus::Cancelled {
            return Err(StoreError::AlreadyCancelled(self.reference.to_string()));
        }
        self.status = BookingStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_booking() -> Booking {
        let now = Utc::now();
        Booking {
            id: BookingId::new(),
            reference: BookingReference::parse("HUFAB123").unwrap(),
            experience_id: ExperienceId::new(),
            full_name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            time: TimeLabel::parse("09:00").unwrap(),
            quantity: 1,
            price: PriceBreakdown::new(999, 50),
            promo_code: None,
            status: BookingStatus::Confirmed,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_time_label_rejects_malformed() {
        for bad in ["", "9:00", "09:0", "0900", "25:00", "12:60", "ab:cd", "09:00 ", "09-00"] {
            assert!(TimeLabel::parse(bad).is_err(), "{bad} should be rejected");
        }
        assert!(TimeLabel::parse("00:00").is_ok());
        assert!(TimeLabel::parse("23:59").is_ok());
    }

    #[test]
    fn test_time_label_deserialize_validates() {
        let ok: Result<TimeLabel, _> = serde_json::from_str("\"07:00\"");
        assert!(ok.is_ok());
        let bad: Result<TimeLabel, _> = serde_json::from_str("\"7am\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_reference_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let reference = BookingReference::generate(&mut rng);
            assert_eq!(reference.as_str().len(), 8);
            assert!(reference.as_str().starts_with("HUF"));
            assert_eq!(BookingReference::parse(reference.as_str()), Some(reference));
        }
    }

    #[test]
    fn test_reference_parse() {
        assert_eq!(
            BookingReference::parse(" hufab123 ").map(|r| r.to_string()),
            Some("HUFAB123".to_string())
        );
        assert!(BookingReference::parse("HUF1234").is_none());
        assert!(BookingReference::parse("ABCAB123").is_none());
        assert!(BookingReference::parse("HUFAB-23").is_none());
    }

    #[test]
    fn test_status_round_trip_and_activity() {
        for status in [BookingStatus::Pending, BookingStatus::Confirmed, BookingStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert!(BookingStatus::Confirmed.is_active());
        assert!(BookingStatus::Pending.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
        assert!("refunded".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_cancel_is_terminal() {
        let mut booking = sample_booking();
        let later = booking.created_at + chrono::Duration::minutes(5);
        booking.cancel(later).unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(booking.updated_at, later);
        assert!(matches!(booking.cancel(later), Err(StoreError::AlreadyCancelled(_))));
    }

    #[test]
    fn test_booking_json_is_flat_camel_case() {
        let json = serde_json::to_value(sample_booking()).unwrap();
        assert_eq!(json["fullName"], "Alice");
        assert_eq!(json["subtotal"], 999);
        assert_eq!(json["taxes"], 50);
        assert_eq!(json["total"], 1049);
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["date"], "2025-01-01");
    }

    #[test]
    fn test_booked_slot_skips_garbage() {
        assert!(BookedSlot::parse("2025-01-01", "09:00").is_some());
        assert!(BookedSlot::parse("not a date", "09:00").is_none());
        assert!(BookedSlot::parse("2025-01-01", "morning").is_none());
    }

    proptest! {
        #[test]
        fn prop_every_valid_clock_time_parses(hour in 0u32..24, minute in 0u32..60) {
            let text = format!("{hour:02}:{minute:02}");
            let label = TimeLabel::parse(&text).unwrap();
            prop_assert_eq!(label.as_str(), text.as_str());
        }

        #[test]
        fn prop_rfc3339_day_matches_offset(secs in 0i64..4_000_000_000, offset_min in -720i32..=840) {
            let offset = FixedOffset::east_opt(offset_min * 60).unwrap();
            let instant = DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
            let expected = instant.with_timezone(&offset).date_naive();
            prop_assert_eq!(parse_calendar_day(&instant.to_rfc3339(), offset), Some(expected));
        }
    }
}
