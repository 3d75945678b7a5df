//! Catalog types.

use crate::booking::TimeLabel;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unit price used when an experience was stored without one.
pub const DEFAULT_PRICE: u32 = 999;

/// Minimum participant age when none is configured.
pub const DEFAULT_MINIMUM_AGE: u32 = 10;

/// Unique identifier for an experience
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperienceId(Uuid);

impl ExperienceId {
    /// Creates a new random `ExperienceId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `ExperienceId` from a `Uuid`
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

impl Default for ExperienceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExperienceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExperienceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// One time slot in an experience's descriptive schedule.
///
/// The counters are catalog data only. Live availability is derived from
/// the booking ledger and never reads them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotTemplate {
    /// Start time label
    pub time: TimeLabel,
    /// Whether the operator lists the slot at all
    pub available: bool,
    /// Advertised group size
    pub max_capacity: u32,
    /// Advertised bookings so far
    pub current_bookings: u32,
}

impl TimeSlotTemplate {
    /// An open slot with the given advertised capacity.
    #[must_use]
    pub const fn open(time: TimeLabel, max_capacity: u32) -> Self {
        Self {
            time,
            available: true,
            max_capacity,
            current_bookings: 0,
        }
    }
}

/// A calendar day in the descriptive schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledDate {
    /// Calendar day
    pub date: NaiveDate,
    /// Slots offered that day
    pub time_slots: Vec<TimeSlotTemplate>,
}

/// A bookable activity in the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    /// Experience ID
    pub id: ExperienceId,
    /// Display title
    pub title: String,
    /// Long description
    pub description: String,
    /// Unit price in the smallest currency unit
    pub price: u32,
    /// Where the experience takes place
    pub location: String,
    /// Image reference (path or URL)
    pub image: String,
    /// Minimum participant age
    pub minimum_age: u32,
    /// What the price covers
    pub included_items: Vec<String>,
    /// What participants must bring or satisfy
    pub requirements: Vec<String>,
    /// Descriptive schedule shown in the catalog
    pub available_dates: Vec<ScheduledDate>,
    /// Whether the experience is listed
    pub active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Experience {
    /// Create an active experience with default age limit and empty lists.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        price: u32,
        location: impl Into<String>,
        image: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ExperienceId::new(),
            title: title.into(),
            description: description.into(),
            price,
            location: location.into(),
            image: image.into(),
            minimum_age: DEFAULT_MINIMUM_AGE,
            included_items: Vec::new(),
            requirements: Vec::new(),
            available_dates: Vec::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the descriptive schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: Vec<ScheduledDate>) -> Self {
        self.available_dates = schedule;
        self
    }

    /// Replace the included items.
    #[must_use]
    pub fn with_included_items(mut self, items: Vec<String>) -> Self {
        self.included_items = items;
        self
    }

    /// Replace the requirements.
    #[must_use]
    pub fn with_requirements(mut self, requirements: Vec<String>) -> Self {
        self.requirements = requirements;
        self
    }

    /// Unit price used for quoting, falling back to [`DEFAULT_PRICE`].
    #[must_use]
    pub const fn effective_price(&self) -> u32 {
        if self.price == 0 {
            DEFAULT_PRICE
        } else {
            self.price
        }
    }
}
