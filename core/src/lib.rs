//! # Experiences Core
//!
//! Domain types and storage abstractions for the travel experiences booking
//! service.
//!
//! This crate has no I/O of its own. It defines:
//!
//! - **Catalog types**: [`Experience`] and its descriptive slot template
//! - **Ledger types**: [`Booking`], [`BookingStatus`], [`BookingReference`],
//!   [`TimeLabel`] and [`SlotKey`]
//! - **Promotions**: [`Promo`] and [`PromoCode`]
//! - **Environment**: the [`Clock`] trait so "now" is injectable
//! - **Stores**: async traits implemented by the PostgreSQL crate and by the
//!   in-memory test store
//!
//! ## Slot uniqueness
//!
//! A slot is an `(experience, date, time)` triple. At most one booking whose
//! status is not [`BookingStatus::Cancelled`] may hold a slot. Store
//! implementations must enforce this atomically and report a lost race as
//! [`StoreError::SlotTaken`].

pub mod booking;
pub mod environment;
pub mod experience;
pub mod promo;
pub mod store;

pub use booking::{
    BookedSlot, Booking, BookingId, BookingReference, BookingStatus, InvalidTimeLabel,
    PriceBreakdown, SlotKey, TimeLabel, parse_calendar_day,
};
pub use environment::{Clock, SystemClock};
pub use experience::{Experience, ExperienceId, ScheduledDate, TimeSlotTemplate};
pub use promo::{DiscountKind, Promo, PromoCode};
pub use store::{BookingStore, CatalogSeeder, ExperienceStore, PromoStore, StoreError};

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};
