//! # Experiences Testing
//!
//! Testing utilities for the travel experiences booking service.
//!
//! This crate provides:
//! - [`FixedClock`]: deterministic, manually advanced time
//! - [`InMemoryStore`]: one store implementing every storage trait
//! - [`fixtures`]: catalog and ledger records for tests
//! - [`properties`]: proptest strategies for domain values
//!
//! ## Example
//!
//! ```
//! use experiences_testing::{InMemoryStore, fixtures, test_clock};
//! use experiences_core::{Clock, ExperienceStore};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let clock = test_clock();
//! let store = InMemoryStore::new();
//! let kayaking = fixtures::experience("Kayaking", 999, clock.now());
//! store.add_experience(kayaking.clone());
//!
//! let found = store.get_experience(kayaking.id).await.unwrap();
//! assert_eq!(found, Some(kayaking));
//! # });
//! ```

use chrono::{DateTime, Duration, Utc};
use experiences_core::environment::Clock;

mod memory_store;

pub use memory_store::InMemoryStore;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Duration, Utc};
    use std::sync::{Arc, PoisonError, RwLock};

    /// Fixed clock for deterministic tests
    ///
    /// Returns the same time until moved with [`FixedClock::advance`] or
    /// [`FixedClock::set`]. Clones share the same instant.
    ///
    /// # Example
    ///
    /// ```
    /// use experiences_testing::mocks::FixedClock;
    /// use experiences_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// assert_eq!(clock.now(), time1);
    ///
    /// clock.advance(Duration::hours(1));
    /// assert_eq!(clock.now(), time1 + Duration::hours(1));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<RwLock<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(RwLock::new(time)),
            }
        }

        /// Move the clock forward (or back, for negative durations).
        pub fn advance(&self, by: Duration) {
            let mut time = self.time.write().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }

        /// Jump to a specific instant.
        pub fn set(&self, to: DateTime<Utc>) {
            *self.time.write().unwrap_or_else(PoisonError::into_inner) = to;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.read().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1_735_689_600))
    }
}

/// Records for tests.
pub mod fixtures {
    use super::{DateTime, Utc};
    use experiences_core::{
        Booking, BookingId, BookingReference, BookingStatus, DiscountKind, Experience,
        ExperienceId, NaiveDate, PriceBreakdown, Promo, PromoCode, TimeLabel,
    };

    /// An active experience with the given title and unit price.
    #[must_use]
    pub fn experience(title: &str, price: u32, now: DateTime<Utc>) -> Experience {
        Experience::new(
            title,
            format!("{title} with a local guide"),
            price,
            "Udupi",
            format!("/uploads/{}.jpg", title.to_lowercase().replace(' ', "-")),
            now,
        )
    }

    /// A promo record.
    ///
    /// # Panics
    ///
    /// Panics if `code` is blank.
    #[must_use]
    #[allow(clippy::panic)]
    pub fn promo(
        code: &str,
        kind: DiscountKind,
        amount: u32,
        expires_at: Option<DateTime<Utc>>,
        active: bool,
    ) -> Promo {
        let Some(code) = PromoCode::parse(code) else {
            panic!("fixture promo code must not be blank");
        };
        Promo {
            code,
            kind,
            amount,
            expires_at,
            active,
        }
    }

    /// A confirmed single-person booking of `experience_id` at `date`/`time`.
    ///
    /// # Panics
    ///
    /// Panics if `time` is not a valid `HH:MM` label.
    #[must_use]
    #[allow(clippy::panic)]
    pub fn booking(
        experience_id: ExperienceId,
        date: NaiveDate,
        time: &str,
        status: BookingStatus,
        now: DateTime<Utc>,
    ) -> Booking {
        let Ok(time) = TimeLabel::parse(time) else {
            panic!("fixture time label {time:?} is not HH:MM");
        };
        Booking {
            id: BookingId::new(),
            reference: BookingReference::random(),
            experience_id,
            full_name: "Test Guest".to_string(),
            email: "guest@example.com".to_string(),
            date,
            time,
            quantity: 1,
            price: PriceBreakdown::new(999, 50),
            promo_code: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use experiences_core::TimeLabel;
    use proptest::prelude::*;

    /// Any valid `HH:MM` label.
    pub fn time_label() -> impl Strategy<Value = TimeLabel> {
        (0u32..24, 0u32..60).prop_filter_map("valid label", |(hour, minute)| {
            TimeLabel::parse(&format!("{hour:02}:{minute:02}")).ok()
        })
    }

    /// Strings that are never valid labels.
    pub fn malformed_time_label() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[0-9]:[0-5][0-9]",
            "2[4-9]:[0-5][0-9]",
            "[01][0-9]:[6-9][0-9]",
            "[a-z]{5}",
        ]
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
