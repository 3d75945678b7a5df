//! Booking admission against the in-memory ledger.
//!
//! Covers the booking window edges, the fail-fast validation order, pricing
//! and the reference regeneration loop.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use bookings::admission::{AdmissionError, BookingAdmission, BookingRequest};
use bookings::config::SlotPolicy;
use bookings::pricing::Pricing;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use experiences_core::{
    BookedSlot, Booking, BookingReference, BookingStatus, BookingStore, Clock, Experience,
    ExperienceId, SlotKey, StoreError,
};
use experiences_testing::{FixedClock, InMemoryStore, fixtures};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn afternoon() -> FixedClock {
    // Late in the UTC day so offset handling is visible.
    FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 10, 20, 0, 0).unwrap())
}

struct Fixture {
    admission: BookingAdmission,
    store: InMemoryStore,
    experience: Experience,
    clock: FixedClock,
}

fn fixture_with(policy: SlotPolicy, price: u32) -> Fixture {
    let store = InMemoryStore::new();
    let clock = afternoon();
    let experience = fixtures::experience("Kayaking", price, clock.now());
    store.add_experience(experience.clone());

    let admission = BookingAdmission::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
        policy,
        Pricing::default(),
    );
    Fixture {
        admission,
        store,
        experience,
        clock,
    }
}

fn fixture() -> Fixture {
    fixture_with(SlotPolicy::default(), 999)
}

fn request(experience_id: ExperienceId, date: &str, time: &str) -> BookingRequest {
    BookingRequest {
        experience_id: Some(experience_id.to_string()),
        date: Some(date.to_string()),
        time: Some(time.to_string()),
        quantity: Some(1),
        full_name: Some("Alice Example".to_string()),
        email: Some("alice@example.com".to_string()),
        promo_code: None,
    }
}

fn day(now: DateTime<Utc>, offset: i64) -> String {
    (now.date_naive() + Duration::days(offset))
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn test_window_edges() {
    let f = fixture();
    let now = f.clock.now();

    for offset in [0, 6] {
        let booking = f
            .admission
            .admit(&request(f.experience.id, &day(now, offset), "09:00"))
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    for offset in [-1, 7, 30] {
        let err = f
            .admission
            .admit(&request(f.experience.id, &day(now, offset), "09:00"))
            .await
            .unwrap_err();
        assert_eq!(err, AdmissionError::DateNotAvailable, "offset {offset}");
    }

    assert_eq!(f.store.bookings().len(), 2);
}

#[tokio::test]
async fn test_timestamp_dates_use_configured_offset() {
    // UTC+05:30: 20:00 UTC on the 10th is already the 11th locally.
    let policy = SlotPolicy::from_parts(7, "07:00,09:00,11:00,13:00,15:00", 330).unwrap();
    let f = fixture_with(policy, 999);

    // 19:00 UTC on the 16th is 00:30 on the 17th locally, day 6 of the window.
    let booking = f
        .admission
        .admit(&request(f.experience.id, "2025-03-16T19:00:00Z", "07:00"))
        .await
        .unwrap();
    assert_eq!(booking.date, NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());

    // Local today is the 11th: the 10th is past and the 18th is day 7.
    for date in ["2025-03-10", "2025-03-18", "2025-03-17T19:00:00Z"] {
        let err = f
            .admission
            .admit(&request(f.experience.id, date, "09:00"))
            .await
            .unwrap_err();
        assert_eq!(err, AdmissionError::DateNotAvailable, "{date}");
    }

    f.admission
        .admit(&request(f.experience.id, "2025-03-11", "07:00"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_validation_order() {
    let f = fixture();
    let unknown = ExperienceId::new();

    let cases = [
        (
            BookingRequest {
                experience_id: Some("not-a-uuid".to_string()),
                date: None,
                ..request(unknown, "x", "x")
            },
            AdmissionError::MissingFields,
        ),
        (
            BookingRequest {
                experience_id: Some("not-a-uuid".to_string()),
                ..request(unknown, "bad", "bad")
            },
            AdmissionError::InvalidExperienceId,
        ),
        (request(unknown, "bad", "bad"), AdmissionError::ExperienceNotFound),
        (
            request(f.experience.id, "bad", "bad"),
            AdmissionError::DateNotAvailable,
        ),
        (
            request(f.experience.id, "2025-03-10", "10:00"),
            AdmissionError::TimeNotAvailable,
        ),
        (
            request(f.experience.id, "2025-03-10", "9:00"),
            AdmissionError::TimeNotAvailable,
        ),
    ];

    for (request, expected) in cases {
        assert_eq!(f.admission.admit(&request).await.unwrap_err(), expected);
    }
    assert!(f.store.bookings().is_empty());
}

#[tokio::test]
async fn test_inactive_experience_is_not_bookable() {
    let f = fixture();
    let retired = Experience {
        active: false,
        ..fixtures::experience("Retired Tour", 500, f.clock.now())
    };
    f.store.add_experience(retired.clone());

    let err = f
        .admission
        .admit(&request(retired.id, "2025-03-11", "09:00"))
        .await
        .unwrap_err();
    assert_eq!(err, AdmissionError::ExperienceNotFound);
    assert!(f.store.bookings().is_empty());
}

#[tokio::test]
async fn test_pricing_and_promo_storage() {
    let f = fixture_with(SlotPolicy::default(), 899);
    let booking = f
        .admission
        .admit(&BookingRequest {
            quantity: Some(2),
            promo_code: Some(" save10 ".to_string()),
            ..request(f.experience.id, "2025-03-11", "15:00")
        })
        .await
        .unwrap();

    assert_eq!(booking.price.subtotal, 1798);
    assert_eq!(booking.price.taxes, 90);
    assert_eq!(booking.price.total, 1888);
    assert_eq!(booking.promo_code.as_deref(), Some("SAVE10"));
    assert_eq!(booking.quantity, 2);
}

#[tokio::test]
async fn test_zero_price_uses_default() {
    let f = fixture_with(SlotPolicy::default(), 0);
    let booking = f
        .admission
        .admit(&request(f.experience.id, "2025-03-10", "07:00"))
        .await
        .unwrap();
    assert_eq!(booking.price.total, 1049);
}

#[tokio::test]
async fn test_cancelled_booking_does_not_hold_slot() {
    let f = fixture();
    let date = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
    f.store.add_booking_unchecked(fixtures::booking(
        f.experience.id,
        date,
        "11:00",
        BookingStatus::Cancelled,
        f.clock.now(),
    ));

    f.admission
        .admit(&request(f.experience.id, "2025-03-12", "11:00"))
        .await
        .unwrap();

    let err = f
        .admission
        .admit(&request(f.experience.id, "2025-03-12", "11:00"))
        .await
        .unwrap_err();
    assert_eq!(err, AdmissionError::SlotTaken);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admissions_hold_slot_once() {
    let f = fixture();
    let req = request(f.experience.id, "2025-03-13", "13:00");

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let admission = f.admission.clone();
            let req = req.clone();
            tokio::spawn(async move { admission.admit(&req).await })
        })
        .collect();

    let mut admitted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(e) => assert!(
                matches!(e, AdmissionError::SlotTaken | AdmissionError::DuplicateBooking),
                "{e:?}"
            ),
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(f.store.bookings().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_store_insert_decides_when_precheck_is_stale() {
    let (admission, ledger, experience) = flaky(Flakiness {
        stale_precheck: true,
        ..Flakiness::default()
    });
    let req = request(experience.id, "2025-03-13", "13:00");

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let admission = admission.clone();
            let req = req.clone();
            tokio::spawn(async move { admission.admit(&req).await })
        })
        .collect();

    let mut admitted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(e) => assert_eq!(e, AdmissionError::DuplicateBooking),
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(ledger.attempts.load(Ordering::SeqCst), 16);
    assert_eq!(ledger.inner.bookings().len(), 1);
}

#[tokio::test]
async fn test_store_failure() {
    let f = fixture();
    f.store.set_unavailable(true);
    let err = f
        .admission
        .admit(&request(f.experience.id, "2025-03-10", "07:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, AdmissionError::Store(StoreError::Database(_))));
}

#[derive(Default)]
struct Flakiness {
    /// Inserts that report a reference collision before succeeding.
    collisions: usize,
    /// Every insert loses the slot to a concurrent one.
    lose_race: bool,
    /// The slot pre-check always reports the slot free.
    stale_precheck: bool,
}

/// Ledger over the in-memory store with injected failures.
struct FlakyLedger {
    inner: InMemoryStore,
    flakiness: Flakiness,
    attempts: AtomicUsize,
}

#[async_trait]
impl BookingStore for FlakyLedger {
    async fn active_slots(
        &self,
        experience_id: ExperienceId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<BookedSlot>, StoreError> {
        self.inner.active_slots(experience_id, from, until).await
    }

    async fn is_slot_taken(&self, slot: &SlotKey) -> Result<bool, StoreError> {
        if self.flakiness.stale_precheck {
            return Ok(false);
        }
        self.inner.is_slot_taken(slot).await
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), StoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.flakiness.lose_race {
            return Err(StoreError::SlotTaken);
        }
        if attempt < self.flakiness.collisions {
            return Err(StoreError::DuplicateReference);
        }
        self.inner.insert_booking(booking).await
    }

    async fn find_booking(
        &self,
        reference: &BookingReference,
    ) -> Result<Option<Booking>, StoreError> {
        self.inner.find_booking(reference).await
    }

    async fn cancel_booking(
        &self,
        reference: &BookingReference,
        at: DateTime<Utc>,
    ) -> Result<Booking, StoreError> {
        self.inner.cancel_booking(reference, at).await
    }
}

fn flaky(flakiness: Flakiness) -> (BookingAdmission, Arc<FlakyLedger>, Experience) {
    let store = InMemoryStore::new();
    let clock = afternoon();
    let experience = fixtures::experience("Kayaking", 999, clock.now());
    store.add_experience(experience.clone());

    let ledger = Arc::new(FlakyLedger {
        inner: store.clone(),
        flakiness,
        attempts: AtomicUsize::new(0),
    });
    let admission = BookingAdmission::new(
        Arc::new(store),
        ledger.clone(),
        Arc::new(clock),
        SlotPolicy::default(),
        Pricing::default(),
    );
    (admission, ledger, experience)
}

#[tokio::test]
async fn test_reference_collision_is_retried() {
    let (admission, ledger, experience) = flaky(Flakiness {
        collisions: 2,
        ..Flakiness::default()
    });
    let booking = admission
        .admit(&request(experience.id, "2025-03-10", "07:00"))
        .await
        .unwrap();

    assert_eq!(ledger.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(ledger.inner.bookings(), vec![booking]);
}

#[tokio::test]
async fn test_reference_attempts_are_bounded() {
    let (admission, ledger, experience) = flaky(Flakiness {
        collisions: usize::MAX,
        ..Flakiness::default()
    });
    let err = admission
        .admit(&request(experience.id, "2025-03-10", "07:00"))
        .await
        .unwrap_err();

    assert_eq!(err, AdmissionError::ReferenceExhausted);
    assert_eq!(
        ledger.attempts.load(Ordering::SeqCst),
        bookings::admission::MAX_REFERENCE_ATTEMPTS
    );
}

#[tokio::test]
async fn test_lost_race_is_duplicate_booking() {
    let (admission, _ledger, experience) = flaky(Flakiness {
        lose_race: true,
        ..Flakiness::default()
    });
    let err = admission
        .admit(&request(experience.id, "2025-03-10", "07:00"))
        .await
        .unwrap_err();
    assert_eq!(err, AdmissionError::DuplicateBooking);
}
