//! In-memory implementation of every storage trait.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use experiences_core::{
    BookedSlot, Booking, BookingReference, BookingStore, CatalogSeeder, Experience, ExperienceId,
    ExperienceStore, Promo, PromoCode, PromoStore, SlotKey, StoreError,
};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    experiences: Vec<Experience>,
    bookings: Vec<Booking>,
    promos: Vec<Promo>,
    unavailable: bool,
}

/// Catalog, ledger and promo storage behind one lock.
///
/// `insert_booking` checks the active-slot and reference constraints and
/// inserts under the same guard, matching the atomicity of the PostgreSQL
/// unique indexes.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an experience directly, bypassing seeding.
    pub fn add_experience(&self, experience: Experience) {
        if let Ok(mut state) = self.state.lock() {
            state.experiences.push(experience);
        }
    }

    /// Add a promo directly.
    pub fn add_promo(&self, promo: Promo) {
        if let Ok(mut state) = self.state.lock() {
            state.promos.retain(|p| p.code != promo.code);
            state.promos.push(promo);
        }
    }

    /// Add a booking without any constraint checks.
    pub fn add_booking_unchecked(&self, booking: Booking) {
        if let Ok(mut state) = self.state.lock() {
            state.bookings.push(booking);
        }
    }

    /// Snapshot of every stored booking, in insertion order.
    #[must_use]
    pub fn bookings(&self) -> Vec<Booking> {
        self.state
            .lock()
            .map(|state| state.bookings.clone())
            .unwrap_or_default()
    }

    /// Make every subsequent operation fail with [`StoreError::Database`].
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.unavailable = unavailable;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        let state = self
            .state
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".to_string()))?;
        if state.unavailable {
            return Err(StoreError::Database("store unavailable".to_string()));
        }
        Ok(state)
    }
}

#[async_trait]
impl ExperienceStore for InMemoryStore {
    async fn list_experiences(&self) -> Result<Vec<Experience>, StoreError> {
        Ok(self
            .lock()?
            .experiences
            .iter()
            .filter(|e| e.active)
            .cloned()
            .collect())
    }

    async fn get_experience(&self, id: ExperienceId) -> Result<Option<Experience>, StoreError> {
        Ok(self
            .lock()?
            .experiences
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn active_slots(
        &self,
        experience_id: ExperienceId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<BookedSlot>, StoreError> {
        Ok(self
            .lock()?
            .bookings
            .iter()
            .filter(|b| {
                b.experience_id == experience_id
                    && b.status.is_active()
                    && (from..=until).contains(&b.date)
            })
            .map(|b| BookedSlot {
                date: b.date,
                time: b.time.clone(),
            })
            .collect())
    }

    async fn is_slot_taken(&self, slot: &SlotKey) -> Result<bool, StoreError> {
        Ok(self
            .lock()?
            .bookings
            .iter()
            .any(|b| b.status.is_active() && b.slot_key() == *slot))
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut state = self.lock()?;

        if state.bookings.iter().any(|b| b.reference == booking.reference) {
            return Err(StoreError::DuplicateReference);
        }

        let slot = booking.slot_key();
        if booking.status.is_active()
            && state
                .bookings
                .iter()
                .any(|b| b.status.is_active() && b.slot_key() == slot)
        {
            return Err(StoreError::SlotTaken);
        }

        state.bookings.push(booking.clone());
        Ok(())
    }

    async fn find_booking(
        &self,
        reference: &BookingReference,
    ) -> Result<Option<Booking>, StoreError> {
        Ok(self
            .lock()?
            .bookings
            .iter()
            .find(|b| b.reference == *reference)
            .cloned())
    }

    async fn cancel_booking(
        &self,
        reference: &BookingReference,
        at: DateTime<Utc>,
    ) -> Result<Booking, StoreError> {
        let mut state = self.lock()?;
        let booking = state
            .bookings
            .iter_mut()
            .find(|b| b.reference == *reference)
            .ok_or_else(|| StoreError::NotFound(reference.to_string()))?;
        booking.cancel(at)?;
        Ok(booking.clone())
    }
}

#[async_trait]
impl PromoStore for InMemoryStore {
    async fn find_promo(&self, code: &PromoCode) -> Result<Option<Promo>, StoreError> {
        Ok(self
            .lock()?
            .promos
            .iter()
            .find(|p| p.code == *code)
            .cloned())
    }
}

#[async_trait]
impl CatalogSeeder for InMemoryStore {
    async fn replace_catalog(
        &self,
        experiences: &[Experience],
        promos: &[Promo],
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.bookings.clear();
        state.experiences = experiences.to_vec();
        state.promos = promos.to_vec();
        Ok(())
    }

    async fn experience_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.experiences.len() as u64)
    }
}
