//! Application state shared across all HTTP handlers.

use crate::admission::BookingAdmission;
use crate::config::{AppEnv, BookingConfig, SlotPolicy};
use crate::ledger::BookingLedger;
use crate::pricing::Pricing;
use crate::promo::PromoValidator;
use experiences_auth::AuthService;
use experiences_core::{BookingStore, CatalogSeeder, Clock, ExperienceStore, PromoStore};
use std::sync::Arc;

/// Storage backends, one handle per concern.
#[derive(Clone)]
pub struct Stores {
    /// Catalog reads
    pub experiences: Arc<dyn ExperienceStore>,
    /// Booking ledger
    pub bookings: Arc<dyn BookingStore>,
    /// Promo lookup
    pub promos: Arc<dyn PromoStore>,
    /// Development seeding
    pub seeder: Arc<dyn CatalogSeeder>,
}

impl Stores {
    /// Use one backend for every concern.
    #[must_use]
    pub fn shared<T>(store: Arc<T>) -> Self
    where
        T: ExperienceStore + BookingStore + PromoStore + CatalogSeeder + 'static,
    {
        Self {
            experiences: store.clone(),
            bookings: store.clone(),
            promos: store.clone(),
            seeder: store,
        }
    }
}

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Storage backends
    pub stores: Stores,
    /// Accounts and sessions
    pub auth: AuthService,
    /// Source of "now"
    pub clock: Arc<dyn Clock>,
    /// Booking creation
    pub admission: BookingAdmission,
    /// Booking lookup and cancellation
    pub ledger: BookingLedger,
    /// Promo lookup
    pub promos: PromoValidator,
    /// Window and time labels
    pub policy: SlotPolicy,
    /// Deployment environment
    pub app_env: AppEnv,
}

impl AppState {
    /// Wire the domain services over `stores`.
    #[must_use]
    pub fn new(
        stores: Stores,
        auth: AuthService,
        clock: Arc<dyn Clock>,
        booking: &BookingConfig,
        app_env: AppEnv,
    ) -> Self {
        let admission = BookingAdmission::new(
            stores.experiences.clone(),
            stores.bookings.clone(),
            clock.clone(),
            booking.slots.clone(),
            Pricing::new(booking.tax_basis_points),
        );
        let ledger = BookingLedger::new(stores.bookings.clone(), clock.clone());
        let promos = PromoValidator::new(stores.promos.clone(), clock.clone());

        Self {
            stores,
            auth,
            clock,
            admission,
            ledger,
            promos,
            policy: booking.slots.clone(),
            app_env,
        }
    }
}
