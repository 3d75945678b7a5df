//! Development catalog.
//!
//! [`seed_catalog`] replaces every experience, promo and booking with a
//! small fixed catalog so a fresh database can be explored by hand.

use crate::config::SlotPolicy;
use chrono::{DateTime, Duration, Utc};
use experiences_core::{
    CatalogSeeder, DiscountKind, Experience, ExperienceId, Promo, PromoCode, ScheduledDate,
    StoreError, TimeLabel, TimeSlotTemplate,
};
use serde::Serialize;

/// Days covered by each seeded descriptive schedule.
const SCHEDULE_DAYS: usize = 5;

/// Advertised group size in seeded schedules.
const SCHEDULE_CAPACITY: u32 = 10;

/// Seed response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    /// Always `true` on success
    pub ok: bool,
    /// Number of experiences created
    pub created: usize,
    /// The created experiences
    pub examples: Vec<SeedExample>,
}

/// One seeded experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedExample {
    /// Experience ID
    pub id: ExperienceId,
    /// Display title
    pub title: String,
    /// Image reference
    pub image: String,
}

fn schedule(policy: &SlotPolicy, now: DateTime<Utc>, times: &[&str]) -> Vec<ScheduledDate> {
    let slots: Vec<TimeSlotTemplate> = times
        .iter()
        .filter_map(|time| TimeLabel::parse(time).ok())
        .map(|time| TimeSlotTemplate::open(time, SCHEDULE_CAPACITY))
        .collect();

    policy
        .today(now)
        .iter_days()
        .take(SCHEDULE_DAYS)
        .map(|date| ScheduledDate {
            date,
            time_slots: slots.clone(),
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// The development experiences.
#[must_use]
pub fn experiences(policy: &SlotPolicy, now: DateTime<Utc>) -> Vec<Experience> {
    vec![
        Experience::new(
            "Kayaking",
            "Curated small-group experience with certified guide and safety gear.",
            999,
            "Udupi, Karnataka",
            "/uploads/kayaking.jpg",
            now,
        )
        .with_included_items(strings(&["Certified guide", "Safety gear", "Kayak"]))
        .with_requirements(strings(&["Comfortable clothing", "Basic swimming ability"]))
        .with_schedule(schedule(policy, now, &["07:00", "09:00", "11:00", "13:00"])),
        Experience::new(
            "Nandi Hills Sunrise",
            "Sunrise trek with panoramic views and breakfast included.",
            899,
            "Bangalore",
            "/uploads/nandi_hills.jpg",
            now,
        )
        .with_included_items(strings(&["Guide", "Breakfast"]))
        .with_requirements(strings(&["Walking shoes"]))
        .with_schedule(schedule(policy, now, &["05:30", "06:30", "07:30"])),
        Experience::new(
            "Coffee Trail",
            "Walk through coffee plantations with guided tastings.",
            1299,
            "Coorg",
            "/uploads/coffee_trail.jpg",
            now,
        )
        .with_included_items(strings(&["Plantation walk", "Tasting session"]))
        .with_schedule(schedule(policy, now, &["08:00", "10:00", "14:00"])),
    ]
}

/// The development promos, valid for a year from `now`.
#[must_use]
pub fn promos(now: DateTime<Utc>) -> Vec<Promo> {
    let expires_at = Some(now + Duration::days(365));
    [
        ("SAVE10", DiscountKind::Percent, 10),
        ("FLAT100", DiscountKind::Flat, 100),
    ]
    .into_iter()
    .filter_map(|(code, kind, amount)| {
        Some(Promo {
            code: PromoCode::parse(code)?,
            kind,
            amount,
            expires_at,
            active: true,
        })
    })
    .collect()
}

/// Replace the whole catalog with the development data.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the replacement fails; nothing is
/// changed in that case.
#[tracing::instrument(skip_all)]
pub async fn seed_catalog(
    seeder: &dyn CatalogSeeder,
    policy: &SlotPolicy,
    now: DateTime<Utc>,
) -> Result<SeedSummary, StoreError> {
    let experiences = experiences(policy, now);
    seeder.replace_catalog(&experiences, &promos(now)).await?;

    tracing::info!(created = experiences.len(), "Catalog seeded");
    Ok(SeedSummary {
        ok: true,
        created: experiences.len(),
        examples: experiences
            .into_iter()
            .map(|e| SeedExample {
                id: e.id,
                title: e.title,
                image: e.image,
            })
            .collect(),
    })
}

/// Seed only when no experience exists yet.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if counting or seeding fails.
pub async fn seed_if_empty(
    seeder: &dyn CatalogSeeder,
    policy: &SlotPolicy,
    now: DateTime<Utc>,
) -> Result<Option<SeedSummary>, StoreError> {
    if seeder.experience_count().await? > 0 {
        tracing::info!("Catalog already populated, skipping seed");
        return Ok(None);
    }
    seed_catalog(seeder, policy, now).await.map(Some)
}
