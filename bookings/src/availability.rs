//! Open slot calculation.
//!
//! Availability is always derived: the window and time labels come from
//! [`SlotPolicy`], and a label is consumed on a day when an active booking of
//! the experience holds it. The catalog's stored slot template is never
//! consulted.

use crate::config::SlotPolicy;
use chrono::{DateTime, NaiveDate, Utc};
use experiences_core::{BookedSlot, BookingStore, ExperienceId, StoreError};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Bookable dates and times for one experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// Window days (`YYYY-MM-DD`) with at least one open label, in order
    pub available_dates: Vec<String>,
    /// Every offered label, not narrowed per day
    pub available_times: Vec<String>,
    /// Open labels for each listed day
    pub open_slots: BTreeMap<String, Vec<String>>,
}

impl Availability {
    /// Subtract `booked` from the window that starts at `now`.
    ///
    /// Slots outside the window are ignored; a day is listed only while at
    /// least one label remains open.
    #[must_use]
    pub fn calculate(policy: &SlotPolicy, now: DateTime<Utc>, booked: &[BookedSlot]) -> Self {
        let mut consumed: HashMap<NaiveDate, HashSet<&str>> = HashMap::new();
        for slot in booked {
            consumed.entry(slot.date).or_default().insert(slot.time.as_str());
        }

        let mut available_dates = Vec::new();
        let mut open_slots = BTreeMap::new();
        for day in policy.window(now) {
            let taken = consumed.get(&day);
            let open: Vec<String> = policy
                .time_labels()
                .iter()
                .filter(|label| taken.is_none_or(|t| !t.contains(label.as_str())))
                .map(ToString::to_string)
                .collect();

            if !open.is_empty() {
                let key = day.format("%Y-%m-%d").to_string();
                available_dates.push(key.clone());
                open_slots.insert(key, open);
            }
        }

        Self {
            available_dates,
            available_times: policy.time_labels().iter().map(ToString::to_string).collect(),
            open_slots,
        }
    }

    /// Load the experience's active slots within the window and calculate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the ledger cannot be read.
    #[tracing::instrument(skip(bookings, policy))]
    pub async fn for_experience(
        bookings: &dyn BookingStore,
        policy: &SlotPolicy,
        experience_id: ExperienceId,
        now: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        let window = policy.window(now);
        let (Some(&from), Some(&until)) = (window.first(), window.last()) else {
            return Ok(Self::calculate(policy, now, &[]));
        };

        let booked = bookings.active_slots(experience_id, from, until).await?;
        let availability = Self::calculate(policy, now, &booked);
        tracing::debug!(
            booked = booked.len(),
            open_days = availability.available_dates.len(),
            "Calculated availability"
        );
        Ok(availability)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use experiences_core::TimeLabel;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 30, 0).unwrap()
    }

    fn slot(date: &str, time: &str) -> BookedSlot {
        BookedSlot::parse(date, time).unwrap()
    }

    #[test]
    fn test_empty_ledger_lists_whole_window() {
        let availability = Availability::calculate(&SlotPolicy::default(), now(), &[]);

        assert_eq!(
            availability.available_dates,
            [
                "2025-03-10", "2025-03-11", "2025-03-12", "2025-03-13", "2025-03-14",
                "2025-03-15", "2025-03-16"
            ]
        );
        assert_eq!(
            availability.available_times,
            ["07:00", "09:00", "11:00", "13:00", "15:00"]
        );
        assert_eq!(availability.open_slots["2025-03-12"].len(), 5);
    }

    #[test]
    fn test_partially_booked_day_narrows_open_slots_only() {
        let booked = [slot("2025-03-11", "09:00"), slot("2025-03-11", "13:00")];
        let availability = Availability::calculate(&SlotPolicy::default(), now(), &booked);

        assert!(availability.available_dates.contains(&"2025-03-11".to_string()));
        assert_eq!(availability.open_slots["2025-03-11"], ["07:00", "11:00", "15:00"]);
        assert_eq!(availability.available_times.len(), 5);
    }

    #[test]
    fn test_fully_booked_day_is_omitted() {
        let booked: Vec<BookedSlot> = ["07:00", "09:00", "11:00", "13:00", "15:00"]
            .iter()
            .map(|time| slot("2025-03-12", time))
            .collect();
        let availability = Availability::calculate(&SlotPolicy::default(), now(), &booked);

        assert_eq!(availability.available_dates.len(), 6);
        assert!(!availability.available_dates.contains(&"2025-03-12".to_string()));
        assert!(!availability.open_slots.contains_key("2025-03-12"));
    }

    #[test]
    fn test_unoffered_labels_and_outside_days_are_ignored() {
        let booked = [slot("2025-03-10", "10:30"), slot("2025-03-30", "09:00")];
        let availability = Availability::calculate(&SlotPolicy::default(), now(), &booked);

        assert_eq!(availability.available_dates.len(), 7);
        assert_eq!(availability.open_slots["2025-03-10"].len(), 5);
    }

    #[test]
    fn test_window_follows_configured_offset() {
        // 20:00 UTC on the 10th is the 11th at +05:30.
        let late = Utc.with_ymd_and_hms(2025, 3, 10, 20, 0, 0).unwrap();
        let policy = SlotPolicy::from_parts(7, "09:00", 330).unwrap();
        let availability = Availability::calculate(&policy, late, &[]);

        assert_eq!(availability.available_dates[0], "2025-03-11");
    }

    proptest! {
        #[test]
        fn prop_dates_are_consecutive_from_today(hours in 0i64..24 * 365) {
            let at = now() + Duration::hours(hours);
            let policy = SlotPolicy::default();
            let availability = Availability::calculate(&policy, at, &[]);

            prop_assert_eq!(availability.available_dates.len(), 7);
            let today = policy.today(at);
            for (offset, date) in availability.available_dates.iter().enumerate() {
                let expected = today + Duration::days(i64::try_from(offset).unwrap());
                prop_assert_eq!(date, &expected.format("%Y-%m-%d").to_string());
            }
        }

        #[test]
        fn prop_booked_labels_never_open(
            day in 0i64..7,
            picks in proptest::collection::vec(0usize..5, 0..8),
        ) {
            let policy = SlotPolicy::default();
            let date = policy.today(now()) + Duration::days(day);
            let labels: Vec<TimeLabel> = policy.time_labels().to_vec();
            let booked: Vec<BookedSlot> = picks
                .iter()
                .map(|&i| BookedSlot { date, time: labels[i].clone() })
                .collect();

            let availability = Availability::calculate(&policy, now(), &booked);
            let key = date.format("%Y-%m-%d").to_string();
            match availability.open_slots.get(&key) {
                Some(open) => {
                    for slot in &booked {
                        prop_assert!(!open.contains(&slot.time.to_string()));
                    }
                }
                None => {
                    let distinct: HashSet<usize> = picks.iter().copied().collect();
                    prop_assert_eq!(distinct.len(), 5);
                }
            }
        }
    }
}
