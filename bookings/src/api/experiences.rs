//! Catalog endpoints.
//!
//! - GET /experiences - Active experiences (requires auth)
//! - GET /experiences/:id - One experience with live availability (requires auth)

use crate::availability::Availability;
use crate::server::{AppState, SessionUser};
use axum::{
    Json,
    extract::{Path, State},
};
use experiences_core::{Experience, ExperienceId};
use experiences_web::AppError;
use serde_json::Value;

/// List active experiences.
///
/// # Errors
///
/// 403 without a live session, 500 on storage failure.
pub async fn list_experiences(
    State(state): State<AppState>,
    _user: SessionUser,
) -> Result<Json<Vec<Experience>>, AppError> {
    let experiences = state.stores.experiences.list_experiences().await?;
    Ok(Json(experiences))
}

/// One experience.
///
/// The stored schedule in `availableDates` is replaced by the calculated
/// window: `availableDates` lists open days, `availableTimes` the offered
/// labels and `openSlots` the open labels per day. `price` is the quoting
/// price.
///
/// # Errors
///
/// 400 for a malformed id, 403 without a live session, 404 if unknown or
/// inactive.
pub async fn get_experience(
    State(state): State<AppState>,
    _user: SessionUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id: ExperienceId = id
        .parse()
        .map_err(|_| AppError::bad_request("Invalid experience ID").with_code("INVALID_EXPERIENCE_ID"))?;

    let experience = state
        .stores
        .experiences
        .get_experience(id)
        .await?
        .filter(|e| e.active)
        .ok_or_else(|| AppError::not_found("Experience not found").with_code("EXPERIENCE_NOT_FOUND"))?;

    let availability = Availability::for_experience(
        state.stores.bookings.as_ref(),
        &state.policy,
        id,
        state.clock.now(),
    )
    .await?;

    Ok(Json(detail(&experience, availability)?))
}

fn detail(experience: &Experience, availability: Availability) -> Result<Value, AppError> {
    let mut body = serde_json::to_value(experience)
        .map_err(|e| AppError::internal("Internal server error").with_source(e))?;

    if let Value::Object(fields) = &mut body {
        fields.insert("price".into(), experience.effective_price().into());
        fields.insert("availableDates".into(), availability.available_dates.into());
        fields.insert("availableTimes".into(), availability.available_times.into());
        fields.insert(
            "openSlots".into(),
            serde_json::to_value(availability.open_slots)
                .map_err(|e| AppError::internal("Internal server error").with_source(e))?,
        );
    }
    Ok(body)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SlotPolicy;
    use experiences_core::Clock;
    use experiences_testing::{fixtures, test_clock};

    #[test]
    fn test_detail_overrides_schedule_and_price() {
        let now = test_clock().now();
        let experience = fixtures::experience("Free Walk", 0, now);
        let availability = Availability::calculate(&SlotPolicy::default(), now, &[]);

        let body = detail(&experience, availability).unwrap();

        assert_eq!(body["price"], 999);
        assert_eq!(body["title"], "Free Walk");
        assert_eq!(body["availableDates"].as_array().unwrap().len(), 7);
        assert_eq!(body["availableTimes"].as_array().unwrap().len(), 5);
        assert!(body["availableDates"][0].is_string());
        assert_eq!(body["openSlots"].as_object().unwrap().len(), 7);
    }
}
