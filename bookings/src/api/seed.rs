//! POST /seed

use crate::seed::{SeedSummary, seed_catalog};
use crate::server::AppState;
use axum::{Json, extract::State};
use experiences_web::AppError;

/// Replace the catalog with development data.
///
/// # Errors
///
/// 403 in production, 500 on storage failure.
pub async fn seed(State(state): State<AppState>) -> Result<Json<SeedSummary>, AppError> {
    if state.app_env.is_production() {
        return Err(AppError::forbidden("Forbidden in production mode"));
    }

    let summary = seed_catalog(state.stores.seeder.as_ref(), &state.policy, state.clock.now()).await?;
    Ok(Json(summary))
}
