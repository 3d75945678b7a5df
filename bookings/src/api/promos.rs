//! POST /promos/validate

use crate::promo::{PromoRequest, PromoValidation};
use crate::server::AppState;
use axum::{Json, extract::State};
use experiences_web::{ApiJson, AppError};

/// Report whether a promo code can be redeemed.
///
/// # Errors
///
/// 400 for a malformed body, 500 on storage failure.
pub async fn validate_promo(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PromoRequest>,
) -> Result<Json<PromoValidation>, AppError> {
    let validation = state.promos.validate(request.code.as_deref()).await?;
    Ok(Json(validation))
}
