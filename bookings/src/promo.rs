//! Promo code validation.
//!
//! Validation is a pure lookup: it never changes stored state and its result
//! is not used in pricing.

use crate::metrics;
use chrono::{DateTime, Utc};
use experiences_core::{Clock, DiscountKind, PromoCode, PromoStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Promo validation request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromoRequest {
    /// Code as typed by the user; case and surrounding space are ignored
    pub code: Option<String>,
}

/// Validation result. Discount terms are present only when valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoValidation {
    /// Whether the code exists, is active and has not expired
    pub valid: bool,
    /// Discount type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<DiscountKind>,
    /// Discount amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
    /// Expiry, if the promo has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PromoValidation {
    const fn invalid() -> Self {
        Self {
            valid: false,
            kind: None,
            amount: None,
            expires_at: None,
        }
    }
}

/// Looks up promo codes.
#[derive(Clone)]
pub struct PromoValidator {
    promos: Arc<dyn PromoStore>,
    clock: Arc<dyn Clock>,
}

impl PromoValidator {
    /// Create a validator over `promos`.
    #[must_use]
    pub fn new(promos: Arc<dyn PromoStore>, clock: Arc<dyn Clock>) -> Self {
        Self { promos, clock }
    }

    /// Report whether `code` can be redeemed now.
    ///
    /// A missing or blank code is simply invalid.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the lookup fails.
    #[tracing::instrument(skip(self))]
    pub async fn validate(&self, code: Option<&str>) -> Result<PromoValidation, StoreError> {
        let Some(code) = code.and_then(PromoCode::parse) else {
            metrics::record_promo_validation(false);
            return Ok(PromoValidation::invalid());
        };

        let validation = match self.promos.find_promo(&code).await? {
            Some(promo) if promo.is_redeemable(self.clock.now()) => PromoValidation {
                valid: true,
                kind: Some(promo.kind),
                amount: Some(promo.amount),
                expires_at: promo.expires_at,
            },
            _ => PromoValidation::invalid(),
        };

        metrics::record_promo_validation(validation.valid);
        tracing::debug!(%code, valid = validation.valid, "Validated promo code");
        Ok(validation)
    }
}
