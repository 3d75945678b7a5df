//! Promotional codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized promo code: trimmed and uppercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromoCode(String);

impl PromoCode {
    /// Normalize user input. Blank input yields `None`.
    ///
    /// ```
    /// use experiences_core::PromoCode;
    ///
    /// assert_eq!(PromoCode::parse(" save10 ").unwrap().as_str(), "SAVE10");
    /// assert!(PromoCode::parse("   ").is_none());
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let code = input.trim();
        if code.is_empty() {
            None
        } else {
            Some(Self(code.to_uppercase()))
        }
    }

    /// The code text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a promo's amount is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// Percentage of the subtotal
    Percent,
    /// Fixed amount in the smallest currency unit
    Flat,
}

impl DiscountKind {
    /// Storage and wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percent => "percent",
            Self::Flat => "flat",
        }
    }

    /// Parse the storage spelling.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "percent" => Some(Self::Percent),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }
}

/// A promotion record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promo {
    /// Unique uppercase code
    pub code: PromoCode,
    /// Discount type
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    /// Discount amount
    pub amount: u32,
    /// Optional expiry
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the promo may be used at all
    pub active: bool,
}

impl Promo {
    /// Active and, if it has an expiry, not yet expired at `now`.
    #[must_use]
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_none_or(|expiry| expiry > now)
    }
}
