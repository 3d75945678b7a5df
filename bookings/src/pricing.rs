//! Price breakdown for a booking.
//!
//! `subtotal = unit price * quantity`, `taxes = subtotal * rate` rounded
//! half away from zero, `total = subtotal + taxes`. All amounts are in the
//! smallest currency unit.

use crate::config::DEFAULT_TAX_BASIS_POINTS;
use experiences_core::PriceBreakdown;

const BASIS_POINTS: u128 = 10_000;

/// Tax rate applied to booking subtotals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    tax_basis_points: u32,
}

impl Default for Pricing {
    fn default() -> Self {
        Self::new(DEFAULT_TAX_BASIS_POINTS)
    }
}

impl Pricing {
    /// A tax rate of `tax_basis_points / 10_000`.
    #[must_use]
    pub const fn new(tax_basis_points: u32) -> Self {
        Self { tax_basis_points }
    }

    /// The configured rate in basis points.
    #[must_use]
    pub const fn tax_basis_points(&self) -> u32 {
        self.tax_basis_points
    }

    /// Tax on `subtotal`, rounded half up.
    #[must_use]
    pub fn taxes_for(&self, subtotal: u64) -> u64 {
        let scaled = u128::from(subtotal) * u128::from(self.tax_basis_points);
        let rounded = (scaled + BASIS_POINTS / 2) / BASIS_POINTS;
        u64::try_from(rounded).unwrap_or(u64::MAX)
    }

    /// Breakdown for `quantity` places at `unit_price`.
    ///
    /// ```
    /// use bookings::pricing::Pricing;
    ///
    /// let price = Pricing::default().quote(899, 2);
    /// assert_eq!((price.subtotal, price.taxes, price.total), (1798, 90, 1888));
    /// ```
    #[must_use]
    pub fn quote(&self, unit_price: u32, quantity: u32) -> PriceBreakdown {
        let subtotal = u64::from(unit_price) * u64::from(quantity);
        PriceBreakdown::new(subtotal, self.taxes_for(subtotal))
    }
}
