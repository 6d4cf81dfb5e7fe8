//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are computed by the backend. The storefront only multiplies them by
//! quantities and sums them for display, so all arithmetic stays in
//! [`Decimal`] to avoid float drift.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the default currency (USD).
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// A zero amount in the default currency.
    #[must_use]
    pub const fn zero() -> Self {
        Self::usd(Decimal::ZERO)
    }

    /// Multiply by a unit count.
    #[must_use]
    pub fn times(self, units: u32) -> Self {
        Self::new(self.amount * Decimal::from(units), self.currency_code)
    }

    /// Add another amount, keeping this price's currency.
    #[must_use]
    pub fn plus(self, other: Decimal) -> Self {
        Self::new(self.amount + other, self.currency_code)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{:.2}",
            self.currency_code.symbol(),
            self.amount
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol used for display.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}
