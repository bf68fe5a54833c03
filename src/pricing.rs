//! Pricing
//!
//! Checkout totals shown next to the cart, and money formatting.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso};
use thiserror::Error;

use crate::cart::Cart;

/// Subtotals strictly above this ship for free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Shipping charged at or below the free-shipping threshold.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

/// Sales tax rate applied to the subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Errors raised while resolving pricing settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The currency code is not an ISO 4217 code known to the formatter.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Totals for an order before it is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSummary {
    /// Sum of line totals
    pub subtotal: Decimal,

    /// Shipping charge
    pub shipping: Decimal,

    /// Tax, rounded to whole currency units
    pub tax: Decimal,

    /// Amount due
    pub total: Decimal,
}

impl OrderSummary {
    /// Compute the summary for a subtotal.
    pub fn for_subtotal(subtotal: Decimal) -> Self {
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING
        };

        let tax = (subtotal * TAX_RATE)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    /// Compute the summary for the lines in a cart.
    pub fn for_cart(cart: &Cart) -> Self {
        Self::for_subtotal(cart.total_price())
    }
}

/// Resolve an ISO 4217 currency code.
///
/// # Errors
///
/// Returns [`PricingError::UnknownCurrency`] when the code is not recognised.
pub fn currency(code: &str) -> Result<&'static iso::Currency, PricingError> {
    iso::find(&code.to_uppercase()).ok_or_else(|| PricingError::UnknownCurrency(code.to_string()))
}

/// Format an amount in the given currency, e.g. `$1,299.00`.
pub fn format_price(amount: Decimal, currency: &'static iso::Currency) -> String {
    Money::from_decimal(amount, currency).to_string()
}
