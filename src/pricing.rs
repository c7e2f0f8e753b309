//! Prices

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// A monetary amount held in minor units of an ISO currency.
pub type Price = Money<'static, Currency>;

/// Number of minor units in one major unit. Totals are displayed to two decimal places.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Errors that can occur while converting amounts into prices.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The amount could not be parsed as a decimal.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The amount does not fit in minor units.
    #[error("amount {0} is out of range")]
    OutOfRange(Decimal),
}

/// Calculates the total of a line: `quantity × unit_price`.
///
/// Saturates at the largest representable amount rather than overflowing.
pub fn line_total(unit_price: &Price, quantity: u32) -> Price {
    let minor = unit_price
        .to_minor_units()
        .saturating_mul(i64::from(quantity));

    Money::from_minor(minor, unit_price.currency())
}

/// Sums the given prices in the given currency.
///
/// Callers are expected to pass prices in a single currency, so only minor units are summed.
pub fn total_price<'p>(
    prices: impl IntoIterator<Item = &'p Price>,
    currency: &'static Currency,
) -> Price {
    let minor = prices
        .into_iter()
        .fold(0_i64, |acc, price| acc.saturating_add(price.to_minor_units()));

    Money::from_minor(minor, currency)
}

/// Converts a decimal amount into a price, rounding half away from zero to two decimal places.
///
/// # Errors
///
/// Returns [`PricingError::OutOfRange`] if the amount does not fit in minor units.
pub fn price_from_decimal(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Price, PricingError> {
    let minor = amount
        .checked_mul(Decimal::new(MINOR_UNITS_PER_MAJOR, 0))
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64())
        .ok_or(PricingError::OutOfRange(amount))?;

    Ok(Money::from_minor(minor, currency))
}

/// Parses a decimal string (e.g. `"29.97"`) into a price.
///
/// # Errors
///
/// - [`PricingError::InvalidAmount`]: the string is not a decimal.
/// - [`PricingError::OutOfRange`]: the amount does not fit in minor units.
pub fn parse_amount(amount: &str, currency: &'static Currency) -> Result<Price, PricingError> {
    let decimal = amount
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| PricingError::InvalidAmount(amount.to_string()))?;

    price_from_decimal(decimal, currency)
}
