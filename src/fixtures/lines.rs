//! Line Fixtures

use rusty_money::iso::{self, Currency};
use serde::Deserialize;

use crate::{fixtures::FixtureError, lines::CartLine, pricing};

/// Line identifiers may be written as numbers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// Numeric identifier, e.g. `12`
    Number(u64),

    /// String identifier, e.g. `"line-12"`
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Number(id) => id.to_string(),
            RawId::Text(id) => id,
        }
    }
}

/// Line Fixture
#[derive(Debug, Deserialize)]
pub struct LineFixture {
    /// Line identifier
    pub id: RawId,

    /// Product name
    pub name: String,

    /// Unit price (e.g., "9.99 USD")
    pub price: String,

    /// Quantity in the cart
    pub quantity: u32,

    /// Stock available, if known
    #[serde(default)]
    pub max_stock: Option<u32>,
}

impl TryFrom<LineFixture> for CartLine {
    type Error = FixtureError;

    fn try_from(fixture: LineFixture) -> Result<Self, Self::Error> {
        let (amount, currency) = split_price(&fixture.price)?;

        let unit_price = pricing::parse_amount(amount, currency)
            .map_err(|_err| FixtureError::InvalidPrice(fixture.price.clone()))?;

        let line = CartLine::new(
            fixture.id.into_string(),
            fixture.name,
            unit_price,
            fixture.quantity,
        );

        Ok(match fixture.max_stock {
            Some(max_stock) => line.with_max_stock(max_stock),
            None => line,
        })
    }
}

/// Split a price string "AMOUNT CURRENCY" into its amount and currency.
///
/// # Errors
///
/// Returns an error if the string is not two parts or the currency is unknown.
pub fn split_price(s: &str) -> Result<(&str, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    Ok((amount, parse_currency(code)?))
}

/// Resolve a supported ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for any other code.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "GBP" => Ok(iso::GBP),
        "USD" => Ok(iso::USD),
        "EUR" => Ok(iso::EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
