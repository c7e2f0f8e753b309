//! Fixtures
//!
//! Carts described in YAML, used by the command line tool and tests.

use std::{fs, path::Path};

use thiserror::Error;

use crate::{lines::CartLine, snapshot::CartSnapshot};

pub mod lines;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// An empty cart must name its currency
    #[error("Cart has no lines and no currency")]
    NoCurrency,

    /// Snapshot creation error
    #[error("Failed to create cart: {0}")]
    Snapshot(#[from] crate::snapshot::SnapshotError),
}

/// Cart Fixture
#[derive(Debug, serde::Deserialize)]
pub struct CartFixture {
    /// Cart currency; defaults to the currency of the first line
    #[serde(default)]
    pub currency: Option<String>,

    /// Lines in display order
    #[serde(default)]
    pub lines: Vec<lines::LineFixture>,
}

impl CartFixture {
    /// Parse a cart fixture from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Load a cart fixture from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Build a snapshot from this fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is invalid, the currency is unknown or missing, or the
    /// lines do not form a valid cart.
    pub fn into_snapshot(self) -> Result<CartSnapshot, FixtureError> {
        let lines = self
            .lines
            .into_iter()
            .map(CartLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let currency = match (self.currency, lines.first()) {
            (Some(code), _) => lines::parse_currency(&code)?,
            (None, Some(line)) => line.unit_price().currency(),
            (None, None) => return Err(FixtureError::NoCurrency),
        };

        Ok(CartSnapshot::with_lines(lines, currency)?)
    }
}
