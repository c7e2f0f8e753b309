//! Cart snapshot

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    lines::{CartLine, LineId},
    pricing::{Price, line_total, total_price},
};

/// Errors related to snapshot construction or line lookup.
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    /// A line's currency differs from the snapshot currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// Two lines share an identifier.
    #[error("Line {0} appears more than once")]
    DuplicateLine(LineId),

    /// A line was not found in the snapshot.
    #[error("Line {0} not found")]
    LineNotFound(LineId),
}

/// Ordered collection of cart lines plus the displayed grand total.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
    currency: &'static Currency,
    grand_total: Price,
    items_count: u32,
}

impl CartSnapshot {
    /// Create an empty snapshot in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        CartSnapshot {
            lines: Vec::new(),
            currency,
            grand_total: Money::from_minor(0, currency),
            items_count: 0,
        }
    }

    /// Create a snapshot with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a `SnapshotError` if a line has a different currency or a duplicate identifier.
    pub fn with_lines(
        lines: impl Into<Vec<CartLine>>,
        currency: &'static Currency,
    ) -> Result<Self, SnapshotError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.unit_price().currency();

            if line_currency != currency {
                return Err(SnapshotError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if lines.iter().take(i).any(|other| other.id() == line.id()) {
                return Err(SnapshotError::DuplicateLine(line.id().clone()));
            }

            Ok(())
        })?;

        let mut snapshot = CartSnapshot {
            lines,
            currency,
            grand_total: Money::from_minor(0, currency),
            items_count: 0,
        };

        snapshot.refresh_grand_total();
        snapshot.items_count = snapshot.total_quantity();

        Ok(snapshot)
    }

    /// Sum of `quantity × unit_price` over all lines, in minor units (two decimal places).
    ///
    /// Pure: ignores any authoritative totals applied to the displayed values.
    pub fn recompute_all(&self) -> Price {
        let minor = self.lines.iter().fold(0_i64, |acc, line| {
            acc.saturating_add(line_total(line.unit_price(), line.quantity()).to_minor_units())
        });

        Money::from_minor(minor, self.currency)
    }

    /// Sum of the line totals currently displayed.
    pub fn displayed_sum(&self) -> Price {
        total_price(self.lines.iter().map(CartLine::total), self.currency)
    }

    /// The grand total currently displayed.
    pub fn grand_total(&self) -> &Price {
        &self.grand_total
    }

    /// The cart item count shown in the badge.
    pub fn items_count(&self) -> u32 {
        self.items_count
    }

    /// Sum of the displayed quantities.
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity()))
    }

    /// Get a line from the snapshot.
    ///
    /// # Errors
    ///
    /// Returns a `SnapshotError::LineNotFound` if the line is not in the cart.
    pub fn get_line(&self, id: &LineId) -> Result<&CartLine, SnapshotError> {
        self.lines
            .iter()
            .find(|line| line.id() == id)
            .ok_or_else(|| SnapshotError::LineNotFound(id.clone()))
    }

    pub(crate) fn get_line_mut(&mut self, id: &LineId) -> Result<&mut CartLine, SnapshotError> {
        self.lines
            .iter_mut()
            .find(|line| line.id() == id)
            .ok_or_else(|| SnapshotError::LineNotFound(id.clone()))
    }

    /// Iterate over the lines in display order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Get the number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Removes a line, keeping the order of the rest.
    pub(crate) fn remove_line(&mut self, id: &LineId) -> Option<CartLine> {
        let position = self.lines.iter().position(|line| line.id() == id)?;

        Some(self.lines.remove(position))
    }

    /// Sets the grand total to the sum of the displayed line totals.
    pub(crate) fn refresh_grand_total(&mut self) {
        self.grand_total = self.displayed_sum();
    }

    pub(crate) fn set_grand_total(&mut self, total: Price) {
        self.grand_total = total;
    }

    pub(crate) fn set_items_count(&mut self, count: u32) {
        self.items_count = count;
    }
}
