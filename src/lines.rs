//! Cart lines

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pricing::{Price, line_total};

/// Opaque identifier of a cart line, as issued by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    /// Creates a line identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LineId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for LineId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for LineId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One product entry in the cart, with its own quantity and unit price.
///
/// The displayed total is derived from `quantity × unit_price`, unless the storefront has
/// supplied an authoritative line total for the current quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    id: LineId,
    name: String,
    unit_price: Price,
    quantity: u32,
    max_stock: Option<u32>,
    total: Price,

    /// Last quantity the storefront is known to hold; the rollback target.
    committed_quantity: u32,

    /// Generation of the most recently issued update for this line.
    issued_generation: u64,

    /// Generation of the most recent update the storefront confirmed.
    confirmed_generation: u64,

    /// Set by a rollback until the next local edit; the display then tracks confirmations.
    follows_committed: bool,
}

impl CartLine {
    /// Creates a line as rendered by the storefront. The given quantity is treated as committed.
    pub fn new(
        id: impl Into<LineId>,
        name: impl Into<String>,
        unit_price: Price,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
            max_stock: None,
            total: line_total(&unit_price, quantity),
            committed_quantity: quantity,
            issued_generation: 0,
            confirmed_generation: 0,
            follows_committed: true,
        }
    }

    /// Sets the maximum stock available for this line. Zero means unknown.
    #[must_use]
    pub fn with_max_stock(mut self, max_stock: u32) -> Self {
        self.max_stock = (max_stock > 0).then_some(max_stock);
        self
    }

    /// Returns the line identifier.
    pub fn id(&self) -> &LineId {
        &self.id
    }

    /// Returns the product name shown for the line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price.
    pub fn unit_price(&self) -> &Price {
        &self.unit_price
    }

    /// Returns the quantity currently displayed.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the last quantity the storefront confirmed.
    pub fn committed_quantity(&self) -> u32 {
        self.committed_quantity
    }

    /// Returns the maximum stock, if known.
    pub fn max_stock(&self) -> Option<u32> {
        self.max_stock
    }

    /// Returns the displayed line total.
    pub fn total(&self) -> &Price {
        &self.total
    }

    /// Returns the generation of the latest issued update.
    pub fn generation(&self) -> u64 {
        self.issued_generation
    }

    /// Sets the displayed quantity and recomputes the line total from it.
    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.total = line_total(&self.unit_price, quantity);
        self.follows_committed = false;
    }

    /// Overwrites the displayed total with an authoritative value.
    pub(crate) fn set_total(&mut self, total: Price) {
        self.total = total;
    }

    /// Issues a new update generation, superseding any outstanding one.
    pub(crate) fn issue_generation(&mut self) -> u64 {
        self.issued_generation += 1;
        self.issued_generation
    }

    /// Whether `generation` is the latest issued for this line.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        generation == self.issued_generation
    }

    /// Records a storefront-confirmed quantity, ignoring confirmations older than the last one.
    ///
    /// Returns `true` if the committed quantity moved.
    pub(crate) fn confirm(&mut self, quantity: u32, generation: u64) -> bool {
        if generation <= self.confirmed_generation {
            return false;
        }

        self.confirmed_generation = generation;
        self.committed_quantity = quantity;

        true
    }

    /// Whether the display shows the committed quantity because of a rollback, with no
    /// local edit since.
    pub(crate) fn follows_committed(&self) -> bool {
        self.follows_committed
    }

    /// Restores the committed quantity and its derived total.
    pub(crate) fn roll_back(&mut self) {
        self.set_quantity(self.committed_quantity);
        self.follows_committed = true;
    }
}
