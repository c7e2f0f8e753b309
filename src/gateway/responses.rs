//! Storefront response bodies

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Response to a quantity update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Whether the storefront applied the update.
    #[serde(default)]
    pub success: bool,

    /// Authoritative total of the updated line.
    pub item_total: Option<Decimal>,

    /// Authoritative cart total.
    pub cart_total: Option<Decimal>,

    /// Number of items in the cart.
    pub cart_items_count: Option<u32>,

    /// Message to show, typically on failure.
    #[serde(alias = "error")]
    pub message: Option<String>,
}

/// Response to a line removal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoveResponse {
    /// Whether the storefront removed the line.
    #[serde(default)]
    pub success: bool,

    /// Number of items left in the cart.
    pub cart_items_count: Option<u32>,

    /// Authoritative cart total.
    pub cart_total: Option<Decimal>,

    /// Message to show, typically on failure.
    #[serde(alias = "error")]
    pub message: Option<String>,
}

/// Response to an add-to-cart submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddToCartResponse {
    /// Whether the product was added.
    #[serde(default)]
    pub success: bool,

    /// Number of items in the cart.
    pub cart_items_count: Option<u32>,

    /// Authoritative cart total.
    pub cart_total: Option<Decimal>,

    /// Message to show.
    #[serde(alias = "error")]
    pub message: Option<String>,
}
