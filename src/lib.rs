//! Trolley
//!
//! Trolley keeps a shopping cart's displayed totals consistent while quantity changes are
//! reconciled with the storefront. Totals are recomputed optimistically as the user edits,
//! requests are issued per committed change, and responses are applied in completion order
//! with stale results discarded.

pub mod alerts;
pub mod csrf;
pub mod display;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod gateway;
pub mod lines;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod quantity;
pub mod search;
pub mod session;
pub mod snapshot;
