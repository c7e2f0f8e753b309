//! Cart reconciliation engine
//!
//! Keeps displayed line and cart totals consistent with user input as it happens, then
//! reconciles them with what the storefront confirms. Every operation here is
//! synchronous; requests are described by tickets which the caller dispatches and hands
//! back together with their result.
//!
//! Each line carries a generation counter. Committing a quantity issues a new
//! generation, and only a response for the latest generation may touch displayed values.

use mockall::automock;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::{
    alerts::{self, Alert},
    error::CartError,
    gateway::{AddToCartResponse, GatewayError, RemoveResponse, UpdateResponse},
    lines::LineId,
    pricing::{Price, price_from_decimal},
    products::ProductId,
    quantity::{self, CommittedQuantity},
    snapshot::CartSnapshot,
};

/// Question asked before a line is removed.
pub const REMOVE_PROMPT: &str = "Are you sure you want to remove this item from your cart?";

/// Yes/no gate consulted before destructive actions.
#[automock]
pub trait Confirm {
    /// Returns `true` if the user agreed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// A quantity update waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTicket {
    line: LineId,
    quantity: u32,
    generation: u64,
}

impl UpdateTicket {
    /// Line being updated.
    pub fn line(&self) -> &LineId {
        &self.line
    }

    /// Requested quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Generation issued for this request.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A confirmed line removal waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalTicket {
    line: LineId,
}

impl RemovalTicket {
    /// Line being removed.
    pub fn line(&self) -> &LineId {
        &self.line
    }
}

/// An add-to-cart submission waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTicket {
    product: ProductId,
    quantity: u32,
}

impl AddTicket {
    /// Product being added.
    pub fn product(&self) -> &ProductId {
        &self.product
    }

    /// Quantity being added.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// What committing a quantity led to.
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
    /// The quantity was clamped; totals were recomputed locally and nothing is sent.
    Local(Alert),

    /// Totals were recomputed optimistically; the ticket must be dispatched.
    Dispatch(UpdateTicket),
}

/// What applying a storefront response led to.
#[derive(Debug)]
pub enum Resolution {
    /// The storefront confirmed the update.
    Reconciled {
        /// Updated line.
        line: LineId,
        /// Success alert.
        alert: Alert,
    },

    /// The update failed and the line was restored to its committed quantity.
    RolledBack {
        /// Restored line.
        line: LineId,
        /// Why the update failed.
        error: CartError,
        /// Error alert.
        alert: Alert,
    },

    /// A superseded success arrived after the line was rolled back. The line now shows the
    /// quantity the storefront accepted.
    Resynced {
        /// Resynced line.
        line: LineId,
        /// Quantity now displayed.
        quantity: u32,
    },

    /// The response belonged to a superseded request and was discarded.
    Stale {
        /// Line the response was for.
        line: LineId,
        /// Generation of the discarded response.
        generation: u64,
    },

    /// The line was removed.
    Removed {
        /// Removed line.
        line: LineId,
        /// Success alert.
        alert: Alert,
    },

    /// The removal failed; the line is untouched.
    RemovalFailed {
        /// Line that was kept.
        line: LineId,
        /// Why the removal failed.
        error: CartError,
        /// Error alert.
        alert: Alert,
    },

    /// The product was added.
    Added {
        /// Added product.
        product: ProductId,
        /// Success alert.
        alert: Alert,
    },

    /// The product could not be added.
    AddFailed {
        /// Product that was not added.
        product: ProductId,
        /// Why the submission failed.
        error: CartError,
        /// Error alert.
        alert: Alert,
    },
}

impl Resolution {
    /// Alert to surface, if any. Superseded responses are silent.
    pub fn alert(&self) -> Option<&Alert> {
        match self {
            Self::Reconciled { alert, .. }
            | Self::RolledBack { alert, .. }
            | Self::Removed { alert, .. }
            | Self::RemovalFailed { alert, .. }
            | Self::Added { alert, .. }
            | Self::AddFailed { alert, .. } => Some(alert),
            Self::Resynced { .. } | Self::Stale { .. } => None,
        }
    }
}

/// Owns the cart snapshot and applies user input and storefront responses to it.
#[derive(Debug)]
pub struct CartEngine {
    snapshot: CartSnapshot,
    pending_removals: FxHashSet<LineId>,
    pending_adds: FxHashSet<ProductId>,
}

impl CartEngine {
    /// Create an engine over a rendered snapshot.
    #[must_use]
    pub fn new(snapshot: CartSnapshot) -> Self {
        Self {
            snapshot,
            pending_removals: FxHashSet::default(),
            pending_adds: FxHashSet::default(),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> &CartSnapshot {
        &self.snapshot
    }

    /// Pure recomputation of the cart total from quantities and unit prices.
    pub fn recompute_all(&self) -> Price {
        self.snapshot.recompute_all()
    }

    /// Applies a quantity as it is being typed. Never sends anything.
    ///
    /// Invalid or negative input reads as zero. Returns the quantity now displayed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Snapshot`] if the line is not in the cart.
    pub fn on_quantity_input(&mut self, line: &LineId, raw: &str) -> Result<u32, CartError> {
        let quantity = quantity::parse_input(raw);

        self.snapshot.get_line_mut(line)?.set_quantity(quantity);
        self.snapshot.refresh_grand_total();

        Ok(quantity)
    }

    /// Applies a finalised quantity.
    ///
    /// Out-of-range input is clamped and recomputed locally. Otherwise totals are
    /// recomputed optimistically and a ticket for exactly one update request is issued,
    /// superseding any request still outstanding for the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Snapshot`] if the line is not in the cart.
    pub fn on_quantity_committed(
        &mut self,
        line: &LineId,
        raw: &str,
    ) -> Result<Commit, CartError> {
        let entry = self.snapshot.get_line_mut(line)?;
        let committed = quantity::parse_commit(raw, entry.max_stock());

        entry.set_quantity(committed.quantity());

        let commit = match committed {
            CommittedQuantity::Clamped { quantity, reason } => {
                let generation = entry.issue_generation();

                debug!(%line, quantity, generation, %reason, "clamped committed quantity");

                Commit::Local(Alert::for_error(&reason.into(), alerts::UPDATE_FAILED))
            }
            CommittedQuantity::Accepted(quantity) => {
                let generation = entry.issue_generation();

                debug!(%line, quantity, generation, "issuing quantity update");

                Commit::Dispatch(UpdateTicket {
                    line: line.clone(),
                    quantity,
                    generation,
                })
            }
        };

        self.snapshot.refresh_grand_total();

        Ok(commit)
    }

    /// Applies the result of a quantity update.
    ///
    /// Responses for superseded generations never overwrite a newer local value, though a
    /// successful one still moves the line's committed quantity forward. A line showing its
    /// rolled back quantity follows that move.
    pub fn on_update_resolved(
        &mut self,
        ticket: UpdateTicket,
        result: Result<UpdateResponse, GatewayError>,
    ) -> Resolution {
        let UpdateTicket {
            line,
            quantity,
            generation,
        } = ticket;

        let currency = self.snapshot.currency();

        let Ok(entry) = self.snapshot.get_line_mut(&line) else {
            debug!(%line, generation, "discarding update for a line no longer in the cart");

            return Resolution::Stale { line, generation };
        };

        if !entry.is_current(generation) {
            let advanced = matches!(&result, Ok(response) if response.success)
                && entry.confirm(quantity, generation);

            if advanced && entry.follows_committed() {
                entry.roll_back();
                self.snapshot.refresh_grand_total();

                info!(%line, quantity, generation, "resynced line after rollback");

                return Resolution::Resynced { line, quantity };
            }

            warn!(%line, generation, latest = entry.generation(), "discarding stale update");

            return Resolution::Stale { line, generation };
        }

        match accepted(result, |response| response.success, |r| r.message.clone()) {
            Ok(response) => {
                entry.confirm(quantity, generation);

                if let Some(item_total) = response.item_total
                    && entry.quantity() == quantity
                {
                    match price_from_decimal(item_total, currency) {
                        Ok(total) => entry.set_total(total),
                        Err(error) => warn!(%line, %error, "ignoring storefront line total"),
                    }
                }

                self.apply_cart_totals(response.cart_total, response.cart_items_count);

                info!(%line, quantity, generation, "reconciled quantity update");

                Resolution::Reconciled {
                    line,
                    alert: Alert::success(alerts::CART_UPDATED),
                }
            }
            Err(error) => {
                entry.roll_back();
                let restored = entry.quantity();

                self.snapshot.refresh_grand_total();

                warn!(%line, generation, restored, %error, "rolled back quantity update");

                let alert = Alert::for_error(&error, alerts::UPDATE_FAILED);

                Resolution::RolledBack { line, error, alert }
            }
        }
    }

    /// Asks for confirmation and, if given, issues a removal ticket.
    ///
    /// Returns `None` when the user declines or a removal is already pending.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Snapshot`] if the line is not in the cart.
    pub fn on_remove(
        &mut self,
        line: &LineId,
        gate: &dyn Confirm,
    ) -> Result<Option<RemovalTicket>, CartError> {
        self.snapshot.get_line(line)?;

        if self.pending_removals.contains(line) || !gate.confirm(REMOVE_PROMPT) {
            return Ok(None);
        }

        self.pending_removals.insert(line.clone());

        debug!(%line, "issuing line removal");

        Ok(Some(RemovalTicket { line: line.clone() }))
    }

    /// Applies the result of a line removal.
    pub fn on_remove_resolved(
        &mut self,
        ticket: RemovalTicket,
        result: Result<RemoveResponse, GatewayError>,
    ) -> Resolution {
        let RemovalTicket { line } = ticket;

        self.pending_removals.remove(&line);

        match accepted(result, |response| response.success, |r| r.message.clone()) {
            Ok(response) => {
                self.snapshot.remove_line(&line);
                self.snapshot.refresh_grand_total();
                self.apply_cart_totals(response.cart_total, response.cart_items_count);

                info!(%line, "removed line");

                Resolution::Removed {
                    line,
                    alert: Alert::success(alerts::ITEM_REMOVED),
                }
            }
            Err(error) => {
                warn!(%line, %error, "line removal failed");

                let alert = Alert::for_error(&error, alerts::REMOVE_FAILED);

                Resolution::RemovalFailed { line, error, alert }
            }
        }
    }

    /// Validates an add-to-cart submission and issues a ticket for it.
    ///
    /// # Errors
    ///
    /// - [`CartError::Validation`]: the quantity is not a positive integer.
    /// - [`CartError::AddInFlight`]: the product is already being added.
    pub fn on_add_to_cart(
        &mut self,
        product: ProductId,
        raw: &str,
    ) -> Result<AddTicket, CartError> {
        let quantity = quantity::parse_add_quantity(raw)?;

        if !self.pending_adds.insert(product.clone()) {
            return Err(CartError::AddInFlight(product));
        }

        debug!(%product, quantity, "issuing add to cart");

        Ok(AddTicket { product, quantity })
    }

    /// Applies the result of an add-to-cart submission.
    ///
    /// Only the item count is updated; the added line appears when the cart is next rendered.
    pub fn on_add_resolved(
        &mut self,
        ticket: AddTicket,
        result: Result<AddToCartResponse, GatewayError>,
    ) -> Resolution {
        let AddTicket { product, quantity } = ticket;

        self.pending_adds.remove(&product);

        match accepted(result, |response| response.success, |r| r.message.clone()) {
            Ok(response) => {
                if let Some(count) = response.cart_items_count {
                    self.snapshot.set_items_count(count);
                }

                info!(%product, quantity, "added product to cart");

                Resolution::Added {
                    product,
                    alert: Alert::success(alerts::PRODUCT_ADDED),
                }
            }
            Err(error) => {
                warn!(%product, %error, "add to cart failed");

                let alert = Alert::for_error(&error, alerts::ADD_FAILED);

                Resolution::AddFailed {
                    product,
                    error,
                    alert,
                }
            }
        }
    }

    fn apply_cart_totals(&mut self, cart_total: Option<Decimal>, count: Option<u32>) {
        if let Some(total) = cart_total {
            match price_from_decimal(total, self.snapshot.currency()) {
                Ok(total) if total == self.snapshot.displayed_sum() => {
                    self.snapshot.set_grand_total(total);
                }
                Ok(total) => {
                    warn!(%total, "storefront cart total differs from displayed lines");

                    self.snapshot.refresh_grand_total();
                }
                Err(error) => {
                    warn!(%error, "ignoring storefront cart total");

                    self.snapshot.refresh_grand_total();
                }
            }
        }

        if let Some(count) = count {
            self.snapshot.set_items_count(count);
        }
    }
}

/// Splits a gateway result into an accepted response or a classified error.
fn accepted<R>(
    result: Result<R, GatewayError>,
    success: impl FnOnce(&R) -> bool,
    message: impl FnOnce(&R) -> Option<String>,
) -> Result<R, CartError> {
    let response = result?;

    if success(&response) {
        Ok(response)
    } else {
        Err(CartError::ServerRejected {
            message: message(&response),
        })
    }
}
