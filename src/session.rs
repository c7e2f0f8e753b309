//! Cart session
//!
//! The single execution context that owns the cart. User events mutate the engine
//! synchronously; storefront requests run as futures which are applied, one at a time, in
//! the order they complete.

use std::{fmt, sync::Arc};

use futures::{StreamExt, future::BoxFuture, stream::FuturesUnordered};
use mockall::automock;
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    alerts::Alert,
    engine::{AddTicket, CartEngine, Commit, Confirm, RemovalTicket, Resolution, UpdateTicket},
    error::CartError,
    gateway::{AddToCartResponse, CartGateway, GatewayError, RemoveResponse, UpdateResponse},
    lines::LineId,
    products::ProductId,
    search::{SearchQuery, validate_query},
    snapshot::CartSnapshot,
};

/// Presentation layer the session renders into.
#[automock]
pub trait Presenter {
    /// Shows the current quantities and totals.
    fn render(&mut self, snapshot: &CartSnapshot);

    /// Shows a user-visible alert.
    fn alert(&mut self, alert: &Alert);
}

enum Completion {
    Update(UpdateTicket, Result<UpdateResponse, GatewayError>),
    Removal(RemovalTicket, Result<RemoveResponse, GatewayError>),
    Add(AddTicket, Result<AddToCartResponse, GatewayError>),
}

/// Owns the engine and the requests in flight for one cart view.
pub struct CartSession<P, C> {
    engine: CartEngine,
    gateway: Arc<dyn CartGateway>,
    presenter: P,
    confirm: C,
    in_flight: FuturesUnordered<BoxFuture<'static, Completion>>,
}

impl<P: Presenter, C: Confirm> CartSession<P, C> {
    /// Create a session and render the initial snapshot.
    pub fn new(
        engine: CartEngine,
        gateway: Arc<dyn CartGateway>,
        presenter: P,
        confirm: C,
    ) -> Self {
        let mut session = Self {
            engine,
            gateway,
            presenter,
            confirm,
            in_flight: FuturesUnordered::new(),
        };

        session.render();
        session
    }

    /// The engine.
    pub fn engine(&self) -> &CartEngine {
        &self.engine
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> &CartSnapshot {
        self.engine.snapshot()
    }

    /// The presenter.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Number of requests still in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Handles a quantity being typed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Snapshot`] if the line is not in the cart.
    pub fn input(&mut self, line: &LineId, raw: &str) -> Result<u32, CartError> {
        let quantity = self.engine.on_quantity_input(line, raw)?;

        self.render();

        Ok(quantity)
    }

    /// Handles a finalised quantity, dispatching an update when it is in range.
    ///
    /// Returns `false` if the quantity was clamped and nothing was sent.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Snapshot`] if the line is not in the cart.
    pub fn commit(&mut self, line: &LineId, raw: &str) -> Result<bool, CartError> {
        let commit = self.engine.on_quantity_committed(line, raw)?;

        self.render();

        match commit {
            Commit::Local(alert) => {
                self.presenter.alert(&alert);

                Ok(false)
            }
            Commit::Dispatch(ticket) => {
                self.dispatch_update(ticket);

                Ok(true)
            }
        }
    }

    /// Handles a removal request. Returns `true` if a removal was dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Snapshot`] if the line is not in the cart.
    pub fn remove(&mut self, line: &LineId) -> Result<bool, CartError> {
        let Some(ticket) = self.engine.on_remove(line, &self.confirm)? else {
            return Ok(false);
        };

        let gateway = Arc::clone(&self.gateway);

        self.in_flight.push(Box::pin(async move {
            let result = gateway.remove_line(ticket.line()).await;

            Completion::Removal(ticket, result)
        }));

        Ok(true)
    }

    /// Handles an add-to-cart form submission.
    ///
    /// # Errors
    ///
    /// Returns a validation error, also shown as an alert, if the quantity is invalid or
    /// the product is already being added.
    pub fn add_to_cart(&mut self, product: ProductId, raw: &str) -> Result<(), CartError> {
        let ticket = self
            .engine
            .on_add_to_cart(product, raw)
            .inspect_err(|error| self.presenter.alert(&Alert::for_error(error, "")))?;

        let gateway = Arc::clone(&self.gateway);

        self.in_flight.push(Box::pin(async move {
            let result = gateway
                .add_to_cart(ticket.product(), ticket.quantity())
                .await;

            Completion::Add(ticket, result)
        }));

        Ok(())
    }

    /// Validates a search submission, alerting when it is blank.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Search`] if the query is blank.
    pub fn search(&mut self, raw: &str) -> Result<SearchQuery, CartError> {
        validate_query(raw)
            .map_err(CartError::from)
            .inspect_err(|error| self.presenter.alert(&Alert::for_error(error, "")))
    }

    /// Waits for the next request to complete and applies it.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Resolution> {
        let completion = self.in_flight.next().await?;

        let resolution = match completion {
            Completion::Update(ticket, result) => self.engine.on_update_resolved(ticket, result),
            Completion::Removal(ticket, result) => self.engine.on_remove_resolved(ticket, result),
            Completion::Add(ticket, result) => self.engine.on_add_resolved(ticket, result),
        };

        if !matches!(resolution, Resolution::Stale { .. }) {
            self.render();
        }

        if let Some(alert) = resolution.alert() {
            self.presenter.alert(alert);
        }

        Some(resolution)
    }

    /// Applies every request in flight, in completion order.
    pub async fn settle(&mut self) -> SmallVec<[Resolution; 4]> {
        let mut resolutions = SmallVec::new();

        while let Some(resolution) = self.next_completion().await {
            resolutions.push(resolution);
        }

        resolutions
    }

    fn dispatch_update(&mut self, ticket: UpdateTicket) {
        debug!(
            line = %ticket.line(),
            generation = ticket.generation(),
            "dispatching quantity update"
        );

        let gateway = Arc::clone(&self.gateway);

        self.in_flight.push(Box::pin(async move {
            let result = gateway
                .update_quantity(ticket.line(), ticket.quantity())
                .await;

            Completion::Update(ticket, result)
        }));
    }

    fn render(&mut self) {
        self.presenter.render(self.engine.snapshot());
    }
}

impl<P, C> fmt::Debug for CartSession<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSession")
            .field("engine", &self.engine)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}
