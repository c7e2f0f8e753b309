//! Trolley prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    alerts::{Alert, AlertLevel},
    csrf::CsrfToken,
    engine::{AddTicket, CartEngine, Commit, Confirm, RemovalTicket, Resolution, UpdateTicket},
    error::{CartError, ErrorKind},
    fixtures::{CartFixture, FixtureError},
    gateway::{
        AddToCartResponse, CartGateway, GatewayError, HttpCartGateway, HttpGatewayConfig,
        RemoveResponse, UpdateResponse,
    },
    lines::{CartLine, LineId},
    pricing::{Price, PricingError},
    products::ProductId,
    quantity::{CommittedQuantity, QuantityError},
    search::{SearchError, SearchQuery},
    session::{CartSession, Presenter},
    snapshot::{CartSnapshot, SnapshotError},
};
