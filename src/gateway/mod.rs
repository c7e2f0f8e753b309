//! Storefront gateway
//!
//! The storefront owns pricing, stock and cart persistence; this module is the seam the
//! session talks to it through.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{lines::LineId, products::ProductId};

mod http;
mod responses;

pub use http::{HttpCartGateway, HttpGatewayConfig};
pub use responses::{AddToCartResponse, RemoveResponse, UpdateResponse};

/// Errors that can occur when talking to the storefront.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The storefront returned a non-2xx response or an unexpected body.
    #[error("unexpected response from storefront: {0}")]
    UnexpectedResponse(String),
}

/// Cart endpoints of the storefront.
#[automock]
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// Sets the quantity of a line.
    async fn update_quantity(
        &self,
        line: &LineId,
        quantity: u32,
    ) -> Result<UpdateResponse, GatewayError>;

    /// Removes a line from the cart.
    async fn remove_line(&self, line: &LineId) -> Result<RemoveResponse, GatewayError>;

    /// Adds `quantity` of a product to the cart.
    async fn add_to_cart(
        &self,
        product: &ProductId,
        quantity: u32,
    ) -> Result<AddToCartResponse, GatewayError>;
}
