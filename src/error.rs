//! Cart errors

use thiserror::Error;

use crate::{
    gateway::GatewayError, products::ProductId, quantity::QuantityError, search::SearchError,
    snapshot::SnapshotError,
};

/// Classification of a failure, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, handled locally without a request.
    Validation,

    /// The request did not complete.
    Network,

    /// The storefront answered with a failure.
    ServerRejected,
}

/// Errors surfaced by cart operations. None of them end the session.
#[derive(Debug, Error)]
pub enum CartError {
    /// A quantity was rejected.
    #[error(transparent)]
    Validation(#[from] QuantityError),

    /// A search query was rejected.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// The operation referred to a line that is not in the cart.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// An add-to-cart request for this product is still pending.
    #[error("product {0} is already being added")]
    AddInFlight(ProductId),

    /// The request failed to complete.
    #[error("request failed")]
    Network(#[source] GatewayError),

    /// The storefront reported a failure.
    #[error("storefront rejected the request")]
    ServerRejected {
        /// Message supplied by the storefront, if any.
        message: Option<String>,
    },
}

impl CartError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Search(_) | Self::Snapshot(_) | Self::AddInFlight(_) => {
                ErrorKind::Validation
            }
            Self::Network(_) => ErrorKind::Network,
            Self::ServerRejected { .. } => ErrorKind::ServerRejected,
        }
    }

    /// Message supplied by the storefront, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::ServerRejected { message } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<GatewayError> for CartError {
    fn from(error: GatewayError) -> Self {
        Self::Network(error)
    }
}
