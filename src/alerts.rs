//! Alerts
//!
//! User-visible signals raised by cart operations.

use std::fmt;

use crate::error::{CartError, ErrorKind};

pub(crate) const CART_UPDATED: &str = "Cart updated!";
pub(crate) const UPDATE_FAILED: &str = "Error updating cart";
pub(crate) const ITEM_REMOVED: &str = "Item removed from cart";
pub(crate) const REMOVE_FAILED: &str = "Error removing item from cart";
pub(crate) const PRODUCT_ADDED: &str = "Product added to cart!";
pub(crate) const ADD_FAILED: &str = "Error adding product to cart";

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    /// The operation succeeded.
    Success,

    /// Input was adjusted or rejected locally.
    Warning,

    /// The storefront could not apply the operation.
    Danger,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        })
    }
}

/// A classified, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    level: AlertLevel,
    message: String,
    kind: Option<ErrorKind>,
}

impl Alert {
    /// Success alert.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Success,
            message: message.into(),
            kind: None,
        }
    }

    /// Alert for a failure of the given kind.
    ///
    /// Validation failures are warnings; network and storefront failures are dangers.
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        let level = match kind {
            ErrorKind::Validation => AlertLevel::Warning,
            ErrorKind::Network | ErrorKind::ServerRejected => AlertLevel::Danger,
        };

        Self {
            level,
            message: message.into(),
            kind: Some(kind),
        }
    }

    /// Alert for `error`, preferring a storefront-supplied message over `fallback`.
    ///
    /// Validation errors always show their own message.
    pub fn for_error(error: &CartError, fallback: &str) -> Self {
        let kind = error.kind();

        let message = match (kind, error.server_message()) {
            (ErrorKind::Validation, _) => error.to_string(),
            (_, Some(message)) => message.to_string(),
            (_, None) => fallback.to_string(),
        };

        Self::failure(kind, message)
    }

    /// Severity.
    pub fn level(&self) -> AlertLevel {
        self.level
    }

    /// Message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Failure classification, if this alert reports one.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}
