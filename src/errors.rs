//! Unified error types for the storefront core.
//!
//! Every fallible operation returns [`Result`]. Callers that need to render a failure use
//! [`Error::kind`] or [`Error::to_failure`] rather than matching on individual variants.

use crate::entities::OrderStatus;
use serde::Serialize;
use thiserror::Error;

/// All errors produced by the cart and order engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Product is missing from the catalog or no longer active
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Requested product id
        id: i64,
    },

    /// Cart line does not exist
    #[error("Cart item not found: {id}")]
    CartItemNotFound {
        /// Requested cart item id
        id: i64,
    },

    /// Order does not exist
    #[error("Order not found: {reference}")]
    OrderNotFound {
        /// Order id or order number used for the lookup
        reference: String,
    },

    /// Quantity passed to an additive cart operation was below one, or would push the
    /// line past the largest storable quantity
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
    },

    /// Checkout attempted on a cart with no lines
    #[error("Cart is empty")]
    EmptyCart,

    /// Required checkout fields were blank or absent
    #[error("Missing required customer field(s): {}", .missing.join(", "))]
    InvalidCustomerData {
        /// Names of the missing fields
        missing: Vec<&'static str>,
    },

    /// Status text outside the fixed order status set
    #[error("Invalid order status: {status}")]
    InvalidStatus {
        /// The rejected status text
        status: String,
    },

    /// Status is known but not reachable from the order's current status
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// Cart lines changed between the checkout snapshot and the clear step
    #[error("Cart {cart_id} was modified during checkout")]
    CartChanged {
        /// Cart that was being checked out
        cart_id: i64,
    },

    /// Storage or transaction failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or malformed
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Coarse failure taxonomy exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing cart item, order, or product reference
    NotFound,
    /// Checkout attempted with no items
    EmptyCart,
    /// Missing required checkout field
    InvalidCustomerData,
    /// Non-positive quantity passed to an additive operation
    InvalidQuantity,
    /// Status outside the fixed set or not reachable
    InvalidStatus,
    /// Transaction or commit failure; state was rolled back
    StorageFailure,
    /// Application configuration problem
    Config,
}

/// Structured failure handed back to callers for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Failure category
    pub kind: ErrorKind,
    /// Human-readable detail
    pub message: String,
}

impl Error {
    /// Maps this error onto the caller-facing taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProductNotFound { .. }
            | Self::CartItemNotFound { .. }
            | Self::OrderNotFound { .. } => ErrorKind::NotFound,
            Self::EmptyCart => ErrorKind::EmptyCart,
            Self::InvalidCustomerData { .. } => ErrorKind::InvalidCustomerData,
            Self::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            Self::InvalidStatus { .. } | Self::InvalidTransition { .. } => {
                ErrorKind::InvalidStatus
            }
            Self::CartChanged { .. } | Self::Database(_) | Self::Io(_) => {
                ErrorKind::StorageFailure
            }
            Self::Config { .. } | Self::EnvVar(_) => ErrorKind::Config,
        }
    }

    /// Builds the `{kind, message}` pair for this error.
    #[must_use]
    pub fn to_failure(&self) -> Failure {
        Failure {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
