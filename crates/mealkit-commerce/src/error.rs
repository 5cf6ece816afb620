//! Commerce error types.

use crate::ids::{ItemId, LineId};
use serde::Serialize;
use thiserror::Error;

/// Errors reported by cart and checkout operations.
///
/// Every variant is a recoverable, caller-facing condition. An operation that
/// returns one of these has left the cart and the checkout state unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommerceError {
    /// Quantity below 1.
    #[error("Quantity must be at least 1.")]
    InvalidQuantity { quantity: i64 },

    /// A line would hold more than the per-item limit.
    #[error("You can only add up to {limit} of the same meal.")]
    MaxPerItemExceeded { limit: i64 },

    /// The item carries a negative unit price.
    #[error("This meal has an invalid price.")]
    NegativePrice { item_id: ItemId },

    /// No line with the given id.
    #[error("We couldn't find that item in your cart.")]
    LineNotFound { line_id: LineId },

    #[error("Your cart is empty.")]
    CartIsEmpty,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Please enter your full name.")]
    MissingName,

    #[error("Please enter your delivery address.")]
    MissingAddress,

    /// A submission is already running on this checkout.
    #[error("Your order is already being placed.")]
    AlreadyInProgress,

    /// The checkout already placed its order.
    #[error("This order has already been placed.")]
    AlreadyConfirmed,

    /// The payment step was cancelled by the caller.
    #[error("Checkout was cancelled before payment completed.")]
    Cancelled,

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },
}

impl CommerceError {
    /// Stable machine-readable name of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            CommerceError::InvalidQuantity { .. } => "invalid_quantity",
            CommerceError::MaxPerItemExceeded { .. } => "max_per_item_exceeded",
            CommerceError::NegativePrice { .. } => "negative_price",
            CommerceError::LineNotFound { .. } => "line_not_found",
            CommerceError::CartIsEmpty => "cart_is_empty",
            CommerceError::InvalidEmail => "invalid_email",
            CommerceError::MissingName => "missing_name",
            CommerceError::MissingAddress => "missing_address",
            CommerceError::AlreadyInProgress => "already_in_progress",
            CommerceError::AlreadyConfirmed => "already_confirmed",
            CommerceError::Cancelled => "cancelled",
            CommerceError::Overflow => "overflow",
            CommerceError::CurrencyMismatch { .. } => "currency_mismatch",
        }
    }

    /// Whether this error comes from the checkout validation gate.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CommerceError::CartIsEmpty
                | CommerceError::MissingName
                | CommerceError::InvalidEmail
                | CommerceError::MissingAddress
        )
    }
}
