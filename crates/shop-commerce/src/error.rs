//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in storefront domain operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Requested more than is in stock.
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    /// The product has options but the selection matches no variant.
    #[error("Please select all options")]
    OptionsIncomplete,

    /// A variant id that does not belong to the product.
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// A decimal amount the money parser could not read.
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Invalid checkout state transition.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition { from: String, to: String },

    /// Checkout cannot proceed with an empty cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Validation error on a named field.
    #[error("{field}: {message}")]
    Validation { field: String, message: String },
}

impl CommerceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CommerceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error is caused by user input rather than a system fault.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, CommerceError::Overflow)
    }
}
