//! Domain error types.

use common::Money;
use thiserror::Error;

use crate::order::PaymentStatus;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A quantity, multiplier, or total failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// The coupon is outside its validity window.
    #[error("Coupon is not valid at this time")]
    CouponExpired,

    /// The coupon tracks usage and has no uses left.
    #[error("Coupon has no remaining uses")]
    CouponExhausted,

    /// The cart total is below the coupon's minimum purchase.
    #[error("Cart total {total} is below the coupon minimum purchase {minimum}")]
    CouponMinimumNotMet { minimum: Money, total: Money },

    /// The coupon's discount configuration is out of range.
    #[error("Invalid discount configuration: {0}")]
    InvalidDiscountType(String),

    /// The requested payment status transition is not allowed.
    #[error("Invalid payment status transition: {from} -> {to}")]
    InvalidStatusTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

impl DomainError {
    /// Shorthand for a `NotFound` error with a displayable id.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
