//! Checkout error types.

use common::StockKey;
use domain::DomainError;
use store::StoreError;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors that can occur during checkout, order placement, or settlement.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Domain error (validation, lookups, coupon rules, status machine).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Store error (missing stock rows, counter underflow, backend).
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Payment gateway error.
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Available stock cannot cover the aggregated requirements.
    #[error("Insufficient stock for {n} key(s)", n = .0.len())]
    InsufficientStock(Vec<StockKey>),

    /// A failure inside the order-creation or settlement transaction; every
    /// staged write was rolled back.
    #[error("Transaction aborted: {0}")]
    TransactionAborted(#[source] Box<CheckoutError>),
}

/// Result type for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;
