//! Store error types.

use common::{OrderId, StockKey};
use thiserror::Error;

/// Errors that can occur when interacting with the checkout store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required stock row does not exist.
    #[error("No stock row for key {0}")]
    StockRowMissing(StockKey),

    /// A stock counter would go negative.
    ///
    /// Counters are invariantly non-negative; hitting this mid-transaction
    /// must roll the enclosing transaction back.
    #[error("Stock counter underflow for key {0}")]
    StockUnderflow(StockKey),

    /// A stock counter would exceed the representable range.
    #[error("Stock counter overflow for key {0}")]
    StockOverflow(StockKey),

    /// An order with this ID already exists.
    #[error("Order already exists: {0}")]
    OrderExists(OrderId),

    /// The order to update does not exist.
    #[error("Order not found: {0}")]
    OrderMissing(OrderId),

    /// A storage backend error occurred.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
