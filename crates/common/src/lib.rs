//! Shared types for the checkout system.
//!
//! This crate provides the vocabulary every other crate speaks:
//! - Typed identifiers for users, catalog entities, carts, orders, and coupons
//! - `Money`, an exact base-10 decimal amount (binary floating point is
//!   forbidden for monetary computation)
//! - `StockKey`, the composite inventory key, and `StockLine`, one entry of
//!   an order's persisted stock snapshot

pub mod ids;
pub mod money;
pub mod stock;

pub use ids::{
    CartItemId, CouponId, ExtraId, IngredientId, OrderId, PaymentId, ProductId, UserId,
    VariationId,
};
pub use money::Money;
pub use stock::{StockKey, StockLine};
