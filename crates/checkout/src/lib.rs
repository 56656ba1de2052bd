//! Checkout orchestration for the ordering system.
//!
//! This crate composes the domain and store layers into the checkout
//! pipeline:
//! 1. `Checkout::prepare` builds a priced, stock-checked snapshot of a
//!    user's cart (optionally discounted by a coupon).
//! 2. `OrderPlacer::place_order` runs the order-creation saga in a single
//!    store transaction: persist the order and its lines, create the
//!    payment at the gateway, reserve stock, delete the cart, and mark the
//!    coupon used. Any failure aborts the whole transaction.
//! 3. `OrderSettlement::settle` later confirms or cancels a pending order
//!    from a gateway poll, compensating purely from the order's persisted
//!    stock snapshot.

pub mod checkout;
pub mod config;
pub mod error;
pub mod gateway;
pub mod placement;
pub mod settlement;

pub use checkout::{Checkout, CheckoutRequest, PricedLine};
pub use config::{CheckoutConfig, CouponFailurePolicy};
pub use error::CheckoutError;
pub use gateway::{GatewayError, InMemoryPaymentGateway, PaymentGateway};
pub use placement::{CheckoutPreview, OrderPlacer};
pub use settlement::OrderSettlement;
