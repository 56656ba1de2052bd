//! Domain layer for the checkout system.
//!
//! This crate provides the core domain model and pure computation:
//! - Catalog entities (products, variations, recipes, extras) and the
//!   read-only `CatalogReader` seam
//! - Cart lines and their catalog-resolved form
//! - Exact-decimal line pricing
//! - Aggregation of cart lines into per-key stock requirements
//! - Coupon validation and discount calculation
//! - The order model with its payment-status state machine

pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod error;
pub mod order;
pub mod pricing;
pub mod requirements;

pub use cart::{CartItem, ResolvedLine, SelectedExtra};
pub use catalog::{
    CatalogReader, Extra, InMemoryCatalog, IngredientUse, Product, RecipeLine, StockTracking,
    Variation,
};
pub use coupon::{Coupon, Discount};
pub use error::DomainError;
pub use order::{Order, OrderLine, OrderLineExtra, PaymentStatus};
pub use requirements::StockRequirements;
