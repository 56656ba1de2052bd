//! Transactional persistence seam for the checkout system.
//!
//! This crate provides:
//! - `CheckoutStore` / `StoreTransaction`, the begin/commit/rollback seam
//!   every write goes through so a checkout's effects are all-or-nothing
//! - The stock reservation operations (load, sufficiency check, reserve,
//!   release, consume) with non-negative counter invariants
//! - `MemoryStore`, an in-memory implementation whose transactions hold a
//!   store-wide lock and stage writes on a working copy

pub mod error;
pub mod memory;
pub mod stock;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, MemoryTransaction};
pub use stock::{StockLevel, StockReservation, consume, release};
pub use store::{CheckoutStore, StoreTransaction};
