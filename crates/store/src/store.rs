//! The transactional store seam.

use async_trait::async_trait;
use common::{CartItemId, CouponId, OrderId, StockKey, UserId};
use domain::{CartItem, Coupon, Order, OrderLine};

use crate::Result;
use crate::stock::StockLevel;

/// A checkout-capable store.
///
/// All reads and writes go through a [`StoreTransaction`] obtained from
/// `begin`, so the caller controls the atomicity boundary: order creation
/// runs its entire saga inside one transaction.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// The transaction type this store produces.
    type Tx: StoreTransaction;

    /// Begins a new transaction.
    async fn begin(&self) -> Result<Self::Tx>;
}

/// One open transaction against the store.
///
/// Writes are staged; `commit` publishes them atomically. Dropping a
/// transaction without committing discards every staged write, which is
/// the rollback path.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Returns a user's cart lines, optionally restricted to explicit ids.
    ///
    /// Lines belonging to other users are never returned, regardless of
    /// the id filter.
    async fn cart_items(
        &self,
        user_id: UserId,
        ids: Option<&[CartItemId]>,
    ) -> Result<Vec<CartItem>>;

    /// Stages deletion of the given cart lines.
    async fn delete_cart_items(&mut self, ids: &[CartItemId]) -> Result<()>;

    /// Returns the stock row for one key, if present.
    async fn stock_level(&self, key: StockKey) -> Result<Option<StockLevel>>;

    /// Stages an upsert of one stock row.
    async fn put_stock_level(&mut self, key: StockKey, level: StockLevel) -> Result<()>;

    /// Looks up a coupon by its redemption code.
    async fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>>;

    /// Looks up a coupon by id.
    async fn coupon(&self, id: CouponId) -> Result<Option<Coupon>>;

    /// Stages an upsert of a coupon (usage counter changes).
    async fn put_coupon(&mut self, coupon: Coupon) -> Result<()>;

    /// Looks up an order by id.
    async fn order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Stages insertion of a new order. Fails if the id already exists.
    async fn insert_order(&mut self, order: Order) -> Result<()>;

    /// Stages an update of an existing order. Fails if the id is unknown.
    async fn update_order(&mut self, order: Order) -> Result<()>;

    /// Stages insertion of the order's immutable lines.
    async fn insert_order_lines(&mut self, lines: Vec<OrderLine>) -> Result<()>;

    /// Returns the lines of an order.
    async fn order_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>>;

    /// Publishes all staged writes atomically.
    async fn commit(self) -> Result<()>;
}
