//! In-memory store implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use common::{CartItemId, CouponId, OrderId, StockKey, UserId};
use domain::{CartItem, Coupon, Order, OrderLine};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{Result, StoreError};
use crate::stock::StockLevel;
use crate::store::{CheckoutStore, StoreTransaction};

#[derive(Debug, Clone, Default)]
struct StoreState {
    carts: HashMap<CartItemId, CartItem>,
    stocks: BTreeMap<StockKey, StockLevel>,
    coupons: HashMap<CouponId, Coupon>,
    orders: HashMap<OrderId, Order>,
    order_lines: Vec<OrderLine>,
}

/// In-memory checkout store.
///
/// A transaction takes the store-wide lock for its whole lifetime and
/// stages writes on a working copy; commit swaps the copy in, dropping
/// without commit discards it. Serializing transactions this way is the
/// pessimistic answer to the check-then-reserve race: two checkouts on the
/// same stock key can never interleave between the sufficiency check and
/// the reservation write.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a cart line.
    pub async fn seed_cart_item(&self, item: CartItem) {
        self.state.lock().await.carts.insert(item.id, item);
    }

    /// Seeds a stock row.
    pub async fn seed_stock(&self, key: StockKey, level: StockLevel) {
        self.state.lock().await.stocks.insert(key, level);
    }

    /// Seeds a coupon.
    pub async fn seed_coupon(&self, coupon: Coupon) {
        self.state.lock().await.coupons.insert(coupon.id, coupon);
    }

    /// Returns the committed stock row for one key.
    pub async fn stock_level(&self, key: StockKey) -> Option<StockLevel> {
        self.state.lock().await.stocks.get(&key).copied()
    }

    /// Returns a committed coupon.
    pub async fn coupon(&self, id: CouponId) -> Option<Coupon> {
        self.state.lock().await.coupons.get(&id).cloned()
    }

    /// Returns a committed order.
    pub async fn order(&self, id: OrderId) -> Option<Order> {
        self.state.lock().await.orders.get(&id).cloned()
    }

    /// Returns a user's committed cart lines.
    pub async fn cart_items_for(&self, user_id: UserId) -> Vec<CartItem> {
        self.state
            .lock()
            .await
            .carts
            .values()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Number of committed orders.
    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    /// Number of committed order lines across all orders.
    pub async fn order_line_count(&self) -> usize {
        self.state.lock().await.order_lines.len()
    }
}

#[async_trait]
impl CheckoutStore for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTransaction { guard, working })
    }
}

/// One open transaction on a [`MemoryStore`].
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<StoreState>,
    working: StoreState,
}

impl std::fmt::Debug for MemoryTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransaction").finish_non_exhaustive()
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn cart_items(
        &self,
        user_id: UserId,
        ids: Option<&[CartItemId]>,
    ) -> Result<Vec<CartItem>> {
        let mut items: Vec<CartItem> = self
            .working
            .carts
            .values()
            .filter(|item| item.user_id == user_id)
            .filter(|item| ids.is_none_or(|ids| ids.contains(&item.id)))
            .cloned()
            .collect();
        items.sort_by_key(|item| item.created_at);
        Ok(items)
    }

    async fn delete_cart_items(&mut self, ids: &[CartItemId]) -> Result<()> {
        for id in ids {
            self.working.carts.remove(id);
        }
        Ok(())
    }

    async fn stock_level(&self, key: StockKey) -> Result<Option<StockLevel>> {
        Ok(self.working.stocks.get(&key).copied())
    }

    async fn put_stock_level(&mut self, key: StockKey, level: StockLevel) -> Result<()> {
        self.working.stocks.insert(key, level);
        Ok(())
    }

    async fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        Ok(self
            .working
            .coupons
            .values()
            .find(|coupon| coupon.code == code)
            .cloned())
    }

    async fn coupon(&self, id: CouponId) -> Result<Option<Coupon>> {
        Ok(self.working.coupons.get(&id).cloned())
    }

    async fn put_coupon(&mut self, coupon: Coupon) -> Result<()> {
        self.working.coupons.insert(coupon.id, coupon);
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.working.orders.get(&id).cloned())
    }

    async fn insert_order(&mut self, order: Order) -> Result<()> {
        let id = order.id();
        if self.working.orders.contains_key(&id) {
            return Err(StoreError::OrderExists(id));
        }
        self.working.orders.insert(id, order);
        Ok(())
    }

    async fn update_order(&mut self, order: Order) -> Result<()> {
        let id = order.id();
        if !self.working.orders.contains_key(&id) {
            return Err(StoreError::OrderMissing(id));
        }
        self.working.orders.insert(id, order);
        Ok(())
    }

    async fn insert_order_lines(&mut self, lines: Vec<OrderLine>) -> Result<()> {
        self.working.order_lines.extend(lines);
        Ok(())
    }

    async fn order_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        Ok(self
            .working
            .order_lines
            .iter()
            .filter(|line| line.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn commit(mut self) -> Result<()> {
        *self.guard = self.working;
        Ok(())
    }
}
