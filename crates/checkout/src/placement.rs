//! The order-creation saga.

use chrono::Utc;
use domain::{CatalogReader, Order};
use store::{CheckoutStore, StoreTransaction};

use crate::checkout::{Checkout, CheckoutRequest};
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result};
use crate::gateway::PaymentGateway;

/// Places orders: one store transaction spanning the checkout snapshot,
/// order persistence, the payment-gateway call, and cart consumption.
///
/// Holding the transaction open across the network call to the gateway
/// trades throughput for simplicity: a gateway failure rolls back every
/// persisted effect, and gateway-side idempotency on the order id covers
/// client retries.
pub struct OrderPlacer<S, C, G> {
    store: S,
    catalog: C,
    gateway: G,
    config: CheckoutConfig,
}

impl<S, C, G> OrderPlacer<S, C, G>
where
    S: CheckoutStore,
    C: CatalogReader,
    G: PaymentGateway,
{
    /// Creates a new order placer.
    pub fn new(store: S, catalog: C, gateway: G, config: CheckoutConfig) -> Self {
        Self {
            store,
            catalog,
            gateway,
            config,
        }
    }

    /// Returns the checkout configuration.
    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Builds a read-only checkout snapshot without creating an order.
    ///
    /// Used to show the user totals and discounts before they confirm.
    #[tracing::instrument(skip(self))]
    pub async fn preview(&self, request: &CheckoutRequest) -> Result<CheckoutPreview> {
        let tx = self.store.begin().await?;
        let checkout =
            Checkout::prepare(&tx, &self.catalog, &self.config, request, Utc::now()).await?;
        Ok(CheckoutPreview {
            total_price: checkout.total_price(),
            coupon_discount: checkout.coupon_discount(),
            total_to_pay: checkout.total_to_pay(),
            coupon_error: checkout.coupon_error().map(str::to_string),
            stocks: checkout.stock_lines(),
        })
    }

    /// Runs the order-creation saga.
    ///
    /// Steps, all inside one transaction:
    /// 1. Build the checkout snapshot (priced, coupon-applied, stock-checked).
    /// 2. Insert the order: pending, `expires_at = now + ttl`, stock snapshot.
    /// 3. Insert the immutable order lines.
    /// 4. Create the payment at the gateway and persist its id.
    /// 5. Reserve stock, delete the cart lines, mark the coupon used.
    ///
    /// Any failure at any step aborts the entire transaction: no order, no
    /// order line, no stock mutation, no cart deletion, and no coupon
    /// decrement survives.
    #[tracing::instrument(skip(self), fields(user_id = %request.user_id))]
    pub async fn place_order(&self, request: &CheckoutRequest) -> Result<Order> {
        metrics::counter!("order_placements_total").increment(1);
        let start = std::time::Instant::now();

        let mut tx = self.store.begin().await?;
        match self.run(&mut tx, request).await {
            Ok(order) => {
                tx.commit().await?;
                metrics::histogram!("order_placement_duration_seconds")
                    .record(start.elapsed().as_secs_f64());
                tracing::info!(
                    order_id = %order.id(),
                    total_to_pay = %order.total_to_pay(),
                    "order placed"
                );
                Ok(order)
            }
            Err(e) => {
                // Dropping the transaction discards every staged write.
                drop(tx);
                metrics::counter!("order_placement_failures_total").increment(1);
                tracing::warn!(error = %e, "order placement aborted");
                Err(CheckoutError::TransactionAborted(Box::new(e)))
            }
        }
    }

    async fn run(&self, tx: &mut S::Tx, request: &CheckoutRequest) -> Result<Order> {
        let now = Utc::now();
        let checkout = Checkout::prepare(tx, &self.catalog, &self.config, request, now).await?;

        let mut order = Order::new(
            request.user_id,
            checkout.total_price(),
            checkout.applied_coupon(),
            self.gateway.name(),
            now,
            self.config.order_ttl,
            checkout.stock_lines(),
        );
        tx.insert_order(order.clone()).await?;
        tx.insert_order_lines(checkout.to_order_lines(order.id())).await?;

        let payment_id = self
            .gateway
            .create_payment(order.id(), order.total_to_pay(), &self.config.currency)
            .await?;
        order.set_payment_id(payment_id);
        tx.update_order(order.clone()).await?;

        checkout.finish(tx).await?;

        Ok(order)
    }
}

/// Read-only totals a user sees before confirming checkout.
#[derive(Debug, Clone)]
pub struct CheckoutPreview {
    /// Undiscounted cart total.
    pub total_price: common::Money,
    /// Coupon discount (zero when none applied).
    pub coupon_discount: common::Money,
    /// Amount that would be charged.
    pub total_to_pay: common::Money,
    /// Soft coupon error under the degrade policy.
    pub coupon_error: Option<String>,
    /// Stock quantities the order would reserve.
    pub stocks: Vec<common::StockLine>,
}
