//! Settlement: confirming or cancelling a pending order.
//!
//! Runs outside the creation transaction, triggered by a payment-status
//! poll or a webhook-initiated call. Compensation reads the order's
//! persisted stock snapshot, never the current catalog: recipes and extras
//! may have changed since the order was placed.

use chrono::{DateTime, Utc};
use common::{OrderId, PaymentId};
use domain::{DomainError, Order, PaymentStatus};
use store::{CheckoutStore, StoreTransaction, stock};

use crate::error::{CheckoutError, Result};
use crate::gateway::PaymentGateway;

/// Settles pending orders against the gateway's reported payment status.
pub struct OrderSettlement<S, G> {
    store: S,
    gateway: G,
}

impl<S, G> OrderSettlement<S, G>
where
    S: CheckoutStore,
    G: PaymentGateway,
{
    /// Creates a new settlement service.
    pub fn new(store: S, gateway: G) -> Self {
        Self { store, gateway }
    }

    /// Polls the gateway and settles one order.
    ///
    /// - Gateway still `pending`: the order is cancelled — cancel the
    ///   payment, release the reserved stock, refund the coupon use.
    /// - Gateway `paid`: the reservation is consumed and the order marked
    ///   paid.
    /// - Gateway `cancelled`: same compensation as the pending case, minus
    ///   the gateway cancel call.
    ///
    /// Orders already settled return their status unchanged. All writes
    /// happen in one transaction; a failure rolls everything back.
    #[tracing::instrument(skip(self))]
    pub async fn settle(&self, order_id: OrderId) -> Result<PaymentStatus> {
        let mut tx = self.store.begin().await?;
        match self.run(&mut tx, order_id).await {
            Ok(status) => {
                tx.commit().await?;
                metrics::counter!("orders_settled_total").increment(1);
                Ok(status)
            }
            Err(e) => {
                drop(tx);
                Err(CheckoutError::TransactionAborted(Box::new(e)))
            }
        }
    }

    /// Cancels an order whose pending-payment deadline has passed.
    ///
    /// Poller entry point. Returns `None` when the order is not pending or
    /// not yet expired; otherwise cancels it as `settle` would for a
    /// still-pending payment and returns the new status.
    #[tracing::instrument(skip(self))]
    pub async fn settle_if_expired(
        &self,
        order_id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<Option<PaymentStatus>> {
        let mut tx = self.store.begin().await?;
        let order = tx
            .order(order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("order", order_id))?;

        if order.payment_status() != PaymentStatus::Pending || !order.is_expired(now) {
            return Ok(None);
        }

        match self.cancel_pending(&mut tx, order).await {
            Ok(status) => {
                tx.commit().await?;
                metrics::counter!("orders_expired_total").increment(1);
                Ok(Some(status))
            }
            Err(e) => {
                drop(tx);
                Err(CheckoutError::TransactionAborted(Box::new(e)))
            }
        }
    }

    async fn run(&self, tx: &mut S::Tx, order_id: OrderId) -> Result<PaymentStatus> {
        let mut order = tx
            .order(order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("order", order_id))?;

        if order.payment_status() != PaymentStatus::Pending {
            return Ok(order.payment_status());
        }

        let payment_id = self.require_payment_id(&order)?;
        let reported = self.gateway.payment_status(&payment_id).await?;

        match reported {
            PaymentStatus::Pending => {
                self.gateway.cancel_payment(&payment_id).await?;
                self.compensate(tx, &mut order).await?;
                tracing::info!(%order_id, "pending order cancelled");
            }
            PaymentStatus::Cancelled => {
                self.compensate(tx, &mut order).await?;
                tracing::info!(%order_id, "gateway-cancelled order compensated");
            }
            PaymentStatus::Paid => {
                stock::consume(tx, order.stocks()).await?;
                order.transition(PaymentStatus::Paid)?;
                tracing::info!(%order_id, "order payment confirmed");
            }
            PaymentStatus::Refunded => {
                // Unreachable from pending per the state machine.
                return Err(DomainError::InvalidStatusTransition {
                    from: PaymentStatus::Pending,
                    to: PaymentStatus::Refunded,
                }
                .into());
            }
        }

        tx.update_order(order.clone()).await?;
        Ok(order.payment_status())
    }

    async fn cancel_pending(&self, tx: &mut S::Tx, mut order: Order) -> Result<PaymentStatus> {
        let payment_id = self.require_payment_id(&order)?;
        self.gateway.cancel_payment(&payment_id).await?;
        self.compensate(tx, &mut order).await?;
        tx.update_order(order.clone()).await?;
        tracing::info!(order_id = %order.id(), "expired order cancelled");
        Ok(order.payment_status())
    }

    /// Releases the reserved stock, refunds the coupon use, and marks the
    /// order cancelled. Uses only the order's persisted snapshot.
    async fn compensate(&self, tx: &mut S::Tx, order: &mut Order) -> Result<()> {
        stock::release(tx, order.stocks()).await?;

        if let Some(coupon_id) = order.coupon_id() {
            if let Some(mut coupon) = tx.coupon(coupon_id).await? {
                coupon.refund_use();
                tx.put_coupon(coupon).await?;
            }
        }

        order.transition(PaymentStatus::Cancelled)?;
        Ok(())
    }

    fn require_payment_id(&self, order: &Order) -> Result<PaymentId> {
        order
            .payment_id()
            .cloned()
            .ok_or_else(|| {
                DomainError::Validation(format!("order {} has no payment id", order.id())).into()
            })
    }
}
