//! The checkout orchestrator.
//!
//! Builds the priced, stock-checked snapshot of a user's cart that order
//! creation consumes. The orchestrator composes the cart reader, price
//! aggregator, coupon rules, and stock reservation store; it never owns a
//! transaction itself, so the caller decides the atomicity boundary.

use chrono::{DateTime, Utc};
use common::{CartItemId, CouponId, Money, OrderId, StockLine, UserId};
use domain::{
    CatalogReader, DomainError, OrderLine, OrderLineExtra, ResolvedLine, StockRequirements,
};
use store::{StockReservation, StoreTransaction};

use crate::config::{CheckoutConfig, CouponFailurePolicy};
use crate::error::{CheckoutError, Result};

/// What a user is checking out.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// The user whose cart is consumed.
    pub user_id: UserId,
    /// Restrict checkout to these cart lines; `None` means the whole cart.
    pub cart_item_ids: Option<Vec<CartItemId>>,
    /// Coupon code to apply, if any.
    pub coupon_code: Option<String>,
}

/// One cart line with its recomputed exact total.
#[derive(Debug, Clone)]
pub struct PricedLine {
    /// The catalog-resolved cart line.
    pub line: ResolvedLine,
    /// Exact line total.
    pub total: Money,
}

#[derive(Debug, Clone, Copy)]
struct AppliedCoupon {
    id: CouponId,
    discount: Money,
}

/// A priced, stock-checked snapshot of a cart, ready for order creation.
#[derive(Debug)]
pub struct Checkout {
    lines: Vec<PricedLine>,
    total_price: Money,
    coupon: Option<AppliedCoupon>,
    coupon_error: Option<String>,
    requirements: StockRequirements,
    reservation: StockReservation,
}

impl Checkout {
    /// Builds the checkout snapshot.
    ///
    /// Loads the requested cart lines, resolves them against the catalog,
    /// reprices each line exactly, applies the coupon per the configured
    /// failure policy, aggregates stock requirements, and verifies
    /// sufficiency. Read-only: no stock, cart, or coupon mutation happens
    /// until [`Checkout::finish`].
    pub async fn prepare<T, C>(
        tx: &T,
        catalog: &C,
        config: &CheckoutConfig,
        request: &CheckoutRequest,
        now: DateTime<Utc>,
    ) -> Result<Self>
    where
        T: StoreTransaction,
        C: CatalogReader + ?Sized,
    {
        let items = tx
            .cart_items(request.user_id, request.cart_item_ids.as_deref())
            .await?;

        if let Some(requested) = &request.cart_item_ids {
            for id in requested {
                if !items.iter().any(|item| item.id == *id) {
                    return Err(DomainError::not_found("cart item", id).into());
                }
            }
        }
        if items.is_empty() {
            return Err(DomainError::Validation(
                "no cart lines to check out".to_string(),
            )
            .into());
        }

        let mut lines = Vec::with_capacity(items.len());
        let mut total_price = Money::ZERO;
        for item in items {
            let variation = catalog
                .variation(item.variation_id)
                .await?
                .ok_or_else(|| DomainError::not_found("variation", item.variation_id))?;
            let product = catalog
                .product(variation.product_id)
                .await?
                .ok_or_else(|| DomainError::not_found("product", variation.product_id))?;

            let mut extras = Vec::with_capacity(item.extras.len());
            for selected in &item.extras {
                let extra = catalog
                    .extra(selected.extra_id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("extra", selected.extra_id))?;
                extras.push((extra, selected.quantity));
            }

            let line = ResolvedLine {
                cart_item: item,
                product,
                variation,
                extras,
            };
            let total = line.total()?;
            total_price += total;
            lines.push(PricedLine { line, total });
        }

        let mut coupon = None;
        let mut coupon_error = None;
        if let Some(code) = &request.coupon_code {
            match Self::apply_coupon(tx, code, total_price, now).await {
                Ok(applied) => coupon = Some(applied),
                Err(e) => match config.coupon_failure {
                    CouponFailurePolicy::Abort => return Err(e),
                    CouponFailurePolicy::Degrade => {
                        tracing::warn!(%code, error = %e, "coupon rejected, proceeding without discount");
                        coupon_error = Some(e.to_string());
                    }
                },
            }
        }

        let requirements =
            StockRequirements::from_lines(lines.iter().map(|priced| &priced.line));
        let reservation = StockReservation::load(tx, &requirements).await?;
        let shortfalls = reservation.shortfalls();
        if !shortfalls.is_empty() {
            return Err(CheckoutError::InsufficientStock(shortfalls));
        }

        Ok(Self {
            lines,
            total_price,
            coupon,
            coupon_error,
            requirements,
            reservation,
        })
    }

    async fn apply_coupon<T: StoreTransaction>(
        tx: &T,
        code: &str,
        total: Money,
        now: DateTime<Utc>,
    ) -> Result<AppliedCoupon> {
        let coupon = tx
            .coupon_by_code(code)
            .await?
            .ok_or_else(|| DomainError::not_found("coupon", code))?;
        let discount = coupon.apply(now, total)?;
        Ok(AppliedCoupon {
            id: coupon.id,
            discount,
        })
    }

    /// The priced lines.
    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    /// Undiscounted cart total.
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Coupon discount (zero when no coupon applied).
    pub fn coupon_discount(&self) -> Money {
        self.coupon.map(|applied| applied.discount).unwrap_or(Money::ZERO)
    }

    /// Amount to charge: `total_price - coupon_discount`.
    pub fn total_to_pay(&self) -> Money {
        self.total_price - self.coupon_discount()
    }

    /// The applied coupon as `(id, discount)`, if any.
    pub fn applied_coupon(&self) -> Option<(CouponId, Money)> {
        self.coupon.map(|applied| (applied.id, applied.discount))
    }

    /// The soft coupon error recorded under the degrade policy, if any.
    pub fn coupon_error(&self) -> Option<&str> {
        self.coupon_error.as_deref()
    }

    /// Aggregated stock requirements.
    pub fn requirements(&self) -> &StockRequirements {
        &self.requirements
    }

    /// The stock snapshot an order created from this checkout persists.
    pub fn stock_lines(&self) -> Vec<StockLine> {
        self.requirements.to_stock_lines()
    }

    /// Builds the immutable denormalized order lines for a created order.
    pub fn to_order_lines(&self, order_id: OrderId) -> Vec<OrderLine> {
        self.lines
            .iter()
            .map(|priced| OrderLine {
                order_id,
                product_id: priced.line.product.id,
                product_name: priced.line.product.name.clone(),
                product_price: priced.line.product.price,
                variation_id: priced.line.variation.id,
                variation_name: priced.line.variation.name.clone(),
                price_multiplier: priced.line.variation.price_multiplier,
                extras: priced
                    .line
                    .extras
                    .iter()
                    .map(|(extra, quantity)| OrderLineExtra {
                        extra_id: extra.id,
                        name: extra.name.clone(),
                        price: extra.price,
                        quantity: *quantity,
                    })
                    .collect(),
                quantity: priced.line.cart_item.quantity,
                total: priced.total,
            })
            .collect()
    }

    /// Commits the cart side of checkout inside the caller's transaction:
    /// reserves stock, deletes the consumed cart lines, and decrements the
    /// coupon's remaining uses.
    ///
    /// Returns the reserved stock snapshot.
    pub async fn finish<T: StoreTransaction>(self, tx: &mut T) -> Result<Vec<StockLine>> {
        let snapshot = self.reservation.reserve(tx).await?;

        let ids: Vec<CartItemId> = self
            .lines
            .iter()
            .map(|priced| priced.line.cart_item.id)
            .collect();
        tx.delete_cart_items(&ids).await?;

        if let Some(applied) = self.coupon {
            let mut coupon = tx
                .coupon(applied.id)
                .await?
                .ok_or_else(|| DomainError::not_found("coupon", applied.id))?;
            coupon.use_once()?;
            tx.put_coupon(coupon).await?;
        }

        Ok(snapshot)
    }
}
