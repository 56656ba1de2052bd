//! Orders, order lines, and the payment-status state machine.

use chrono::{DateTime, Duration, Utc};
use common::{
    CouponId, ExtraId, Money, OrderId, PaymentId, ProductId, StockLine, UserId, VariationId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Payment status of an order.
///
/// Transitions:
/// ```text
/// Pending ──┬──► Paid ──► Refunded
///           └──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting settlement by the gateway.
    #[default]
    Pending,

    /// Payment confirmed.
    Paid,

    /// Payment cancelled before confirmation (terminal state).
    Cancelled,

    /// Payment refunded after confirmation (terminal state).
    Refunded,
}

impl PaymentStatus {
    /// Returns true if the transition to `next` is allowed.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Cancelled)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Cancelled | PaymentStatus::Refunded)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An extra captured on an order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineExtra {
    /// The extra at purchase time.
    pub extra_id: ExtraId,
    /// Name at purchase time.
    pub name: String,
    /// Price at purchase time.
    pub price: Money,
    /// Selected quantity.
    pub quantity: u32,
}

/// Immutable denormalized snapshot of one purchased cart line.
///
/// Captures names and prices as they were at purchase time, so later
/// catalog edits never retroactively change historical orders. Created
/// once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The order this line belongs to.
    pub order_id: OrderId,
    /// Product reference.
    pub product_id: ProductId,
    /// Product name at purchase time.
    pub product_name: String,
    /// Product base price at purchase time.
    pub product_price: Money,
    /// Variation reference.
    pub variation_id: VariationId,
    /// Variation name at purchase time.
    pub variation_name: String,
    /// Price multiplier at purchase time.
    pub price_multiplier: Decimal,
    /// Extras at purchase time.
    pub extras: Vec<OrderLineExtra>,
    /// Units purchased.
    pub quantity: u32,
    /// Exact line total.
    pub total: Money,
}

/// A durable, priced, inventory-reserved order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    total_price: Money,
    coupon_id: Option<CouponId>,
    coupon_discount: Money,
    payment_status: PaymentStatus,
    payment_gateway: String,
    payment_id: Option<PaymentId>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    /// Stock quantities reserved at creation; the only input the
    /// settlement path may use to release or consume the reservation.
    stocks: Vec<StockLine>,
}

impl Order {
    /// Creates a new pending order.
    pub fn new(
        user_id: UserId,
        total_price: Money,
        coupon: Option<(CouponId, Money)>,
        payment_gateway: impl Into<String>,
        created_at: DateTime<Utc>,
        ttl: Duration,
        stocks: Vec<StockLine>,
    ) -> Self {
        let (coupon_id, coupon_discount) = match coupon {
            Some((id, discount)) => (Some(id), discount),
            None => (None, Money::ZERO),
        };
        Self {
            id: OrderId::new(),
            user_id,
            total_price,
            coupon_id,
            coupon_discount,
            payment_status: PaymentStatus::Pending,
            payment_gateway: payment_gateway.into(),
            payment_id: None,
            created_at,
            expires_at: created_at + ttl,
            stocks,
        }
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the undiscounted cart total.
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Returns the applied coupon, if any.
    pub fn coupon_id(&self) -> Option<CouponId> {
        self.coupon_id
    }

    /// Returns the cached coupon discount.
    pub fn coupon_discount(&self) -> Money {
        self.coupon_discount
    }

    /// Returns the amount actually charged: `total_price - coupon_discount`.
    pub fn total_to_pay(&self) -> Money {
        self.total_price - self.coupon_discount
    }

    /// Returns the current payment status.
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Returns the gateway the payment was created with.
    pub fn payment_gateway(&self) -> &str {
        &self.payment_gateway
    }

    /// Returns the gateway-assigned payment ID, once persisted.
    pub fn payment_id(&self) -> Option<&PaymentId> {
        self.payment_id.as_ref()
    }

    /// Returns the creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the expiration deadline for pending payment.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the persisted stock snapshot.
    pub fn stocks(&self) -> &[StockLine] {
        &self.stocks
    }

    /// Returns true if the pending-payment deadline has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Persists the gateway-assigned payment ID.
    pub fn set_payment_id(&mut self, payment_id: PaymentId) {
        self.payment_id = Some(payment_id);
    }

    /// Transitions the payment status, enforcing the state machine.
    pub fn transition(&mut self, next: PaymentStatus) -> Result<(), DomainError> {
        if !self.payment_status.can_transition_to(next) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.payment_status,
                to: next,
            });
        }
        self.payment_status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::StockKey;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn order(coupon: Option<(CouponId, Money)>) -> Order {
        Order::new(
            UserId::new(),
            money("150.50"),
            coupon,
            "fake-gateway",
            Utc::now(),
            Duration::minutes(30),
            vec![StockLine::new(
                StockKey::Variation(VariationId::new()),
                2,
            )],
        )
    }

    #[test]
    fn test_pending_transitions() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Cancelled));
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Pending));
    }

    #[test]
    fn test_paid_transitions() {
        assert!(PaymentStatus::Paid.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Paid.can_transition_to(PaymentStatus::Cancelled));
        assert!(!PaymentStatus::Paid.can_transition_to(PaymentStatus::Pending));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(!PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Cancelled.is_terminal());
        assert!(PaymentStatus::Refunded.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(PaymentStatus::Pending.to_string(), "pending");
        assert_eq!(PaymentStatus::Refunded.to_string(), "refunded");
    }

    #[test]
    fn test_total_to_pay_subtracts_discount() {
        let with_coupon = order(Some((CouponId::new(), money("30.10"))));
        assert_eq!(with_coupon.total_to_pay(), money("120.40"));

        let without = order(None);
        assert_eq!(without.total_to_pay(), money("150.50"));
    }

    #[test]
    fn test_new_order_is_pending_with_ttl() {
        let order = order(None);
        assert_eq!(order.payment_status(), PaymentStatus::Pending);
        assert_eq!(order.expires_at() - order.created_at(), Duration::minutes(30));
        assert!(!order.is_expired(order.created_at()));
        assert!(order.is_expired(order.expires_at() + Duration::seconds(1)));
    }

    #[test]
    fn test_transition_enforces_state_machine() {
        let mut order = order(None);
        order.transition(PaymentStatus::Paid).unwrap();
        assert_eq!(order.payment_status(), PaymentStatus::Paid);

        let result = order.transition(PaymentStatus::Cancelled);
        assert!(matches!(
            result,
            Err(DomainError::InvalidStatusTransition { .. })
        ));

        order.transition(PaymentStatus::Refunded).unwrap();
        assert!(order.payment_status().is_terminal());
    }

    #[test]
    fn test_stocks_snapshot_survives_serialization() {
        let order = order(None);
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
        assert_eq!(deserialized.stocks(), order.stocks());
    }
}
