//! Payment gateway capability and in-memory implementation.
//!
//! The concrete provider protocol (SDK, webhook signature verification) is
//! out of scope; this is the seam the saga and settlement paths consume.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, OrderId, PaymentId};
use domain::PaymentStatus;
use thiserror::Error;

/// Errors reported by a payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway declined the payment.
    #[error("Payment rejected: {0}")]
    Rejected(String),

    /// The gateway could not be reached or answered abnormally.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),

    /// The gateway does not know the given payment.
    #[error("Unknown payment: {0}")]
    UnknownPayment(PaymentId),
}

/// Trait for payment gateway operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Gateway name persisted on orders.
    fn name(&self) -> &str;

    /// Creates a payment intent for an order. Gateways key idempotency on
    /// the order id, so a client retry after a rolled-back transaction does
    /// not duplicate the intent.
    async fn create_payment(
        &self,
        order_id: OrderId,
        amount: Money,
        currency: &str,
    ) -> Result<PaymentId, GatewayError>;

    /// Returns the gateway-side status of a payment.
    async fn payment_status(&self, payment_id: &PaymentId) -> Result<PaymentStatus, GatewayError>;

    /// Confirms a pending payment.
    async fn confirm_payment(&self, payment_id: &PaymentId) -> Result<(), GatewayError>;

    /// Cancels a pending payment.
    async fn cancel_payment(&self, payment_id: &PaymentId) -> Result<(), GatewayError>;

    /// Refunds a confirmed payment.
    async fn refund_payment(&self, payment_id: &PaymentId) -> Result<(), GatewayError>;
}

#[derive(Debug)]
struct PaymentRecord {
    order_id: OrderId,
    amount: Money,
    currency: String,
    status: PaymentStatus,
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    payments: HashMap<PaymentId, PaymentRecord>,
    next_id: u32,
    fail_on_create: bool,
}

/// In-memory payment gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to fail on the next create call.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Sets a payment's gateway-side status, standing in for a provider
    /// webhook or out-of-band settlement.
    pub fn set_status(&self, payment_id: &PaymentId, status: PaymentStatus) {
        if let Some(record) = self.state.write().unwrap().payments.get_mut(payment_id) {
            record.status = status;
        }
    }

    /// Returns the number of known payments.
    pub fn payment_count(&self) -> usize {
        self.state.read().unwrap().payments.len()
    }

    /// Returns the amount and currency of a payment, if known.
    pub fn payment_amount(&self, payment_id: &PaymentId) -> Option<(Money, String)> {
        self.state
            .read()
            .unwrap()
            .payments
            .get(payment_id)
            .map(|record| (record.amount, record.currency.clone()))
    }

    /// Returns the order a payment was created for, if known.
    pub fn payment_order(&self, payment_id: &PaymentId) -> Option<OrderId> {
        self.state
            .read()
            .unwrap()
            .payments
            .get(payment_id)
            .map(|record| record.order_id)
    }

    fn set_status_checked(
        &self,
        payment_id: &PaymentId,
        status: PaymentStatus,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.write().unwrap();
        let record = state
            .payments
            .get_mut(payment_id)
            .ok_or_else(|| GatewayError::UnknownPayment(payment_id.clone()))?;
        record.status = status;
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn create_payment(
        &self,
        order_id: OrderId,
        amount: Money,
        currency: &str,
    ) -> Result<PaymentId, GatewayError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_create {
            return Err(GatewayError::Rejected("Payment declined".to_string()));
        }

        state.next_id += 1;
        let payment_id = PaymentId::new(format!("PAY-{:04}", state.next_id));
        state.payments.insert(
            payment_id.clone(),
            PaymentRecord {
                order_id,
                amount,
                currency: currency.to_string(),
                status: PaymentStatus::Pending,
            },
        );

        Ok(payment_id)
    }

    async fn payment_status(&self, payment_id: &PaymentId) -> Result<PaymentStatus, GatewayError> {
        self.state
            .read()
            .unwrap()
            .payments
            .get(payment_id)
            .map(|record| record.status)
            .ok_or_else(|| GatewayError::UnknownPayment(payment_id.clone()))
    }

    async fn confirm_payment(&self, payment_id: &PaymentId) -> Result<(), GatewayError> {
        self.set_status_checked(payment_id, PaymentStatus::Paid)
    }

    async fn cancel_payment(&self, payment_id: &PaymentId) -> Result<(), GatewayError> {
        self.set_status_checked(payment_id, PaymentStatus::Cancelled)
    }

    async fn refund_payment(&self, payment_id: &PaymentId) -> Result<(), GatewayError> {
        self.set_status_checked(payment_id, PaymentStatus::Refunded)
    }
}
