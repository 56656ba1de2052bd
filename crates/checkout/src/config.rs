//! Checkout configuration loaded from environment variables.

use chrono::Duration;

/// What to do when a coupon fails validation during checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CouponFailurePolicy {
    /// Record the failure on the snapshot and proceed without a discount.
    #[default]
    Degrade,
    /// Abort the checkout with the coupon error.
    Abort,
}

/// Checkout configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `CHECKOUT_CURRENCY` — ISO currency code for payments (default: `"USD"`)
/// - `CHECKOUT_COUPON_FAILURE` — `"degrade"` or `"abort"` (default: `"degrade"`)
/// - `CHECKOUT_ORDER_TTL_MINUTES` — pending-payment deadline (default: `30`)
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub currency: String,
    pub coupon_failure: CouponFailurePolicy,
    pub order_ttl: Duration,
}

impl CheckoutConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let coupon_failure = match std::env::var("CHECKOUT_COUPON_FAILURE").as_deref() {
            Ok("abort") => CouponFailurePolicy::Abort,
            _ => CouponFailurePolicy::Degrade,
        };
        let ttl_minutes = std::env::var("CHECKOUT_ORDER_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        Self {
            currency: std::env::var("CHECKOUT_CURRENCY").unwrap_or_else(|_| "USD".to_string()),
            coupon_failure,
            order_ttl: Duration::minutes(ttl_minutes),
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            coupon_failure: CouponFailurePolicy::Degrade,
            order_ttl: Duration::minutes(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = CheckoutConfig::default();
        assert_eq!(config.currency, "USD");
        assert_eq!(config.coupon_failure, CouponFailurePolicy::Degrade);
        assert_eq!(config.order_ttl, Duration::minutes(30));
    }

    #[test]
    fn test_default_policy_is_degrade() {
        assert_eq!(CouponFailurePolicy::default(), CouponFailurePolicy::Degrade);
    }
}
