//! Coupon validation and discount calculation.

use chrono::{DateTime, Utc};
use common::{CouponId, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The discount a coupon grants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Fraction of the total, value must lie in (0, 1).
    Percentage(Decimal),
    /// Fixed amount, must be positive.
    Flat(Money),
}

/// A discount code with temporal, usage, and minimum-purchase constraints.
///
/// Validation and discount calculation are pure; only `use_once` and
/// `refund_use` ever mutate the usage counter, and only the order-creation
/// saga (after durable creation) and the cancellation path call them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    /// Coupon identifier.
    pub id: CouponId,
    /// Unique redemption code.
    pub code: String,
    /// The discount granted.
    pub discount: Discount,
    /// Start of the validity window.
    pub starts_at: DateTime<Utc>,
    /// End of the validity window.
    pub ends_at: DateTime<Utc>,
    /// Remaining uses; `None` means unlimited.
    pub remaining_uses: Option<u32>,
    /// Minimum cart total required to redeem.
    pub minimum_purchase: Money,
}

impl Coupon {
    /// Checks the temporal, usage, and minimum-purchase rules.
    ///
    /// Does not mutate the coupon.
    pub fn validate(&self, now: DateTime<Utc>, total: Money) -> Result<(), DomainError> {
        if now < self.starts_at || now > self.ends_at {
            return Err(DomainError::CouponExpired);
        }
        if self.remaining_uses == Some(0) {
            return Err(DomainError::CouponExhausted);
        }
        if total < self.minimum_purchase {
            return Err(DomainError::CouponMinimumNotMet {
                minimum: self.minimum_purchase,
                total,
            });
        }
        Ok(())
    }

    /// Computes the discount for a given total.
    ///
    /// Percentage values must lie strictly between 0 and 1; flat values must
    /// be positive. Anything else is an invalid discount configuration.
    pub fn discount_for(&self, total: Money) -> Result<Money, DomainError> {
        match self.discount {
            Discount::Percentage(value) => {
                if value <= Decimal::ZERO || value >= Decimal::ONE {
                    return Err(DomainError::InvalidDiscountType(format!(
                        "percentage must lie in (0, 1), got {value}"
                    )));
                }
                Ok(total.scaled(value))
            }
            Discount::Flat(value) => {
                if !value.is_positive() {
                    return Err(DomainError::InvalidDiscountType(format!(
                        "flat discount must be positive, got {value}"
                    )));
                }
                Ok(value)
            }
        }
    }

    /// Validates and then computes the discount. Never mutates state.
    pub fn apply(&self, now: DateTime<Utc>, total: Money) -> Result<Money, DomainError> {
        self.validate(now, total)?;
        self.discount_for(total)
    }

    /// Consumes one use, if usage is tracked.
    ///
    /// Called only after the order is durably created; the caller persists
    /// the coupon inside the same transaction.
    pub fn use_once(&mut self) -> Result<(), DomainError> {
        match self.remaining_uses {
            Some(0) => Err(DomainError::CouponExhausted),
            Some(n) => {
                self.remaining_uses = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Returns one use, if usage is tracked. Cancellation path.
    pub fn refund_use(&mut self) {
        if let Some(n) = self.remaining_uses {
            self.remaining_uses = Some(n + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn coupon(discount: Discount) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: CouponId::new(),
            code: "WELCOME".to_string(),
            discount,
            starts_at: now - Duration::days(1),
            ends_at: now + Duration::days(1),
            remaining_uses: Some(10),
            minimum_purchase: money("50"),
        }
    }

    #[test]
    fn test_scenario_c_percentage_discount() {
        let coupon = coupon(Discount::Percentage(dec("0.20")));
        let discount = coupon.apply(Utc::now(), money("150.50")).unwrap();
        assert_eq!(discount, money("30.10"));
        assert_eq!(money("150.50") - discount, money("120.40"));
    }

    #[test]
    fn test_flat_discount() {
        let coupon = coupon(Discount::Flat(money("5.00")));
        let discount = coupon.apply(Utc::now(), money("60.00")).unwrap();
        assert_eq!(discount, money("5.00"));
    }

    #[test]
    fn test_expired_before_and_after_window() {
        let coupon = coupon(Discount::Flat(money("5.00")));

        let before = coupon.starts_at - Duration::hours(1);
        assert!(matches!(
            coupon.validate(before, money("100")),
            Err(DomainError::CouponExpired)
        ));

        let after = coupon.ends_at + Duration::hours(1);
        assert!(matches!(
            coupon.validate(after, money("100")),
            Err(DomainError::CouponExpired)
        ));
    }

    #[test]
    fn test_exhausted() {
        let mut c = coupon(Discount::Flat(money("5.00")));
        c.remaining_uses = Some(0);
        assert!(matches!(
            c.validate(Utc::now(), money("100")),
            Err(DomainError::CouponExhausted)
        ));
    }

    #[test]
    fn test_unlimited_uses_never_exhaust() {
        let mut c = coupon(Discount::Flat(money("5.00")));
        c.remaining_uses = None;
        c.use_once().unwrap();
        assert!(c.validate(Utc::now(), money("100")).is_ok());
        assert_eq!(c.remaining_uses, None);
    }

    #[test]
    fn test_minimum_not_met() {
        let coupon = coupon(Discount::Flat(money("5.00")));
        assert!(matches!(
            coupon.validate(Utc::now(), money("49.99")),
            Err(DomainError::CouponMinimumNotMet { .. })
        ));
    }

    #[test]
    fn test_percentage_out_of_range_rejected() {
        for value in ["0", "1", "1.5", "-0.2"] {
            let coupon = coupon(Discount::Percentage(dec(value)));
            assert!(matches!(
                coupon.discount_for(money("100")),
                Err(DomainError::InvalidDiscountType(_))
            ));
        }
    }

    #[test]
    fn test_non_positive_flat_rejected() {
        let coupon = coupon(Discount::Flat(money("0")));
        assert!(matches!(
            coupon.discount_for(money("100")),
            Err(DomainError::InvalidDiscountType(_))
        ));
    }

    #[test]
    fn test_apply_never_mutates_uses() {
        let coupon = coupon(Discount::Percentage(dec("0.20")));
        let before = coupon.remaining_uses;
        coupon.apply(Utc::now(), money("100")).unwrap();
        assert_eq!(coupon.remaining_uses, before);
    }

    #[test]
    fn test_use_then_refund_roundtrips() {
        let mut c = coupon(Discount::Flat(money("5.00")));
        c.use_once().unwrap();
        assert_eq!(c.remaining_uses, Some(9));
        c.refund_use();
        assert_eq!(c.remaining_uses, Some(10));
    }

    #[test]
    fn test_use_once_on_exhausted_fails() {
        let mut c = coupon(Discount::Flat(money("5.00")));
        c.remaining_uses = Some(0);
        assert!(matches!(c.use_once(), Err(DomainError::CouponExhausted)));
    }
}
