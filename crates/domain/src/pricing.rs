//! Exact-decimal line pricing.

use common::Money;
use rust_decimal::Decimal;

use crate::error::DomainError;

/// Computes the exact total for one cart line:
///
/// ```text
/// (product_price * multiplier + sum(extra_price * extra_qty)) * quantity
/// ```
///
/// All arithmetic is base-10 decimal; no rounding is applied. Fails with a
/// validation error when the quantity is zero, the multiplier is not
/// positive, or the resulting total is not strictly positive.
pub fn line_total(
    product_price: Money,
    multiplier: Decimal,
    extras: &[(Money, u32)],
    quantity: u32,
) -> Result<Money, DomainError> {
    if quantity == 0 {
        return Err(DomainError::Validation(
            "line quantity must be positive".to_string(),
        ));
    }
    if multiplier <= Decimal::ZERO {
        return Err(DomainError::Validation(format!(
            "price multiplier must be positive, got {multiplier}"
        )));
    }

    let extras_total: Money = extras
        .iter()
        .map(|(price, quantity)| price.times(*quantity))
        .sum();
    let unit = product_price.scaled(multiplier) + extras_total;
    let total = unit.times(quantity);

    if !total.is_positive() {
        return Err(DomainError::Validation(format!(
            "line total must be positive, got {total}"
        )));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_scenario_a_no_extras() {
        let total = line_total(money("10.00"), dec("1.5"), &[], 2).unwrap();
        assert_eq!(total, money("30.00"));
    }

    #[test]
    fn test_scenario_b_one_extra() {
        let total = line_total(money("10.00"), dec("1.5"), &[(money("2.00"), 1)], 2).unwrap();
        assert_eq!(total, money("34.00"));
    }

    #[test]
    fn test_multiple_extras_sum() {
        let extras = [(money("2.00"), 2), (money("0.50"), 3)];
        // (10 * 1 + 4 + 1.5) * 1 = 15.50
        let total = line_total(money("10.00"), dec("1"), &extras, 1).unwrap();
        assert_eq!(total, money("15.50"));
    }

    #[test]
    fn test_exactness_no_drift() {
        // 0.10 * 3 must be exactly 0.30, not 0.30000000000000004.
        let total = line_total(money("0.10"), dec("1"), &[], 3).unwrap();
        assert_eq!(total, money("0.30"));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let result = line_total(money("10.00"), dec("1.5"), &[], 0);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_non_positive_multiplier_rejected() {
        let result = line_total(money("10.00"), dec("0"), &[], 1);
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let result = line_total(money("10.00"), dec("-1"), &[], 1);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_non_positive_total_rejected() {
        let result = line_total(money("0"), dec("1.5"), &[], 2);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
