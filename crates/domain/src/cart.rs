//! Cart lines and their catalog-resolved form.

use chrono::{DateTime, Utc};
use common::{CartItemId, Money, UserId, VariationId};
use serde::{Deserialize, Serialize};

use crate::catalog::{Extra, Product, Variation};
use crate::error::DomainError;
use crate::pricing;

/// An extra selected on a cart line, by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedExtra {
    /// The extra chosen.
    pub extra_id: common::ExtraId,
    /// How many units of the extra per unit of the line.
    pub quantity: u32,
}

/// A user-selected variation plus extras and quantity, pre-order.
///
/// Owned exclusively by the user until checkout; deleted atomically when
/// consumed by order creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Cart line identifier.
    pub id: CartItemId,
    /// Owning user.
    pub user_id: UserId,
    /// The variation to purchase.
    pub variation_id: VariationId,
    /// Units of the variation.
    pub quantity: u32,
    /// Selected extras.
    pub extras: Vec<SelectedExtra>,
    /// Stored line total, recomputed and verified at checkout.
    pub total: Money,
    /// When the line was added.
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart line.
    pub fn new(
        user_id: UserId,
        variation_id: VariationId,
        quantity: u32,
        extras: Vec<SelectedExtra>,
        total: Money,
    ) -> Self {
        Self {
            id: CartItemId::new(),
            user_id,
            variation_id,
            quantity,
            extras,
            total,
            created_at: Utc::now(),
        }
    }
}

/// A cart line joined with the catalog entities it references.
///
/// This is the unit both the price aggregator and the stock requirement
/// aggregator work on.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    /// The raw cart line.
    pub cart_item: CartItem,
    /// The product the variation belongs to.
    pub product: Product,
    /// The chosen variation.
    pub variation: Variation,
    /// The chosen extras, paired with their selected quantity.
    pub extras: Vec<(Extra, u32)>,
}

impl ResolvedLine {
    /// Recomputes the exact line total from catalog prices.
    pub fn total(&self) -> Result<Money, DomainError> {
        let extras: Vec<(Money, u32)> = self
            .extras
            .iter()
            .map(|(extra, quantity)| (extra.price, *quantity))
            .collect();
        pricing::line_total(
            self.product.price,
            self.variation.price_multiplier,
            &extras,
            self.cart_item.quantity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StockTracking;
    use common::{ExtraId, ProductId};

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn line(quantity: u32, extras: Vec<(Extra, u32)>) -> ResolvedLine {
        let product = Product {
            id: ProductId::new(),
            name: "Pizza".to_string(),
            price: money("10.00"),
        };
        let variation = Variation {
            id: VariationId::new(),
            product_id: product.id,
            name: "large".to_string(),
            price_multiplier: "1.5".parse().unwrap(),
            tracking: StockTracking::Direct,
        };
        let selected = extras
            .iter()
            .map(|(extra, quantity)| SelectedExtra {
                extra_id: extra.id,
                quantity: *quantity,
            })
            .collect();
        ResolvedLine {
            cart_item: CartItem::new(
                UserId::new(),
                variation.id,
                quantity,
                selected,
                Money::ZERO,
            ),
            product,
            variation,
            extras,
        }
    }

    #[test]
    fn test_total_without_extras() {
        // 10.00 * 1.5 * 2 = 30.00
        assert_eq!(line(2, vec![]).total().unwrap(), money("30.00"));
    }

    #[test]
    fn test_total_with_extra() {
        let extra = Extra {
            id: ExtraId::new(),
            product_id: ProductId::new(),
            name: "extra cheese".to_string(),
            price: money("2.00"),
            ingredient_use: None,
        };
        // (10.00 * 1.5 + 2.00) * 2 = 34.00
        assert_eq!(line(2, vec![(extra, 1)]).total().unwrap(), money("34.00"));
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        assert!(matches!(
            line(0, vec![]).total(),
            Err(DomainError::Validation(_))
        ));
    }
}
