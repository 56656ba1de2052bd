//! Aggregation of cart lines into per-key stock requirements.

use std::collections::BTreeMap;

use common::{StockKey, StockLine};

use crate::cart::ResolvedLine;
use crate::catalog::StockTracking;

/// Total inventory required by a set of cart lines, summed per stock key.
///
/// Contributions from different lines that touch the same key are summed,
/// never overwritten: two lines needing 100 and 50 of the same ingredient
/// aggregate to a single 150 entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockRequirements {
    required: BTreeMap<StockKey, u64>,
}

impl StockRequirements {
    /// Creates an empty requirement set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregates the requirements of the given resolved cart lines.
    ///
    /// Per line:
    /// - a directly tracked variation requires `quantity` under its own key;
    /// - a recipe variation requires `recipe_qty * quantity` of each
    ///   ingredient its recipe lists;
    /// - every selected extra that consumes an ingredient additionally
    ///   requires `use_qty * extra_qty * quantity` of that ingredient.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a ResolvedLine>) -> Self {
        let mut requirements = Self::new();
        for line in lines {
            requirements.add_line(line);
        }
        requirements
    }

    fn add_line(&mut self, line: &ResolvedLine) {
        let line_quantity = u64::from(line.cart_item.quantity);

        match &line.variation.tracking {
            StockTracking::Direct => {
                self.add(StockKey::Variation(line.variation.id), line_quantity);
            }
            StockTracking::Recipe(recipe) => {
                for recipe_line in recipe {
                    self.add(
                        StockKey::Ingredient(recipe_line.ingredient_id),
                        recipe_line.quantity * line_quantity,
                    );
                }
            }
        }

        for (extra, extra_quantity) in &line.extras {
            if let Some(usage) = &extra.ingredient_use {
                self.add(
                    StockKey::Ingredient(usage.ingredient_id),
                    usage.quantity * u64::from(*extra_quantity) * line_quantity,
                );
            }
        }
    }

    /// Adds a contribution for one key, summing with any existing entry.
    pub fn add(&mut self, key: StockKey, quantity: u64) {
        if quantity == 0 {
            return;
        }
        *self.required.entry(key).or_insert(0) += quantity;
    }

    /// Returns the required quantity for one key (0 if absent).
    pub fn get(&self, key: &StockKey) -> u64 {
        self.required.get(key).copied().unwrap_or(0)
    }

    /// Iterates over `(key, required quantity)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (StockKey, u64)> + '_ {
        self.required.iter().map(|(key, quantity)| (*key, *quantity))
    }

    /// Returns the distinct keys in order.
    pub fn keys(&self) -> Vec<StockKey> {
        self.required.keys().copied().collect()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.required.len()
    }

    /// Returns true if no stock is required.
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// Converts the requirements into snapshot entries.
    pub fn to_stock_lines(&self) -> Vec<StockLine> {
        self.iter()
            .map(|(key, quantity)| StockLine::new(key, quantity))
            .collect()
    }
}
