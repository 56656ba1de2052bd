//! Composite inventory keys and persisted stock snapshot entries.

use serde::{Deserialize, Serialize};

use crate::ids::{IngredientId, VariationId};

/// The composite key a stock row is tracked under.
///
/// A variation is either stock-tracked directly under its own id, or
/// indirectly through the ingredients its recipe consumes. Modelling the
/// key as a sum type (rather than an id plus a string tag) makes it
/// impossible to look up a variation count under an ingredient id or
/// vice versa, and lets aggregation maps key on value equality.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(tag = "item_type", content = "item_id", rename_all = "snake_case")]
pub enum StockKey {
    /// Stock tracked directly against a variation.
    Variation(VariationId),
    /// Stock tracked against an inventory ingredient.
    Ingredient(IngredientId),
}

impl std::fmt::Display for StockKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockKey::Variation(id) => write!(f, "variation:{}", id),
            StockKey::Ingredient(id) => write!(f, "ingredient:{}", id),
        }
    }
}

/// One entry of an order's persisted stock snapshot.
///
/// Orders store the exact quantities they reserved as a JSON array of these
/// entries, so the settlement path can release or consume the reservation
/// later without recomputing from the (possibly edited) catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLine {
    /// The stock row the reservation was taken from.
    #[serde(flatten)]
    pub key: StockKey,
    /// Quantity reserved.
    pub quantity: u64,
}

impl StockLine {
    /// Creates a snapshot entry.
    pub fn new(key: StockKey, quantity: u64) -> Self {
        Self { key, quantity }
    }
}
