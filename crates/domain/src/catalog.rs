//! Catalog entities and the read-only catalog seam.
//!
//! Catalog administration (CRUD) is out of scope; checkout only needs
//! point lookups to resolve a cart line before pricing and aggregation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{ExtraId, IngredientId, Money, ProductId, VariationId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Base price before the variation multiplier.
    pub price: Money,
}

/// How much of one ingredient a single unit of a recipe variation consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLine {
    /// The ingredient consumed.
    pub ingredient_id: IngredientId,
    /// Quantity consumed per unit of the variation.
    pub quantity: u64,
}

/// How a variation's inventory is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockTracking {
    /// Stock is counted directly against the variation's own key.
    Direct,
    /// Stock is counted against the ingredients the recipe consumes.
    Recipe(Vec<RecipeLine>),
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    /// Variation identifier.
    pub id: VariationId,
    /// The product this variation belongs to.
    pub product_id: ProductId,
    /// Display name (e.g. "large").
    pub name: String,
    /// Factor applied to the product's base price.
    pub price_multiplier: Decimal,
    /// How this variation's inventory is tracked.
    pub tracking: StockTracking,
}

/// Ingredient consumption attached to an extra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientUse {
    /// The ingredient consumed.
    pub ingredient_id: IngredientId,
    /// Quantity consumed per unit of the extra.
    pub quantity: u64,
}

/// An optional add-on of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extra {
    /// Extra identifier.
    pub id: ExtraId,
    /// The product this extra belongs to.
    pub product_id: ProductId,
    /// Display name (e.g. "extra cheese").
    pub name: String,
    /// Price per unit of the extra.
    pub price: Money,
    /// Ingredient consumption, if this extra draws on inventory.
    pub ingredient_use: Option<IngredientUse>,
}

/// Read-only catalog lookups used to resolve a cart line.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Looks up a product by id.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, DomainError>;

    /// Looks up a variation by id.
    async fn variation(&self, id: VariationId) -> Result<Option<Variation>, DomainError>;

    /// Looks up an extra by id.
    async fn extra(&self, id: ExtraId) -> Result<Option<Extra>, DomainError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, Product>,
    variations: HashMap<VariationId, Variation>,
    extras: HashMap<ExtraId, Extra>,
}

/// In-memory catalog for tests and examples.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a product.
    pub fn insert_product(&self, product: Product) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(product.id, product);
    }

    /// Inserts a variation.
    pub fn insert_variation(&self, variation: Variation) {
        self.state
            .write()
            .unwrap()
            .variations
            .insert(variation.id, variation);
    }

    /// Inserts an extra.
    pub fn insert_extra(&self, extra: Extra) {
        self.state.write().unwrap().extras.insert(extra.id, extra);
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.state.read().unwrap().products.get(&id).cloned())
    }

    async fn variation(&self, id: VariationId) -> Result<Option<Variation>, DomainError> {
        Ok(self.state.read().unwrap().variations.get(&id).cloned())
    }

    async fn extra(&self, id: ExtraId) -> Result<Option<Extra>, DomainError> {
        Ok(self.state.read().unwrap().extras.get(&id).cloned())
    }
}
