//! Stock reservation operations.
//!
//! All mutations run through the caller's transaction, so a failure
//! mid-loop leaves no partially adjusted row once the transaction rolls
//! back. Counters use checked arithmetic in both directions; underflow and
//! overflow are store errors, not wrapped values.

use common::{StockKey, StockLine};
use domain::StockRequirements;

use crate::error::{Result, StoreError};
use crate::store::StoreTransaction;

/// Available/reserved counters for one inventory-tracked item.
///
/// Invariant: both counters are non-negative at all times (enforced by the
/// unsigned representation plus checked subtraction).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StockLevel {
    /// Units on hand and not reserved.
    pub available: u64,
    /// Units reserved by pending orders.
    pub reserved: u64,
}

impl StockLevel {
    /// Creates a stock level.
    pub fn new(available: u64, reserved: u64) -> Self {
        Self {
            available,
            reserved,
        }
    }
}

/// The stock rows backing one aggregated requirement set, loaded in bulk.
#[derive(Debug, Clone)]
pub struct StockReservation {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    key: StockKey,
    required: u64,
    level: StockLevel,
}

impl StockReservation {
    /// Bulk-fetches the stock rows for every key in the requirement set.
    ///
    /// Fails with `StockRowMissing` if any required key has no row.
    pub async fn load<T: StoreTransaction>(
        tx: &T,
        requirements: &StockRequirements,
    ) -> Result<Self> {
        let mut entries = Vec::with_capacity(requirements.len());
        for (key, required) in requirements.iter() {
            let level = tx
                .stock_level(key)
                .await?
                .ok_or(StoreError::StockRowMissing(key))?;
            entries.push(Entry {
                key,
                required,
                level,
            });
        }
        Ok(Self { entries })
    }

    /// Returns the keys whose available count cannot cover the requirement.
    pub fn shortfalls(&self) -> Vec<StockKey> {
        self.entries
            .iter()
            .filter(|entry| entry.level.available < entry.required)
            .map(|entry| entry.key)
            .collect()
    }

    /// Read-only sufficiency check, performed before any mutation.
    pub fn is_sufficient(&self) -> bool {
        self.shortfalls().is_empty()
    }

    /// Moves every required quantity from `available` to `reserved`.
    ///
    /// Returns the snapshot of reserved quantities the order persists for
    /// later settlement. Must run inside the same transaction as the rest
    /// of order creation.
    pub async fn reserve<T: StoreTransaction>(&self, tx: &mut T) -> Result<Vec<StockLine>> {
        let mut snapshot = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let available = entry
                .level
                .available
                .checked_sub(entry.required)
                .ok_or(StoreError::StockUnderflow(entry.key))?;
            let reserved = entry
                .level
                .reserved
                .checked_add(entry.required)
                .ok_or(StoreError::StockOverflow(entry.key))?;
            tx.put_stock_level(entry.key, StockLevel::new(available, reserved))
                .await?;
            snapshot.push(StockLine::new(entry.key, entry.required));
        }
        Ok(snapshot)
    }
}

/// Reverses a reservation: `reserved -= qty; available += qty`.
///
/// Cancellation path; the snapshot comes from the order, never from a
/// recomputation against the current catalog.
pub async fn release<T: StoreTransaction>(tx: &mut T, snapshot: &[StockLine]) -> Result<()> {
    for line in snapshot {
        let level = tx
            .stock_level(line.key)
            .await?
            .ok_or(StoreError::StockRowMissing(line.key))?;
        let reserved = level
            .reserved
            .checked_sub(line.quantity)
            .ok_or(StoreError::StockUnderflow(line.key))?;
        let available = level
            .available
            .checked_add(line.quantity)
            .ok_or(StoreError::StockOverflow(line.key))?;
        tx.put_stock_level(line.key, StockLevel::new(available, reserved))
            .await?;
    }
    Ok(())
}

/// Permanently deducts a reservation: `reserved -= qty`, `available`
/// untouched. Called once payment is confirmed.
pub async fn consume<T: StoreTransaction>(tx: &mut T, snapshot: &[StockLine]) -> Result<()> {
    for line in snapshot {
        let level = tx
            .stock_level(line.key)
            .await?
            .ok_or(StoreError::StockRowMissing(line.key))?;
        let reserved = level
            .reserved
            .checked_sub(line.quantity)
            .ok_or(StoreError::StockUnderflow(line.key))?;
        tx.put_stock_level(line.key, StockLevel::new(level.available, reserved))
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::CheckoutStore;
    use common::IngredientId;

    fn requirements(pairs: &[(StockKey, u64)]) -> StockRequirements {
        let mut requirements = StockRequirements::new();
        for (key, quantity) in pairs {
            requirements.add(*key, *quantity);
        }
        requirements
    }

    #[tokio::test]
    async fn test_load_fails_on_missing_row() {
        let store = MemoryStore::new();
        let key = StockKey::Ingredient(IngredientId::new());

        let tx = store.begin().await.unwrap();
        let result = StockReservation::load(&tx, &requirements(&[(key, 10)])).await;
        assert!(matches!(result, Err(StoreError::StockRowMissing(k)) if k == key));
    }

    #[tokio::test]
    async fn test_sufficiency_check_is_read_only() {
        let store = MemoryStore::new();
        let key = StockKey::Ingredient(IngredientId::new());
        store.seed_stock(key, StockLevel::new(200, 0)).await;

        let tx = store.begin().await.unwrap();
        let reservation = StockReservation::load(&tx, &requirements(&[(key, 400)]))
            .await
            .unwrap();
        assert!(!reservation.is_sufficient());
        assert_eq!(reservation.shortfalls(), vec![key]);
        drop(tx);

        // Nothing was mutated by the check.
        assert_eq!(store.stock_level(key).await, Some(StockLevel::new(200, 0)));
    }

    #[tokio::test]
    async fn test_reserve_then_release_restores_levels() {
        let store = MemoryStore::new();
        let key = StockKey::Ingredient(IngredientId::new());
        store.seed_stock(key, StockLevel::new(500, 20)).await;

        let mut tx = store.begin().await.unwrap();
        let reservation = StockReservation::load(&tx, &requirements(&[(key, 150)]))
            .await
            .unwrap();
        let snapshot = reservation.reserve(&mut tx).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(snapshot, vec![StockLine::new(key, 150)]);
        assert_eq!(
            store.stock_level(key).await,
            Some(StockLevel::new(350, 170))
        );

        let mut tx = store.begin().await.unwrap();
        release(&mut tx, &snapshot).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.stock_level(key).await, Some(StockLevel::new(500, 20)));
    }

    #[tokio::test]
    async fn test_consume_only_decreases_reserved() {
        let store = MemoryStore::new();
        let key = StockKey::Ingredient(IngredientId::new());
        store.seed_stock(key, StockLevel::new(350, 170)).await;

        let mut tx = store.begin().await.unwrap();
        consume(&mut tx, &[StockLine::new(key, 150)]).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.stock_level(key).await, Some(StockLevel::new(350, 20)));
    }

    #[tokio::test]
    async fn test_reserve_overflow_is_an_error() {
        let store = MemoryStore::new();
        let key = StockKey::Ingredient(IngredientId::new());
        store.seed_stock(key, StockLevel::new(10, u64::MAX)).await;

        let mut tx = store.begin().await.unwrap();
        let reservation = StockReservation::load(&tx, &requirements(&[(key, 5)]))
            .await
            .unwrap();
        let result = reservation.reserve(&mut tx).await;
        assert!(matches!(result, Err(StoreError::StockOverflow(k)) if k == key));
    }

    #[tokio::test]
    async fn test_release_overflow_is_an_error() {
        let store = MemoryStore::new();
        let key = StockKey::Ingredient(IngredientId::new());
        store.seed_stock(key, StockLevel::new(u64::MAX, 5)).await;

        let mut tx = store.begin().await.unwrap();
        let result = release(&mut tx, &[StockLine::new(key, 5)]).await;
        assert!(matches!(result, Err(StoreError::StockOverflow(k)) if k == key));
    }

    #[tokio::test]
    async fn test_release_underflow_is_an_error() {
        let store = MemoryStore::new();
        let key = StockKey::Ingredient(IngredientId::new());
        store.seed_stock(key, StockLevel::new(100, 5)).await;

        let mut tx = store.begin().await.unwrap();
        let result = release(&mut tx, &[StockLine::new(key, 10)]).await;
        assert!(matches!(result, Err(StoreError::StockUnderflow(k)) if k == key));
    }

    #[tokio::test]
    async fn test_failed_reserve_leaves_no_partial_state_after_rollback() {
        let store = MemoryStore::new();
        let healthy = StockKey::Ingredient(IngredientId::new());
        let short = StockKey::Ingredient(IngredientId::new());
        store.seed_stock(healthy, StockLevel::new(100, 0)).await;
        store.seed_stock(short, StockLevel::new(1, 0)).await;

        let mut tx = store.begin().await.unwrap();
        let reservation = StockReservation::load(
            &tx,
            &requirements(&[(healthy, 50), (short, 5)]),
        )
        .await
        .unwrap();
        // Underflow on the second key; first key was already staged.
        let result = reservation.reserve(&mut tx).await;
        assert!(result.is_err());
        drop(tx); // rollback

        assert_eq!(
            store.stock_level(healthy).await,
            Some(StockLevel::new(100, 0))
        );
        assert_eq!(store.stock_level(short).await, Some(StockLevel::new(1, 0)));
    }
}
