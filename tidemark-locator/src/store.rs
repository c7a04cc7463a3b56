//! Checkpoint storage abstraction.
//!
//! Provides the `LocatorStore` trait for persisting encoded locators,
//! and `SimulatedLocatorStore` for deterministic simulation testing.
//! Stores deal in raw bytes; encoding and decoding stay with the caller so
//! that legacy layouts written by older versions remain readable.

#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tidemark_core::CheckpointId;

use crate::error::{LocatorError, LocatorResult};

// -----------------------------------------------------------------------------
// Locator Store Trait
// -----------------------------------------------------------------------------

/// Locator store trait for persistence.
///
/// Implementations provide durable, atomically replaced storage for one
/// encoded locator per checkpoint id.
#[async_trait]
pub trait LocatorStore: Send + Sync {
    /// Loads the encoded locator for a checkpoint.
    ///
    /// Returns `None` if nothing has been stored.
    async fn load(&self, checkpoint_id: CheckpointId) -> LocatorResult<Option<Bytes>>;

    /// Stores the encoded locator, replacing any previous value atomically.
    async fn store(&self, checkpoint_id: CheckpointId, data: Bytes) -> LocatorResult<()>;

    /// Removes a checkpoint.
    ///
    /// No-op if the checkpoint doesn't exist.
    async fn remove(&self, checkpoint_id: CheckpointId) -> LocatorResult<()>;

    /// Lists all stored checkpoints.
    async fn list(&self) -> LocatorResult<Vec<CheckpointId>>;

    /// Syncs to durable storage.
    async fn sync(&self) -> LocatorResult<()>;
}

// -----------------------------------------------------------------------------
// Fault Configuration
// -----------------------------------------------------------------------------

/// Failure rates and one-shot failures injected by [`SimulatedLocatorStore`].
///
/// Rates are probabilities in `[0.0, 1.0]`, drawn from the store's seeded RNG.
#[derive(Debug, Clone, Default)]
pub struct LocatorStoreFaultConfig {
    /// Chance that a `load` returns `Io`.
    pub load_fail_rate: f64,
    /// Chance that a `store` returns `Io` without persisting.
    pub store_fail_rate: f64,
    /// Chance that a `remove` returns `Io` and keeps the checkpoint.
    pub remove_fail_rate: f64,
    /// Fails the next `load`, then clears itself.
    pub force_load_fail: bool,
    /// Fails the next `store`, then clears itself.
    pub force_store_fail: bool,
}

impl LocatorStoreFaultConfig {
    /// Every operation succeeds.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            load_fail_rate: 0.0,
            store_fail_rate: 0.0,
            remove_fail_rate: 0.0,
            force_load_fail: false,
            force_store_fail: false,
        }
    }

    /// Builder: set load fail rate.
    #[must_use]
    pub const fn with_load_fail_rate(mut self, rate: f64) -> Self {
        self.load_fail_rate = rate;
        self
    }

    /// Builder: set store fail rate.
    #[must_use]
    pub const fn with_store_fail_rate(mut self, rate: f64) -> Self {
        self.store_fail_rate = rate;
        self
    }

    /// Builder: set remove fail rate.
    #[must_use]
    pub const fn with_remove_fail_rate(mut self, rate: f64) -> Self {
        self.remove_fail_rate = rate;
        self
    }
}

// -----------------------------------------------------------------------------
// Simulated Locator Store
// -----------------------------------------------------------------------------

/// In-memory simulated locator store for DST.
///
/// Clones share state via `Arc` for multi-handle testing.
/// Supports deterministic fault injection for testing error paths.
#[derive(Debug, Clone)]
pub struct SimulatedLocatorStore {
    /// Encoded locators by checkpoint.
    checkpoints: Arc<Mutex<HashMap<CheckpointId, Bytes>>>,
    /// Fault configuration.
    fault_config: Arc<Mutex<LocatorStoreFaultConfig>>,
    /// RNG seed for deterministic faults.
    seed: u64,
    /// Operation counter for deterministic RNG.
    counter: Arc<AtomicU64>,
}

impl SimulatedLocatorStore {
    /// Creates a new simulated store with no faults.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_faults(seed, LocatorStoreFaultConfig::none())
    }

    /// Creates a simulated store with fault injection.
    #[must_use]
    pub fn with_faults(seed: u64, config: LocatorStoreFaultConfig) -> Self {
        Self {
            checkpoints: Arc::new(Mutex::new(HashMap::new())),
            fault_config: Arc::new(Mutex::new(config)),
            seed,
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns fault config for modification.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn fault_config(&self) -> std::sync::MutexGuard<'_, LocatorStoreFaultConfig> {
        self.fault_config.lock().expect("fault config lock poisoned")
    }

    /// Deterministic RNG: `(seed + counter) * M` for reproducible faults.
    fn should_inject_fault(&self, rate: f64) -> bool {
        if rate <= 0.0 {
            return false;
        }
        if rate >= 1.0 {
            return true;
        }
        let counter = self.counter.fetch_add(1, Ordering::Relaxed);
        let hash = self
            .seed
            .wrapping_add(counter)
            .wrapping_mul(0x9e37_79b9_7f4a_7c15);
        #[allow(clippy::cast_precision_loss)]
        let normalized = (hash as f64) / (u64::MAX as f64);
        normalized < rate
    }

    /// Writes raw bytes, bypassing faults.
    ///
    /// Used by tests to plant legacy or corrupted checkpoints.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn put_raw(&self, checkpoint_id: CheckpointId, data: impl Into<Bytes>) {
        let mut checkpoints = self.checkpoints.lock().expect("checkpoints lock poisoned");
        checkpoints.insert(checkpoint_id, data.into());
    }

    /// Reads raw bytes, bypassing faults.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    #[must_use]
    pub fn get_raw(&self, checkpoint_id: CheckpointId) -> Option<Bytes> {
        let checkpoints = self.checkpoints.lock().expect("checkpoints lock poisoned");
        checkpoints.get(&checkpoint_id).cloned()
    }

    /// Returns all stored checkpoints (bypasses faults, for invariant checking).
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    #[must_use]
    pub fn all_checkpoints(&self) -> Vec<(CheckpointId, Bytes)> {
        let checkpoints = self.checkpoints.lock().expect("checkpoints lock poisoned");
        checkpoints.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    /// Returns checkpoint count (bypasses faults, for assertions in tests).
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    #[must_use]
    pub fn checkpoint_count(&self) -> usize {
        let checkpoints = self.checkpoints.lock().expect("checkpoints lock poisoned");
        checkpoints.len()
    }
}

#[async_trait]
impl LocatorStore for SimulatedLocatorStore {
    async fn load(&self, checkpoint_id: CheckpointId) -> LocatorResult<Option<Bytes>> {
        // Check for forced failure.
        {
            let mut config = self.fault_config.lock().expect("lock poisoned");
            if config.force_load_fail {
                config.force_load_fail = false;
                return Err(LocatorError::Io {
                    operation: "load",
                    message: "simulated failure (forced)".into(),
                });
            }
        }

        // Check for probabilistic failure.
        let load_fail_rate = self.fault_config.lock().expect("lock").load_fail_rate;
        if self.should_inject_fault(load_fail_rate) {
            return Err(LocatorError::Io {
                operation: "load",
                message: "simulated failure (random)".into(),
            });
        }

        let checkpoints = self.checkpoints.lock().expect("checkpoints lock poisoned");
        Ok(checkpoints.get(&checkpoint_id).cloned())
    }

    async fn store(&self, checkpoint_id: CheckpointId, data: Bytes) -> LocatorResult<()> {
        // TigerStyle: Assert precondition.
        assert!(!data.is_empty(), "encoded locator must not be empty");

        // Check for forced failure.
        {
            let mut config = self.fault_config.lock().expect("lock poisoned");
            if config.force_store_fail {
                config.force_store_fail = false;
                return Err(LocatorError::Io {
                    operation: "store",
                    message: "simulated failure (forced)".into(),
                });
            }
        }

        // Check for probabilistic failure.
        let store_fail_rate = self.fault_config.lock().expect("lock").store_fail_rate;
        if self.should_inject_fault(store_fail_rate) {
            return Err(LocatorError::Io {
                operation: "store",
                message: "simulated failure (random)".into(),
            });
        }

        let mut checkpoints = self.checkpoints.lock().expect("checkpoints lock poisoned");
        checkpoints.insert(checkpoint_id, data);

        // TigerStyle: Assert postcondition.
        assert!(checkpoints.contains_key(&checkpoint_id));
        Ok(())
    }

    async fn remove(&self, checkpoint_id: CheckpointId) -> LocatorResult<()> {
        // Check for probabilistic failure.
        let remove_fail_rate = self.fault_config.lock().expect("lock").remove_fail_rate;
        if self.should_inject_fault(remove_fail_rate) {
            return Err(LocatorError::Io {
                operation: "remove",
                message: "simulated failure (random)".into(),
            });
        }

        let mut checkpoints = self.checkpoints.lock().expect("checkpoints lock poisoned");
        checkpoints.remove(&checkpoint_id);
        Ok(())
    }

    async fn list(&self) -> LocatorResult<Vec<CheckpointId>> {
        let checkpoints = self.checkpoints.lock().expect("checkpoints lock poisoned");
        let mut ids: Vec<CheckpointId> = checkpoints.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    async fn sync(&self) -> LocatorResult<()> {
        // No-op for in-memory store.
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Locator;
    use tidemark_core::SourceId;

    fn encoded(src: u64, offset: i64) -> Bytes {
        let mut locator = Locator::new(SourceId::new(src));
        locator.set_offset(offset);
        locator.encode()
    }

    #[tokio::test]
    async fn test_basic_operations() {
        let store = SimulatedLocatorStore::new(42);
        let id = CheckpointId::new(1);

        // Nothing stored initially.
        assert!(store.load(id).await.unwrap().is_none());

        let data = encoded(1, 100);
        store.store(id, data.clone()).await.unwrap();
        assert_eq!(store.load(id).await.unwrap(), Some(data));

        store.remove(id).await.unwrap();
        assert!(store.load(id).await.unwrap().is_none());

        // Removing again is a no-op.
        store.remove(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_replaces() {
        let store = SimulatedLocatorStore::new(42);
        let id = CheckpointId::new(1);

        store.store(id, encoded(1, 1)).await.unwrap();
        store.store(id, encoded(1, 2)).await.unwrap();

        let loaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(Locator::decode(&loaded).unwrap().min_offset(), 2);
        assert_eq!(store.checkpoint_count(), 1);
    }

    #[tokio::test]
    async fn test_forced_failure() {
        let store = SimulatedLocatorStore::new(42);
        let id = CheckpointId::new(1);

        // Force load to fail.
        store.fault_config().force_load_fail = true;
        let result = store.load(id).await;
        assert!(matches!(result.unwrap_err(), LocatorError::Io { .. }));

        // Next load should succeed (one-shot).
        assert!(store.load(id).await.is_ok());

        // Force store to fail.
        store.fault_config().force_store_fail = true;
        assert!(store.store(id, encoded(1, 1)).await.is_err());
        assert_eq!(store.checkpoint_count(), 0);

        // Next store should succeed.
        assert!(store.store(id, encoded(1, 1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_probabilistic_failure() {
        // 100% fail rate should always fail.
        let store = SimulatedLocatorStore::with_faults(
            42,
            LocatorStoreFaultConfig::none().with_load_fail_rate(1.0),
        );

        for _ in 0..10 {
            assert!(store.load(CheckpointId::new(1)).await.is_err());
        }
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store1 = SimulatedLocatorStore::new(42);
        let store2 = store1.clone();

        store1.store(CheckpointId::new(1), encoded(1, 5)).await.unwrap();
        assert!(store2.load(CheckpointId::new(1)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let store = SimulatedLocatorStore::new(42);
        assert!(store.list().await.unwrap().is_empty());

        for id in [3, 1, 2] {
            store.store(CheckpointId::new(id), encoded(1, 1)).await.unwrap();
        }

        assert_eq!(
            store.list().await.unwrap(),
            vec![CheckpointId::new(1), CheckpointId::new(2), CheckpointId::new(3)]
        );
    }

    #[tokio::test]
    async fn test_raw_access_bypasses_faults() {
        let store = SimulatedLocatorStore::with_faults(
            7,
            LocatorStoreFaultConfig::none().with_load_fail_rate(1.0),
        );
        store.put_raw(CheckpointId::new(9), &b"raw"[..]);
        assert_eq!(
            store.get_raw(CheckpointId::new(9)).unwrap().as_ref(),
            b"raw"
        );
        assert_eq!(store.all_checkpoints().len(), 1);
    }
}
