//! Checkpoint manager for coordinating locator persistence.
//!
//! The `CheckpointManager` owns the read-merge-write cycle around a
//! [`LocatorStore`]:
//! - Merging worker snapshots into the persisted master locator
//! - Treating corrupted checkpoints as missing
//! - Freshness queries ("is this consumer caught up?")
//! - Per-shard views for hash-range reassignment

use std::sync::Arc;

use tidemark_core::{CheckpointId, HashRange};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::CheckpointConfig;
use crate::error::{LocatorError, LocatorResult};
use crate::locator::{Freshness, Locator};
use crate::store::LocatorStore;

// -----------------------------------------------------------------------------
// Checkpoint Manager
// -----------------------------------------------------------------------------

/// Checkpoint manager orchestrates locator merges and persistence.
///
/// # Design
///
/// The manager does NOT perform background work - the caller must invoke
/// methods explicitly. Every successful commit is persisted through the
/// `LocatorStore` before it is returned.
///
/// # Thread Safety
///
/// The manager is `Send + Sync`. Commits are serialized so that concurrent
/// snapshots are never merged against the same stale base.
pub struct CheckpointManager<S: LocatorStore> {
    /// Storage backend.
    store: Arc<S>,
    /// Configuration.
    config: CheckpointConfig,
    /// Serializes read-merge-write cycles.
    commit_lock: Mutex<()>,
}

impl<S: LocatorStore> CheckpointManager<S> {
    /// Creates a new checkpoint manager.
    #[must_use]
    pub fn new(store: S, config: CheckpointConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
            commit_lock: Mutex::new(()),
        }
    }

    /// Returns a reference to the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CheckpointConfig {
        &self.config
    }

    /// Loads the persisted locator for a checkpoint.
    ///
    /// Malformed bytes are logged and reported as a missing checkpoint, so
    /// the caller falls back to a full resync instead of failing.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    pub async fn load(&self, checkpoint_id: CheckpointId) -> LocatorResult<Option<Locator>> {
        let Some(data) = self.store.load(checkpoint_id).await? else {
            return Ok(None);
        };

        match Locator::decode(&data) {
            Ok(locator) => Ok(Some(locator)),
            Err(err) => {
                warn!(
                    checkpoint_id = %checkpoint_id,
                    len = data.len(),
                    %err,
                    "Discarding malformed checkpoint"
                );
                Ok(None)
            }
        }
    }

    /// Merges a worker snapshot into the persisted locator.
    ///
    /// Returns the merged locator as persisted.
    ///
    /// # Errors
    ///
    /// Returns `Regression` if the snapshot is stale for an overlapping
    /// range (nothing is persisted), `LimitExceeded` if the result would
    /// exceed configured bounds, or a storage error.
    pub async fn commit(
        &self,
        checkpoint_id: CheckpointId,
        snapshot: &Locator,
    ) -> LocatorResult<Locator> {
        self.check_limits(snapshot)?;

        let _guard = self.commit_lock.lock().await;

        let merged = match self.load(checkpoint_id).await? {
            None => snapshot.clone(),
            Some(mut current) => {
                let previous_src = current.src();
                if let Err(err) = current.update(snapshot) {
                    warn!(
                        checkpoint_id = %checkpoint_id,
                        src = %previous_src,
                        %err,
                        "Discarding stale snapshot"
                    );
                    return Err(err);
                }
                if current.src() != previous_src {
                    info!(
                        checkpoint_id = %checkpoint_id,
                        from_src = %previous_src,
                        to_src = %current.src(),
                        "Checkpoint moved to new source epoch"
                    );
                }
                current
            }
        };

        self.check_limits(&merged)?;
        self.store.store(checkpoint_id, merged.encode()).await?;

        debug!(checkpoint_id = %checkpoint_id, locator = %merged, "Committed checkpoint");
        Ok(merged)
    }

    /// Compares the persisted locator against `target`.
    ///
    /// A missing checkpoint is `Slower` than anything.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    pub async fn freshness(
        &self,
        checkpoint_id: CheckpointId,
        target: &Locator,
    ) -> LocatorResult<Freshness> {
        let freshness = match self.load(checkpoint_id).await? {
            Some(stored) => stored.is_faster_than(target, self.config.ignore_legacy_diff_src),
            None => Freshness::Slower,
        };
        debug!(checkpoint_id = %checkpoint_id, ?freshness, "Compared checkpoint");
        Ok(freshness)
    }

    /// Returns true if the persisted locator is fully faster than `target`.
    ///
    /// Incomparable sources count as not caught up.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    pub async fn is_caught_up(
        &self,
        checkpoint_id: CheckpointId,
        target: &Locator,
    ) -> LocatorResult<bool> {
        Ok(self.freshness(checkpoint_id, target).await? == Freshness::FullyFaster)
    }

    /// Returns the persisted locator restricted to one shard's hash range.
    ///
    /// The view is not persisted.
    ///
    /// # Errors
    ///
    /// Returns `RangeNotCovered` if the checkpoint does not span `range`,
    /// or a storage error.
    pub async fn shard_view(
        &self,
        checkpoint_id: CheckpointId,
        range: HashRange,
    ) -> LocatorResult<Option<Locator>> {
        let Some(mut locator) = self.load(checkpoint_id).await? else {
            return Ok(None);
        };
        locator.shrink_to_range(range)?;
        Ok(Some(locator))
    }

    /// Removes a checkpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    pub async fn remove(&self, checkpoint_id: CheckpointId) -> LocatorResult<()> {
        let _guard = self.commit_lock.lock().await;
        self.store.remove(checkpoint_id).await?;
        info!(checkpoint_id = %checkpoint_id, "Removed checkpoint");
        Ok(())
    }

    fn check_limits(&self, locator: &Locator) -> LocatorResult<()> {
        // TigerStyle: Check limits.
        let entries = locator.progress().len() as u64;
        if entries > u64::from(self.config.max_progress_entries) {
            return Err(LocatorError::LimitExceeded {
                limit: "max_progress_entries",
                max: u64::from(self.config.max_progress_entries),
                actual: entries,
            });
        }

        let user_data_bytes = locator.user_data().len() as u64;
        if user_data_bytes > u64::from(self.config.max_user_data_bytes) {
            return Err(LocatorError::LimitExceeded {
                limit: "max_user_data_bytes",
                max: u64::from(self.config.max_user_data_bytes),
                actual: user_data_bytes,
            });
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
