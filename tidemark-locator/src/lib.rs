//! Hash-range offset checkpoints for Tidemark.
//!
//! This crate tracks how far a consumer has read a partitioned source. The
//! source's key space is hashed into `[0, 65535]`; parallel workers each own
//! part of it and advance their own offsets. A [`Locator`] records, per
//! hash range, the offset reached, and merges snapshots from many workers
//! into one checkpoint.
//!
//! # Overview
//!
//! - **Merging**: [`Locator::update`] folds a newer snapshot into the
//!   current one. Overlapping ranges must not go backwards; a stale
//!   snapshot is rejected with [`LocatorError::Regression`] and leaves the
//!   locator unchanged.
//! - **Freshness**: [`Locator::is_faster_than`] compares two checkpoints
//!   and reports a [`Freshness`] verdict.
//! - **Resharding**: [`Locator::shrink_to_range`] restricts a checkpoint to
//!   one worker's hash range.
//! - **Persistence**: [`Locator::encode`] and [`Locator::decode`] use a
//!   little-endian binary layout. Two older layouts stay readable and
//!   decode as legacy locators.
//!
//! # Example
//!
//! ```ignore
//! use tidemark_core::{CheckpointId, SourceId};
//! use tidemark_locator::{CheckpointConfig, CheckpointManager, Locator, Progress};
//! use tidemark_locator::SimulatedLocatorStore;
//!
//! let manager = CheckpointManager::new(
//!     SimulatedLocatorStore::new(42),
//!     CheckpointConfig::for_testing(),
//! );
//!
//! // Worker A owns the lower half of the hash space.
//! let mut snapshot = Locator::new(SourceId::new(1));
//! snapshot.set_progress(vec![Progress::new(0, 32_767, 10)])?;
//! manager.commit(CheckpointId::new(7), &snapshot).await?;
//!
//! // Is the persisted checkpoint ahead of the target?
//! let caught_up = manager.is_caught_up(CheckpointId::new(7), &target).await?;
//! ```
//!
//! # Testing
//!
//! The [`SimulatedLocatorStore`] provides deterministic fault injection for
//! DST testing:
//!
//! ```ignore
//! use tidemark_locator::{SimulatedLocatorStore, LocatorStoreFaultConfig};
//!
//! let faults = LocatorStoreFaultConfig::none()
//!     .with_load_fail_rate(0.05)
//!     .with_store_fail_rate(0.05);
//! let store = SimulatedLocatorStore::with_faults(seed, faults);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Allow these for cleaner code in this crate.
#![allow(clippy::module_name_repetitions)]

mod codec;
mod config;
mod cursor;
mod error;
mod fs_store;
mod locator;
mod manager;
mod progress;
mod store;

// Re-export public API.
pub use codec::{LOCATOR_HEADER_SIZE, PROGRESS_ENTRY_SIZE};
pub use config::CheckpointConfig;
pub use error::{LocatorError, LocatorResult};
pub use fs_store::{FilesystemConfig, FilesystemLocatorStore};
pub use locator::{Freshness, Locator};
pub use manager::CheckpointManager;
pub use progress::Progress;
pub use store::{LocatorStore, LocatorStoreFaultConfig, SimulatedLocatorStore};
