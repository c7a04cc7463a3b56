//! Tidemark Core - Strongly-typed identifiers and limits for Tidemark.
//!
//! This crate provides the vocabulary shared by the locator engine and its
//! callers: source and checkpoint identifiers, the hash-range partition model
//! and system-wide limits. It performs no I/O.
//!
//! # Design Principles (TigerStyle)
//!
//! - **Strongly-typed IDs**: Prevent mixing up a `SourceId` with a `CheckpointId`
//! - **Explicit limits**: Every resource has a bounded maximum
//! - **Explicit types**: Use u32/u64/i64, not usize
//! - **No unsafe code**: Safety > Performance

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod limits;
mod types;

pub use error::{Error, Result};
pub use limits::{Limits, HASH_ID_MAX, OFFSET_UNSET};
pub use types::{CheckpointId, HashRange, SourceId};
