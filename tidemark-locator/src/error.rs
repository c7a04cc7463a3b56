//! Locator error types.

use thiserror::Error;
use tidemark_core::HashRange;

/// Result type for locator operations.
pub type LocatorResult<T> = Result<T, LocatorError>;

/// Errors that can occur during locator operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// An incoming locator would move an overlapping range backward.
    ///
    /// The stale update should be logged and discarded by the caller.
    #[error("regression on [{from}, {to}]: offset {incoming} < recorded {current}")]
    Regression {
        /// Start of the first conflicting hash range.
        from: u32,
        /// End of the first conflicting hash range (inclusive).
        to: u32,
        /// Offset already recorded for the range.
        current: i64,
        /// Offset carried by the rejected update.
        incoming: i64,
    },

    /// The requested hash range is not covered by the locator.
    #[error("hash range {requested} not covered (locator covers {covered:?})")]
    RangeNotCovered {
        /// The range that was requested.
        requested: HashRange,
        /// The overall range the locator covers, if any.
        covered: Option<HashRange>,
    },

    /// Progress entries supplied by a producer violate the range invariants.
    #[error("invalid progress: {reason}")]
    InvalidProgress {
        /// Why the progress was rejected.
        reason: &'static str,
    },

    /// Serialized locator is too short to contain the fixed header.
    #[error("truncated locator: {len} bytes, need at least {needed}")]
    Truncated {
        /// Bytes available.
        len: u64,
        /// Bytes required.
        needed: u64,
    },

    /// A configured limit was exceeded.
    #[error("limit exceeded: {limit} (max={max}, actual={actual})")]
    LimitExceeded {
        /// Which limit was exceeded.
        limit: &'static str,
        /// Maximum allowed value.
        max: u64,
        /// Actual value.
        actual: u64,
    },

    /// I/O error during storage operation.
    #[error("I/O error: {operation}: {message}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// Error message.
        message: String,
    },
}
