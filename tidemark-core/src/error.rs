//! Error types for Tidemark core operations.
//!
//! Following `TigerStyle`: all errors must be handled explicitly.
//! No silent failures, no ignored errors.

use std::fmt;

/// The result type for Tidemark core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building core values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An invalid argument was provided.
    InvalidArgument {
        /// The name of the argument.
        name: &'static str,
        /// Why it was invalid.
        reason: &'static str,
    },

    /// A hash range was malformed.
    InvalidRange {
        /// Requested start of the range.
        from: u32,
        /// Requested end of the range (inclusive).
        to: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { name, reason } => {
                write!(f, "invalid argument '{name}': {reason}")
            }
            Self::InvalidRange { from, to } => {
                write!(f, "invalid hash range [{from}, {to}]")
            }
        }
    }
}

impl std::error::Error for Error {}
