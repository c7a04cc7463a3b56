//! Strongly-typed identifiers and the hash-range partition model.
//!
//! Following `TigerStyle`: explicit types prevent bugs from mixing up IDs.
//! All IDs are 64-bit.

use std::fmt;

use crate::limits::HASH_ID_MAX;

/// Macro to generate strongly-typed ID wrappers.
///
/// Each ID type wraps a u64 and provides:
/// - Type safety (can't mix `SourceId` with `CheckpointId`)
/// - Debug/Display formatting
/// - Zero-cost abstraction (same as raw u64)
macro_rules! define_id {
    ($name:ident, $prefix:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new ID from a raw u64 value.
            #[inline]
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw u64 value.
            #[inline]
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $prefix, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.get()
            }
        }
    };
}

// Source epochs. A new value means an unrelated timeline.
define_id!(SourceId, "src", "Identifier of a data source instance (generation / epoch).");

// Persisted checkpoints.
define_id!(CheckpointId, "ckpt", "Identifier of a persisted checkpoint slot.");

// -----------------------------------------------------------------------------
// Hash Range
// -----------------------------------------------------------------------------

/// An inclusive slice `[from, to]` of the hash universe `[0, 65535]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashRange {
    from: u32,
    to: u32,
}

impl HashRange {
    /// The whole hash universe.
    pub const FULL: Self = Self {
        from: 0,
        to: HASH_ID_MAX,
    };

    /// Creates a hash range.
    ///
    /// # Errors
    /// Returns `InvalidRange` if `from > to` or `to` is outside the universe.
    pub const fn new(from: u32, to: u32) -> crate::Result<Self> {
        if from > to || to > HASH_ID_MAX {
            return Err(crate::Error::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// First hash id in the range.
    #[inline]
    #[must_use]
    pub const fn from(self) -> u32 {
        self.from
    }

    /// Last hash id in the range (inclusive).
    #[inline]
    #[must_use]
    pub const fn to(self) -> u32 {
        self.to
    }

    /// Number of hash ids covered.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.to - self.from + 1
    }

    /// Always false; a range covers at least one hash id.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    /// Returns true if `hash_id` lies inside the range.
    #[must_use]
    pub const fn contains(self, hash_id: u32) -> bool {
        self.from <= hash_id && hash_id <= self.to
    }

    /// Returns true if `other` lies entirely inside this range.
    #[must_use]
    pub const fn covers(self, other: Self) -> bool {
        self.from <= other.from && other.to <= self.to
    }

    /// Returns the overlapping part of two ranges, if any.
    #[must_use]
    pub fn intersect(self, other: Self) -> Option<Self> {
        let from = self.from.max(other.from);
        let to = self.to.min(other.to);
        (from <= to).then_some(Self { from, to })
    }
}

impl Default for HashRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for HashRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}
