//! Per-range progress entries.

use std::fmt;

use tidemark_core::{HashRange, HASH_ID_MAX};

/// Offset reached by a consumer for the hash range `[from, to]`.
///
/// A plain value: equality is structural on `(from, to, offset)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Progress {
    /// First hash id of the range.
    pub from: u32,
    /// Last hash id of the range (inclusive).
    pub to: u32,
    /// Consumption position for this range. `-1` means unset.
    pub offset: i64,
}

impl Progress {
    /// Creates a progress entry.
    ///
    /// # Panics
    ///
    /// Panics if `from > to`.
    #[must_use]
    pub fn new(from: u32, to: u32, offset: i64) -> Self {
        // TigerStyle: Assert preconditions.
        assert!(from <= to, "from ({from}) must be <= to ({to})");
        Self { from, to, offset }
    }

    /// Creates a progress entry covering `range`.
    #[must_use]
    pub const fn for_range(range: HashRange, offset: i64) -> Self {
        Self {
            from: range.from(),
            to: range.to(),
            offset,
        }
    }

    /// Creates a progress entry covering the whole hash universe.
    #[must_use]
    pub const fn full_range(offset: i64) -> Self {
        Self {
            from: 0,
            to: HASH_ID_MAX,
            offset,
        }
    }

    /// Returns true if `hash_id` lies in this entry's range.
    #[must_use]
    pub const fn contains(&self, hash_id: u32) -> bool {
        self.from <= hash_id && hash_id <= self.to
    }

    /// Returns true if the offset is set.
    #[must_use]
    pub const fn has_offset(&self) -> bool {
        self.offset >= 0
    }

    /// Returns true if `from <= to` and both lie in the hash universe.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        self.from <= self.to && self.to <= HASH_ID_MAX
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{},{}}}", self.from, self.to, self.offset)
    }
}
