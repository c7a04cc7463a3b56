//! Locator: per-source checkpoint of consumption progress across hash ranges.
//!
//! A locator owns an ordered, non-overlapping sequence of [`Progress`] entries
//! over the hash universe `[0, 65535]`. Holes are allowed and mean "state
//! unknown for that sub-range". After every mutation the sequence is
//! normalized: contiguous neighbours with the same offset are coalesced and
//! the cached minimum offset is recomputed.

use std::cmp::Ordering;
use std::fmt;

use bytes::Bytes;
use tidemark_core::{HashRange, SourceId, OFFSET_UNSET};
use tracing::debug;

use crate::cursor::ProgressCursor;
use crate::error::{LocatorError, LocatorResult};
use crate::progress::Progress;

// -----------------------------------------------------------------------------
// Freshness
// -----------------------------------------------------------------------------

/// Outcome of comparing two locators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Freshness {
    /// The locators belong to unrelated source epochs.
    Invalid,
    /// This locator dominates the other across its whole covered range.
    FullyFaster,
    /// Neither locator dominates the other.
    PartialFaster,
    /// The other locator dominates this one.
    Slower,
}

// -----------------------------------------------------------------------------
// Locator
// -----------------------------------------------------------------------------

/// Complete checkpoint state for one source epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub(crate) src: SourceId,
    pub(crate) progress: Vec<Progress>,
    pub(crate) min_offset: i64,
    pub(crate) user_data: Bytes,
    pub(crate) is_legacy: bool,
}

impl Locator {
    /// Creates an empty locator for `src`.
    #[must_use]
    pub const fn new(src: SourceId) -> Self {
        Self {
            src,
            progress: Vec::new(),
            min_offset: OFFSET_UNSET,
            user_data: Bytes::new(),
            is_legacy: false,
        }
    }

    /// Creates a legacy locator: one scalar offset over the full hash range.
    #[must_use]
    pub fn legacy(src: SourceId, offset: i64) -> Self {
        let mut locator = Self::new(src);
        locator.set_offset(offset);
        locator.is_legacy = true;
        locator
    }

    /// Source epoch of this locator.
    #[must_use]
    pub const fn src(&self) -> SourceId {
        self.src
    }

    /// Progress entries, sorted by `from`.
    #[must_use]
    pub fn progress(&self) -> &[Progress] {
        &self.progress
    }

    /// Minimum non-negative offset across all entries, `-1` if none.
    #[must_use]
    pub const fn min_offset(&self) -> i64 {
        self.min_offset
    }

    /// Opaque caller data.
    #[must_use]
    pub const fn user_data(&self) -> &Bytes {
        &self.user_data
    }

    /// Returns true if this locator came from a pre-range-aware format.
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        self.is_legacy
    }

    /// Replaces the opaque caller data.
    pub fn set_user_data(&mut self, user_data: impl Into<Bytes>) {
        self.user_data = user_data.into();
    }

    /// Replaces the progress entries reported by a producer.
    ///
    /// Entries are sorted and coalesced; the minimum offset is recomputed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProgress` if any range is inverted, lies outside the
    /// hash universe, or overlaps another entry. The locator is unchanged.
    pub fn set_progress(&mut self, mut progress: Vec<Progress>) -> LocatorResult<()> {
        if !progress.iter().all(Progress::is_well_formed) {
            return Err(LocatorError::InvalidProgress {
                reason: "range inverted or outside hash universe",
            });
        }

        progress.sort_by_key(|entry| entry.from);
        if progress.windows(2).any(|pair| pair[0].to >= pair[1].from) {
            return Err(LocatorError::InvalidProgress {
                reason: "overlapping ranges",
            });
        }

        merge_progress(&mut progress);
        self.min_offset = min_offset_of(&progress);
        self.progress = progress;
        Ok(())
    }

    /// Sets a single offset for the whole hash universe.
    pub fn set_offset(&mut self, offset: i64) {
        self.progress = vec![Progress::full_range(offset)];
        self.min_offset = min_offset_of(&self.progress);
    }

    /// Drops all progress and user data, keeping the source epoch.
    pub fn reset(&mut self) {
        self.progress.clear();
        self.min_offset = OFFSET_UNSET;
        self.user_data = Bytes::new();
        self.is_legacy = false;
    }

    /// Returns true if the two locators can be compared.
    ///
    /// Different sources are only comparable when `ignore_legacy_diff_src`
    /// is set and at least one side is a legacy locator.
    #[must_use]
    pub const fn is_same_source(&self, other: &Self, ignore_legacy_diff_src: bool) -> bool {
        self.src.get() == other.src.get()
            || (ignore_legacy_diff_src && (self.is_legacy || other.is_legacy))
    }

    /// Returns true if any offset has been recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min_offset >= 0 || self.progress.iter().any(Progress::has_offset)
    }

    /// Overall hash coverage: smallest `from` to largest `to`.
    ///
    /// Returns `None` for an empty locator.
    #[must_use]
    pub fn locator_range(&self) -> Option<HashRange> {
        let from = self.progress.iter().map(|entry| entry.from).min()?;
        let to = self.progress.iter().map(|entry| entry.to).max()?;
        HashRange::new(from, to).ok()
    }

    /// Offset recorded for the range containing `hash_id`, if any.
    #[must_use]
    pub fn offset_for_hash(&self, hash_id: u32) -> Option<i64> {
        let index = self.progress.partition_point(|entry| entry.to < hash_id);
        self.progress
            .get(index)
            .filter(|entry| entry.contains(hash_id))
            .map(|entry| entry.offset)
    }

    // -------------------------------------------------------------------------
    // Merge
    // -------------------------------------------------------------------------

    /// Merges `other` into this locator.
    ///
    /// A different source epoch replaces this locator wholesale. Otherwise the
    /// ranges are merged interval by interval; `other` wins wherever it
    /// overlaps, and its user data is adopted.
    ///
    /// # Errors
    ///
    /// Returns `Regression` if `other` would move an overlapping range to a
    /// smaller offset. The locator is left unchanged in that case.
    pub fn update(&mut self, other: &Self) -> LocatorResult<()> {
        if other.src != self.src {
            debug!(from_src = %self.src, to_src = %other.src, "Locator source changed");
            *self = other.clone();
            return Ok(());
        }

        if let ([current], [incoming]) = (self.progress.as_slice(), other.progress.as_slice()) {
            if current.from == incoming.from && current.to == incoming.to {
                if incoming.offset < current.offset {
                    debug!(
                        src = %self.src,
                        current = current.offset,
                        incoming = incoming.offset,
                        "Rejected stale locator update"
                    );
                    return Err(LocatorError::Regression {
                        from: current.from,
                        to: current.to,
                        current: current.offset,
                        incoming: incoming.offset,
                    });
                }
                let offset = incoming.offset;
                self.progress[0].offset = offset;
                self.min_offset = min_offset_of(&self.progress);
                self.user_data = other.user_data.clone();
                return Ok(());
            }
        }

        let mut merged = Vec::with_capacity(self.progress.len() + other.progress.len());
        {
            let mut current = ProgressCursor::new(&self.progress);
            let mut incoming = ProgressCursor::new(&other.progress);

            while !current.is_eof() && !incoming.is_eof() {
                match left_progress(&mut current, &mut incoming) {
                    Ok(progress) => merged.push(progress),
                    Err(err) => {
                        debug!(src = %self.src, %err, "Rejected stale locator update");
                        return Err(err);
                    }
                }
            }

            drain_into(&mut current, &mut merged);
            drain_into(&mut incoming, &mut merged);
        }

        merge_progress(&mut merged);
        self.min_offset = min_offset_of(&merged);
        self.user_data = other.user_data.clone();
        self.progress = merged;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Comparison
    // -------------------------------------------------------------------------

    /// Returns true if, for every range `other` has progress on, this locator
    /// covers it with an offset at least as large.
    ///
    /// Ranges where `other` is at offset `<= 0` are trivially satisfied.
    #[must_use]
    pub fn is_fully_faster_than(&self, other: &Self) -> bool {
        other
            .progress
            .iter()
            .filter(|theirs| theirs.offset > 0)
            .all(|theirs| self.covers_at_least(theirs))
    }

    /// Walks this locator's entries over `target`'s range, requiring full
    /// coverage at `>= target.offset`.
    fn covers_at_least(&self, target: &Progress) -> bool {
        let mut from = target.from;
        for ours in &self.progress {
            if ours.to < from {
                continue;
            }
            if ours.from > from || ours.offset < target.offset {
                return false;
            }
            if ours.to >= target.to {
                return true;
            }
            from = ours.to + 1;
        }
        false
    }

    /// Classifies this locator's freshness relative to `other`.
    #[must_use]
    pub fn is_faster_than(&self, other: &Self, ignore_legacy_diff_src: bool) -> Freshness {
        if !self.is_same_source(other, ignore_legacy_diff_src) {
            return Freshness::Invalid;
        }

        if ignore_legacy_diff_src && (self.is_legacy || other.is_legacy) {
            return self.legacy_freshness(other);
        }

        if !other.is_valid() {
            return Freshness::FullyFaster;
        }
        if !self.is_valid() {
            return Freshness::Slower;
        }

        if self.is_fully_faster_than(other) {
            Freshness::FullyFaster
        } else if other.is_fully_faster_than(self) {
            Freshness::Slower
        } else {
            Freshness::PartialFaster
        }
    }

    /// Scalar comparison used when one side only knows a single offset.
    fn legacy_freshness(&self, other: &Self) -> Freshness {
        if self.is_legacy {
            let ours = self.min_offset;
            let Some((lowest, highest)) = other.offset_bounds() else {
                return Freshness::FullyFaster;
            };
            if ours >= highest {
                Freshness::FullyFaster
            } else if ours < lowest {
                Freshness::Slower
            } else {
                Freshness::PartialFaster
            }
        } else {
            let theirs = other.min_offset;
            let Some((lowest, highest)) = self.offset_bounds() else {
                return Freshness::Slower;
            };
            if lowest >= theirs {
                Freshness::FullyFaster
            } else if highest < theirs {
                Freshness::Slower
            } else {
                Freshness::PartialFaster
            }
        }
    }

    /// Smallest and largest recorded offset, ignoring unset entries.
    fn offset_bounds(&self) -> Option<(i64, i64)> {
        let mut recorded = self
            .progress
            .iter()
            .filter(|entry| entry.has_offset())
            .map(|entry| entry.offset);
        let first = recorded.next()?;
        Some(recorded.fold((first, first), |(lowest, highest), offset| {
            (lowest.min(offset), highest.max(offset))
        }))
    }

    /// Single-point check: is the range containing `hash_id` past `timestamp`?
    ///
    /// A hash id with no recorded range is conservatively `Slower`.
    #[must_use]
    pub fn is_faster_than_hash(&self, hash_id: u32, timestamp: i64) -> Freshness {
        match self.offset_for_hash(hash_id) {
            Some(offset) if offset > timestamp => Freshness::FullyFaster,
            _ => Freshness::Slower,
        }
    }

    // -------------------------------------------------------------------------
    // Partitioning
    // -------------------------------------------------------------------------

    /// Restricts progress to its intersection with `range`.
    ///
    /// Only the outer bounds are checked; holes inside `range` are kept as holes.
    ///
    /// # Errors
    ///
    /// Returns `RangeNotCovered` if the locator's overall range does not
    /// contain `range`. The locator is unchanged in that case.
    pub fn shrink_to_range(&mut self, range: HashRange) -> LocatorResult<()> {
        let covered = match (self.progress.first(), self.progress.last()) {
            (Some(first), Some(last)) => first.from <= range.from() && range.to() <= last.to,
            _ => false,
        };
        if !covered {
            return Err(LocatorError::RangeNotCovered {
                requested: range,
                covered: self.locator_range(),
            });
        }

        self.progress = self
            .progress
            .iter()
            .filter_map(|entry| {
                let entry_range = HashRange::new(entry.from, entry.to).ok()?;
                range
                    .intersect(entry_range)
                    .map(|overlap| Progress::for_range(overlap, entry.offset))
            })
            .collect();
        self.min_offset = min_offset_of(&self.progress);
        Ok(())
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::new(SourceId::default())
    }
}

/// Human-readable dump for logs: `src:min_offset[:user_data]:[{from,to,offset}...]`.
impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:", self.src.get(), self.min_offset)?;
        if !self.user_data.is_empty() {
            write!(f, "{}:", String::from_utf8_lossy(&self.user_data))?;
        }
        f.write_str("[")?;
        for entry in &self.progress {
            write!(f, "{entry}")?;
        }
        f.write_str("]")
    }
}

// -----------------------------------------------------------------------------
// Interval merge helpers
// -----------------------------------------------------------------------------

/// Resolves the leftmost still-unresolved sub-range of two cursors.
///
/// Emits exactly one non-overlapping entry and advances or narrows the
/// cursors. Fails when both start at the same hash and `update` carries a set
/// offset smaller than `current`'s.
fn left_progress(
    current: &mut ProgressCursor<'_>,
    update: &mut ProgressCursor<'_>,
) -> LocatorResult<Progress> {
    let current_progress = current.current_progress();
    let update_progress = update.current_progress();

    match current_progress.from.cmp(&update_progress.from) {
        Ordering::Less => Ok(take_prefix(current, current_progress, update_progress.from)),
        Ordering::Greater => Ok(take_prefix(update, update_progress, current_progress.from)),
        Ordering::Equal => {
            let update_offset = update.current_offset();
            let current_offset = current.current_offset();
            if update_offset != OFFSET_UNSET && update_offset < current_offset {
                return Err(LocatorError::Regression {
                    from: current_progress.from,
                    to: current_progress.to.min(update_progress.to),
                    current: current_offset,
                    incoming: update_offset,
                });
            }

            match update_progress.to.cmp(&current_progress.to) {
                Ordering::Less => {
                    update.move_to_next();
                    current.set_from(update_progress.to + 1);
                    Ok(update_progress)
                }
                Ordering::Greater => {
                    current.move_to_next();
                    update.set_from(current_progress.to + 1);
                    Ok(Progress {
                        offset: update_offset,
                        ..current_progress
                    })
                }
                Ordering::Equal => {
                    current.move_to_next();
                    update.move_to_next();
                    Ok(update_progress)
                }
            }
        }
    }
}

/// Emits the part of `leading` that lies before `next_from`.
fn take_prefix(cursor: &mut ProgressCursor<'_>, leading: Progress, next_from: u32) -> Progress {
    if leading.to < next_from {
        cursor.move_to_next();
        leading
    } else {
        cursor.set_from(next_from);
        Progress {
            to: next_from - 1,
            ..leading
        }
    }
}

fn drain_into(cursor: &mut ProgressCursor<'_>, merged: &mut Vec<Progress>) {
    while !cursor.is_eof() {
        merged.push(cursor.current_progress());
        cursor.move_to_next();
    }
}

/// Coalesces contiguous neighbours that share an offset.
pub(crate) fn merge_progress(progress: &mut Vec<Progress>) {
    progress.dedup_by(|next, last| {
        let contiguous = last.to.checked_add(1) == Some(next.from);
        if contiguous && last.offset == next.offset {
            last.to = next.to;
            true
        } else {
            false
        }
    });
}

/// Minimum non-negative offset, or `-1` if none.
fn min_offset_of(progress: &[Progress]) -> i64 {
    progress
        .iter()
        .map(|entry| entry.offset)
        .filter(|offset| *offset >= 0)
        .min()
        .unwrap_or(OFFSET_UNSET)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn locator(src: u64, progress: &[(u32, u32, i64)]) -> Locator {
        let mut locator = Locator::new(SourceId::new(src));
        locator
            .set_progress(
                progress
                    .iter()
                    .map(|&(from, to, offset)| Progress::new(from, to, offset))
                    .collect(),
            )
            .unwrap();
        locator
    }

    fn ranges(locator: &Locator) -> Vec<(u32, u32, i64)> {
        locator
            .progress()
            .iter()
            .map(|entry| (entry.from, entry.to, entry.offset))
            .collect()
    }

    #[test]
    fn test_new_locator_is_empty() {
        let locator = Locator::new(SourceId::new(1));
        assert!(locator.progress().is_empty());
        assert_eq!(locator.min_offset(), OFFSET_UNSET);
        assert!(!locator.is_valid());
        assert_eq!(locator.locator_range(), None);
    }

    #[test]
    fn test_set_progress_sorts_and_coalesces() {
        let locator = locator(1, &[(101, 200, 5), (0, 100, 5), (300, 400, 9)]);
        assert_eq!(ranges(&locator), vec![(0, 200, 5), (300, 400, 9)]);
        assert_eq!(locator.min_offset(), 5);
    }

    #[test]
    fn test_set_progress_rejects_overlap() {
        let mut locator = locator(1, &[(0, 10, 1)]);
        let err = locator
            .set_progress(vec![Progress::new(0, 100, 1), Progress::new(50, 150, 2)])
            .unwrap_err();
        assert!(matches!(err, LocatorError::InvalidProgress { .. }));
        // Unchanged.
        assert_eq!(ranges(&locator), vec![(0, 10, 1)]);
    }

    #[test]
    fn test_set_progress_rejects_outside_universe() {
        let mut locator = Locator::new(SourceId::new(1));
        let err = locator
            .set_progress(vec![Progress::new(0, 70_000, 1)])
            .unwrap_err();
        assert!(matches!(err, LocatorError::InvalidProgress { .. }));
    }

    #[test]
    fn test_min_offset_ignores_unset() {
        let locator = locator(1, &[(0, 10, -1), (11, 20, 7), (21, 30, 3)]);
        assert_eq!(locator.min_offset(), 3);

        let unset = locator_with_unset();
        assert_eq!(unset.min_offset(), OFFSET_UNSET);
        assert!(!unset.is_valid());
    }

    fn locator_with_unset() -> Locator {
        locator(1, &[(0, 65_535, -1)])
    }

    // -------------------------------------------------------------------------
    // update
    // -------------------------------------------------------------------------

    #[test]
    fn test_update_rejects_regression_on_same_range() {
        let mut current = locator(1, &[(0, 65_535, 100)]);
        let stale = locator(1, &[(0, 65_535, 50)]);

        let err = current.update(&stale).unwrap_err();
        assert_eq!(
            err,
            LocatorError::Regression {
                from: 0,
                to: 65_535,
                current: 100,
                incoming: 50,
            }
        );
        assert_eq!(ranges(&current), vec![(0, 65_535, 100)]);
        assert_eq!(current.min_offset(), 100);
    }

    #[test]
    fn test_update_same_range_advances_and_adopts_user_data() {
        let mut current = locator(1, &[(0, 65_535, 100)]);
        current.set_user_data("old");
        let mut newer = locator(1, &[(0, 65_535, 150)]);
        newer.set_user_data("new");

        current.update(&newer).unwrap();
        assert_eq!(ranges(&current), vec![(0, 65_535, 150)]);
        assert_eq!(current.min_offset(), 150);
        assert_eq!(current.user_data().as_ref(), b"new");

        // Equal offset is not a regression.
        current.update(&newer).unwrap();
        assert_eq!(current.min_offset(), 150);
    }

    #[test]
    fn test_update_splits_partial_overlap() {
        let mut current = locator(1, &[(0, 100, 10), (101, 200, 20)]);
        let incoming = locator(1, &[(50, 150, 30)]);

        current.update(&incoming).unwrap();
        assert_eq!(
            ranges(&current),
            vec![(0, 49, 10), (50, 150, 30), (151, 200, 20)]
        );
        assert_eq!(current.min_offset(), 10);
    }

    #[test]
    fn test_update_fills_holes() {
        let mut current = locator(1, &[(0, 99, 5)]);
        let incoming = locator(1, &[(200, 299, 7)]);

        current.update(&incoming).unwrap();
        assert_eq!(ranges(&current), vec![(0, 99, 5), (200, 299, 7)]);
        assert_eq!(current.min_offset(), 5);

        // Incoming entirely to the left.
        let mut current = locator(1, &[(200, 299, 7)]);
        current.update(&locator(1, &[(0, 99, 5)])).unwrap();
        assert_eq!(ranges(&current), vec![(0, 99, 5), (200, 299, 7)]);
    }

    #[test]
    fn test_update_shorter_incoming_at_same_start() {
        let mut current = locator(1, &[(0, 100, 10)]);
        current.update(&locator(1, &[(0, 40, 20)])).unwrap();
        assert_eq!(ranges(&current), vec![(0, 40, 20), (41, 100, 10)]);
    }

    #[test]
    fn test_update_longer_incoming_at_same_start() {
        let mut current = locator(1, &[(0, 40, 10), (41, 100, 15)]);
        current.update(&locator(1, &[(0, 100, 20)])).unwrap();
        assert_eq!(ranges(&current), vec![(0, 100, 20)]);
        assert_eq!(current.min_offset(), 20);
    }

    #[test]
    fn test_update_shorter_unset_incoming_is_not_a_regression() {
        let mut current = locator(1, &[(0, 100, 50)]);
        current.update(&locator(1, &[(0, 40, -1)])).unwrap();
        assert_eq!(ranges(&current), vec![(0, 40, -1), (41, 100, 50)]);
        assert_eq!(current.min_offset(), 50);
    }

    #[test]
    fn test_update_longer_unset_incoming_resets_overlap() {
        let mut current = locator(1, &[(0, 40, 50)]);
        current.update(&locator(1, &[(0, 100, -1)])).unwrap();
        assert_eq!(ranges(&current), vec![(0, 100, -1)]);
        assert_eq!(current.min_offset(), OFFSET_UNSET);
        assert!(!current.is_valid());
    }

    #[test]
    fn test_update_same_range_rejects_unset_incoming() {
        let mut current = locator(1, &[(0, 65_535, 5)]);
        let before = current.clone();

        let err = current.update(&locator_with_unset()).unwrap_err();
        assert_eq!(
            err,
            LocatorError::Regression {
                from: 0,
                to: 65_535,
                current: 5,
                incoming: OFFSET_UNSET,
            }
        );
        assert_eq!(current, before);
    }

    #[test]
    fn test_update_failure_is_atomic() {
        let mut current = locator(1, &[(50, 150, 30)]);
        current.set_user_data("keep");
        let before = current.clone();
        let stale = locator(1, &[(0, 100, 10), (101, 200, 20)]);

        let err = current.update(&stale).unwrap_err();
        assert_eq!(
            err,
            LocatorError::Regression {
                from: 50,
                to: 100,
                current: 30,
                incoming: 10,
            }
        );
        assert_eq!(current, before);
    }

    #[test]
    fn test_update_with_new_source_replaces() {
        let mut current = locator(1, &[(0, 100, 50)]);
        let mut other = locator(2, &[(0, 10, 1)]);
        other.set_user_data("epoch-2");

        current.update(&other).unwrap();
        assert_eq!(current, other);
    }

    #[test]
    fn test_update_with_self_is_idempotent() {
        let mut current = locator(1, &[(0, 49, 10), (50, 150, 30), (151, 200, 20)]);
        let copy = current.clone();

        current.update(&copy).unwrap();
        assert_eq!(current, copy);
    }

    #[test]
    fn test_update_into_empty_adopts_other() {
        let mut current = Locator::new(SourceId::new(1));
        let other = locator(1, &[(0, 10, 3), (20, 30, 4)]);

        current.update(&other).unwrap();
        assert_eq!(ranges(&current), ranges(&other));
        assert_eq!(current.min_offset(), 3);
    }

    #[test]
    fn test_merge_progress_only_joins_contiguous_equal_offsets() {
        let mut progress = vec![
            Progress::new(0, 9, 1),
            Progress::new(10, 19, 1),
            Progress::new(21, 30, 1),
            Progress::new(31, 40, 2),
        ];
        merge_progress(&mut progress);
        assert_eq!(
            progress,
            vec![
                Progress::new(0, 19, 1),
                Progress::new(21, 30, 1),
                Progress::new(31, 40, 2),
            ]
        );
    }

    // -------------------------------------------------------------------------
    // comparison
    // -------------------------------------------------------------------------

    #[test]
    fn test_is_faster_than_different_source_is_invalid() {
        let a = locator(1, &[(0, 65_535, 100)]);
        let b = locator(2, &[(0, 65_535, 10)]);
        assert_eq!(a.is_faster_than(&b, false), Freshness::Invalid);
        assert_eq!(a.is_faster_than(&b, true), Freshness::Invalid);
    }

    #[test]
    fn test_is_faster_than_fully_and_slower() {
        let a = locator(1, &[(0, 65_535, 100)]);
        let b = locator(1, &[(0, 32_767, 50), (32_768, 65_535, 100)]);

        assert!(a.is_fully_faster_than(&b));
        assert!(!b.is_fully_faster_than(&a));
        assert_eq!(a.is_faster_than(&b, false), Freshness::FullyFaster);
        assert_eq!(b.is_faster_than(&a, false), Freshness::Slower);
    }

    #[test]
    fn test_is_faster_than_partial() {
        let a = locator(1, &[(0, 100, 10), (101, 200, 30)]);
        let b = locator(1, &[(0, 200, 20)]);
        assert_eq!(a.is_faster_than(&b, false), Freshness::PartialFaster);
        assert_eq!(b.is_faster_than(&a, false), Freshness::PartialFaster);
    }

    #[test]
    fn test_hole_is_not_covered() {
        let a = locator(1, &[(0, 100, 50)]);
        let b = locator(1, &[(0, 200, 10)]);
        assert!(!a.is_fully_faster_than(&b));
        assert_eq!(a.is_faster_than(&b, false), Freshness::PartialFaster);
    }

    #[test]
    fn test_non_positive_offsets_are_trivially_covered() {
        let a = locator(1, &[(0, 10, 5)]);
        let b = locator(1, &[(0, 65_535, 0)]);
        assert!(a.is_fully_faster_than(&b));
    }

    #[test]
    fn test_invalid_sides() {
        let valid = locator(1, &[(0, 65_535, 5)]);
        let invalid = locator_with_unset();
        assert_eq!(valid.is_faster_than(&invalid, false), Freshness::FullyFaster);
        assert_eq!(invalid.is_faster_than(&valid, false), Freshness::Slower);
    }

    #[test]
    fn test_legacy_self_scalar_comparison() {
        let other = locator(2, &[(0, 100, 50), (101, 200, 150)]);

        let legacy = Locator::legacy(SourceId::new(1), 100);
        assert_eq!(legacy.is_faster_than(&other, true), Freshness::PartialFaster);
        assert_eq!(legacy.is_faster_than(&other, false), Freshness::Invalid);

        let ahead = Locator::legacy(SourceId::new(1), 150);
        assert_eq!(ahead.is_faster_than(&other, true), Freshness::FullyFaster);

        let behind = Locator::legacy(SourceId::new(1), 10);
        assert_eq!(behind.is_faster_than(&other, true), Freshness::Slower);
    }

    #[test]
    fn test_legacy_comparison_ignores_unset_entries() {
        let other = locator(2, &[(0, 100, -1), (101, 200, 50)]);

        let behind = Locator::legacy(SourceId::new(1), 10);
        assert_eq!(behind.is_faster_than(&other, true), Freshness::Slower);

        let ahead = Locator::legacy(SourceId::new(1), 50);
        assert_eq!(ahead.is_faster_than(&other, true), Freshness::FullyFaster);

        // Only unset entries: nothing recorded to compare against.
        let legacy = Locator::legacy(SourceId::new(1), 10);
        assert_eq!(
            legacy.is_faster_than(&locator_with_unset(), true),
            Freshness::FullyFaster
        );
        assert_eq!(
            locator_with_unset().is_faster_than(&legacy, true),
            Freshness::Slower
        );
    }

    #[test]
    fn test_legacy_other_scalar_comparison() {
        let ours = locator(1, &[(0, 100, 50), (101, 65_535, 150)]);

        let behind = Locator::legacy(SourceId::new(9), 40);
        assert_eq!(ours.is_faster_than(&behind, true), Freshness::FullyFaster);

        let ahead = Locator::legacy(SourceId::new(9), 200);
        assert_eq!(ours.is_faster_than(&ahead, true), Freshness::Slower);

        let between = Locator::legacy(SourceId::new(9), 100);
        assert_eq!(ours.is_faster_than(&between, true), Freshness::PartialFaster);
    }

    #[test]
    fn test_is_faster_than_hash() {
        let locator = locator(1, &[(0, 100, 10), (101, 200, 30)]);
        assert_eq!(locator.is_faster_than_hash(150, 20), Freshness::FullyFaster);
        assert_eq!(locator.is_faster_than_hash(150, 30), Freshness::Slower);
        assert_eq!(locator.is_faster_than_hash(0, 9), Freshness::FullyFaster);
        assert_eq!(locator.is_faster_than_hash(300, 0), Freshness::Slower);
    }

    #[test]
    fn test_offset_for_hash() {
        let locator = locator(1, &[(0, 100, 10), (200, 300, 30)]);
        assert_eq!(locator.offset_for_hash(100), Some(10));
        assert_eq!(locator.offset_for_hash(150), None);
        assert_eq!(locator.offset_for_hash(200), Some(30));
        assert_eq!(locator.offset_for_hash(301), None);
    }

    // -------------------------------------------------------------------------
    // shrink_to_range
    // -------------------------------------------------------------------------

    #[test]
    fn test_shrink_to_covered_range() {
        let mut locator = locator(1, &[(0, 100, 5)]);
        locator
            .shrink_to_range(HashRange::new(10, 50).unwrap())
            .unwrap();
        assert_eq!(ranges(&locator), vec![(10, 50, 5)]);
    }

    #[test]
    fn test_shrink_to_uncovered_range_fails() {
        let mut locator = locator(1, &[(60, 100, 5)]);
        let err = locator
            .shrink_to_range(HashRange::new(10, 50).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            LocatorError::RangeNotCovered {
                requested: HashRange::new(10, 50).unwrap(),
                covered: Some(HashRange::new(60, 100).unwrap()),
            }
        );
        assert_eq!(ranges(&locator), vec![(60, 100, 5)]);
    }

    #[test]
    fn test_shrink_drops_entries_outside_and_recomputes_min() {
        let mut locator = locator(1, &[(0, 99, 1), (100, 199, 5), (200, 299, 9)]);
        locator
            .shrink_to_range(HashRange::new(150, 299).unwrap())
            .unwrap();
        assert_eq!(ranges(&locator), vec![(150, 199, 5), (200, 299, 9)]);
        assert_eq!(locator.min_offset(), 5);
    }

    #[test]
    fn test_shrink_empty_locator_fails() {
        let mut locator = Locator::new(SourceId::new(1));
        assert!(locator.shrink_to_range(HashRange::FULL).is_err());
    }

    // -------------------------------------------------------------------------
    // misc
    // -------------------------------------------------------------------------

    #[test]
    fn test_locator_range() {
        let locator = locator(1, &[(10, 20, 1), (30, 40, 2)]);
        assert_eq!(locator.locator_range(), Some(HashRange::new(10, 40).unwrap()));
    }

    #[test]
    fn test_display() {
        let mut locator = locator(1, &[(0, 49, 10), (50, 150, 30)]);
        assert_eq!(locator.to_string(), "1:10:[{0,49,10}{50,150,30}]");

        locator.set_user_data("meta");
        assert_eq!(locator.to_string(), "1:10:meta:[{0,49,10}{50,150,30}]");
    }

    #[test]
    fn test_reset_keeps_source() {
        let mut locator = Locator::legacy(SourceId::new(7), 42);
        locator.set_user_data("x");
        locator.reset();
        assert_eq!(locator, Locator::new(SourceId::new(7)));
    }

    #[test]
    fn test_is_same_source() {
        let a = locator(1, &[(0, 10, 1)]);
        let b = locator(2, &[(0, 10, 1)]);
        let legacy = Locator::legacy(SourceId::new(3), 1);

        assert!(a.is_same_source(&a.clone(), false));
        assert!(!a.is_same_source(&b, true));
        assert!(!a.is_same_source(&legacy, false));
        assert!(a.is_same_source(&legacy, true));
    }
}
