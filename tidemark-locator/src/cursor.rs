//! Cursor over a sorted progress sequence.
//!
//! Used by the interval-merge walk in `Locator::update`. The current entry can
//! be narrowed (its `from` advanced) without touching the underlying slice,
//! which represents "the remainder of this entry after a prefix was consumed".

use tidemark_core::OFFSET_UNSET;

use crate::progress::Progress;

/// Index cursor with an optional override for the current entry's start.
#[derive(Debug, Clone)]
pub(crate) struct ProgressCursor<'a> {
    progress: &'a [Progress],
    index: usize,
    from: Option<u32>,
}

impl<'a> ProgressCursor<'a> {
    pub(crate) const fn new(progress: &'a [Progress]) -> Self {
        Self {
            progress,
            index: 0,
            from: None,
        }
    }

    /// Returns the entry at the cursor, with `from` narrowed if overridden.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is past the end.
    pub(crate) fn current_progress(&self) -> Progress {
        assert!(!self.is_eof(), "cursor past end ({})", self.progress.len());
        let mut current = self.progress[self.index];
        if let Some(from) = self.from {
            current.from = from;
        }
        current
    }

    /// Offset of the entry at the cursor, or `-1` past the end.
    pub(crate) fn current_offset(&self) -> i64 {
        self.progress
            .get(self.index)
            .map_or(OFFSET_UNSET, |progress| progress.offset)
    }

    pub(crate) fn move_to_next(&mut self) {
        self.index += 1;
        self.from = None;
    }

    pub(crate) const fn is_eof(&self) -> bool {
        self.index >= self.progress.len()
    }

    /// Narrows the current entry to start at `from`.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is past the end or `from` is beyond the entry's end.
    pub(crate) fn set_from(&mut self, from: u32) {
        let current = self.current_progress();
        assert!(
            current.from <= from && from <= current.to,
            "narrowed from ({from}) outside [{}, {}]",
            current.from,
            current.to
        );
        self.from = Some(from);
    }
}
