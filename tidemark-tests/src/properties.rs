//! Property definitions and checkers for locator simulation tests.
//!
//! Properties are invariants that every normalized locator must satisfy
//! after any successful mutation, plus monotonicity of recorded offsets
//! across a sequence of commits.

use std::collections::BTreeMap;

use tidemark_core::{CheckpointId, HASH_ID_MAX};
use tidemark_locator::{Locator, SimulatedLocatorStore};

// ============================================================================
// Property Violation Types
// ============================================================================

/// A violation of a locator invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyViolation {
    /// An entry starts before the previous entry.
    Unsorted {
        /// Index of the offending entry.
        index: usize,
    },
    /// An entry overlaps the previous entry.
    Overlap {
        /// Index of the offending entry.
        index: usize,
        /// End of the previous entry.
        prev_to: u32,
        /// Start of the offending entry.
        from: u32,
    },
    /// Two contiguous entries share an offset but were not coalesced.
    Uncoalesced {
        /// Index of the second entry.
        index: usize,
        /// The shared offset.
        offset: i64,
    },
    /// An entry is inverted or lies outside the hash universe.
    Malformed {
        /// Index of the offending entry.
        index: usize,
        /// Start of the entry.
        from: u32,
        /// End of the entry.
        to: u32,
    },
    /// Cached minimum offset disagrees with the entries.
    MinOffsetMismatch {
        /// Minimum recomputed from the entries.
        expected: i64,
        /// Cached minimum.
        actual: i64,
    },
    /// A hash id's recorded offset went backwards within one source epoch.
    OffsetRegressed {
        /// The checkpoint that regressed.
        checkpoint_id: u64,
        /// The probed hash id.
        hash_id: u32,
        /// Previously recorded offset.
        old: i64,
        /// Newly recorded offset.
        new: i64,
    },
    /// Persisted bytes no longer decode.
    Undecodable {
        /// The checkpoint that failed to decode.
        checkpoint_id: u64,
    },
}

impl std::fmt::Display for PropertyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsorted { index } => write!(f, "Entry {index} starts before its predecessor"),
            Self::Overlap {
                index,
                prev_to,
                from,
            } => write!(
                f,
                "Entry {index} starts at {from}, overlapping predecessor ending at {prev_to}"
            ),
            Self::Uncoalesced { index, offset } => write!(
                f,
                "Entry {index} is contiguous with its predecessor at offset {offset}"
            ),
            Self::Malformed { index, from, to } => {
                write!(f, "Entry {index} has malformed range [{from}, {to}]")
            }
            Self::MinOffsetMismatch { expected, actual } => {
                write!(f, "Cached min offset {actual}, expected {expected}")
            }
            Self::OffsetRegressed {
                checkpoint_id,
                hash_id,
                old,
                new,
            } => write!(
                f,
                "Checkpoint {checkpoint_id} hash {hash_id} regressed from {old} to {new}"
            ),
            Self::Undecodable { checkpoint_id } => {
                write!(f, "Checkpoint {checkpoint_id} no longer decodes")
            }
        }
    }
}

// ============================================================================
// Structural Checks
// ============================================================================

/// Checks the structural invariants of a single locator.
///
/// Entries must be well-formed, sorted, non-overlapping and coalesced, and
/// the cached minimum must match the entries.
#[must_use]
pub fn check_locator(locator: &Locator) -> Vec<PropertyViolation> {
    let mut violations = Vec::new();
    let progress = locator.progress();

    for (index, entry) in progress.iter().enumerate() {
        if entry.from > entry.to || entry.to > HASH_ID_MAX {
            violations.push(PropertyViolation::Malformed {
                index,
                from: entry.from,
                to: entry.to,
            });
        }
        if index == 0 {
            continue;
        }
        let prev = progress[index - 1];
        if entry.from < prev.from {
            violations.push(PropertyViolation::Unsorted { index });
        } else if entry.from <= prev.to {
            violations.push(PropertyViolation::Overlap {
                index,
                prev_to: prev.to,
                from: entry.from,
            });
        } else if prev.to.checked_add(1) == Some(entry.from) && prev.offset == entry.offset {
            violations.push(PropertyViolation::Uncoalesced {
                index,
                offset: entry.offset,
            });
        }
    }

    let expected = progress
        .iter()
        .map(|entry| entry.offset)
        .filter(|offset| *offset >= 0)
        .min()
        .unwrap_or(-1);
    if expected != locator.min_offset() {
        violations.push(PropertyViolation::MinOffsetMismatch {
            expected,
            actual: locator.min_offset(),
        });
    }

    violations
}

// ============================================================================
// Property Checker
// ============================================================================

/// Stateful checker for persisted checkpoints.
///
/// Records the offset seen at every entry boundary so that later snapshots
/// can be checked for regressions within the same source epoch.
#[derive(Debug, Default)]
pub struct PropertyChecker {
    /// Last observed (source, offsets by probed hash) per checkpoint.
    observed: BTreeMap<u64, (u64, BTreeMap<u32, i64>)>,
    /// All violations found.
    violations: Vec<PropertyViolation>,
    /// Number of checkpoint snapshots checked.
    pub checks_performed: u64,
}

impl PropertyChecker {
    /// Creates a new checker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks every checkpoint persisted in `store`.
    pub fn check_store(&mut self, store: &SimulatedLocatorStore) {
        let mut checkpoints = store.all_checkpoints();
        checkpoints.sort_by_key(|(id, _)| *id);
        for (checkpoint_id, data) in checkpoints {
            match Locator::decode(&data) {
                Ok(locator) => self.check_checkpoint(checkpoint_id, &locator),
                Err(_) => self.violations.push(PropertyViolation::Undecodable {
                    checkpoint_id: checkpoint_id.get(),
                }),
            }
        }
    }

    /// Checks one checkpoint's structure and offset monotonicity.
    pub fn check_checkpoint(&mut self, checkpoint_id: CheckpointId, locator: &Locator) {
        self.checks_performed += 1;
        self.violations.extend(check_locator(locator));

        let probes: BTreeMap<u32, i64> = locator
            .progress()
            .iter()
            .flat_map(|entry| [(entry.from, entry.offset), (entry.to, entry.offset)])
            .collect();
        let src = locator.src().get();

        if let Some((prev_src, prev_probes)) = self.observed.get(&checkpoint_id.get()) {
            if *prev_src == src {
                for (&hash_id, &old) in prev_probes {
                    let Some(new) = locator.offset_for_hash(hash_id) else {
                        continue;
                    };
                    if new < old {
                        self.violations.push(PropertyViolation::OffsetRegressed {
                            checkpoint_id: checkpoint_id.get(),
                            hash_id,
                            old,
                            new,
                        });
                    }
                }
            }
        }

        self.observed.insert(checkpoint_id.get(), (src, probes));
    }

    /// Returns all violations found so far.
    #[must_use]
    pub fn violations(&self) -> &[PropertyViolation] {
        &self.violations
    }

    /// Returns true if no violations were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Prints a one-line summary.
    pub fn print_summary(&self, label: &str) {
        println!(
            "{label}: checks={}, checkpoints={}, violations={}",
            self.checks_performed,
            self.observed.len(),
            self.violations.len()
        );
    }
}
