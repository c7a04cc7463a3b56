//! System limits and configuration bounds.
//!
//! Following TigerStyle: put limits on everything.
//! Locators are small in practice (one entry per hash-range partition), but a
//! corrupted or hostile checkpoint must not be able to grow them unbounded.

/// Largest hash id in the partition universe `[0, HASH_ID_MAX]`.
pub const HASH_ID_MAX: u32 = 65_535;

/// Offset value meaning "unknown / not yet consumed".
pub const OFFSET_UNSET: i64 = -1;

/// System-wide limits for Tidemark.
///
/// All limits are explicit and configurable. Default values are chosen
/// to be safe for most deployments while allowing customization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of progress entries in one locator.
    pub max_progress_entries: u32,
    /// Maximum size of opaque user data carried by a locator, in bytes.
    pub max_user_data_bytes: u32,
}

impl Limits {
    /// Creates limits with safe defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            // One entry per hash id is the theoretical worst case.
            max_progress_entries: HASH_ID_MAX + 1,
            // 1MB of caller metadata.
            max_user_data_bytes: 1024 * 1024,
        }
    }

    /// Validates that all limits are internally consistent.
    ///
    /// # Errors
    /// Returns an error if any limits are invalid or inconsistent.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_progress_entries == 0 {
            return Err(crate::Error::InvalidArgument {
                name: "max_progress_entries",
                reason: "must be positive",
            });
        }

        // More entries than hash ids can never be non-overlapping.
        if self.max_progress_entries > HASH_ID_MAX + 1 {
            return Err(crate::Error::InvalidArgument {
                name: "max_progress_entries",
                reason: "must be <= 65536",
            });
        }

        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new()
    }
}
