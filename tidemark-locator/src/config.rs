//! Checkpoint manager configuration.

use tidemark_core::Limits;

/// Configuration for checkpoint tracking.
#[derive(Debug, Clone)]
pub struct CheckpointConfig {
    /// Maximum progress entries a committed locator may hold.
    pub max_progress_entries: u32,
    /// Maximum user data carried by a committed locator, in bytes.
    pub max_user_data_bytes: u32,
    /// Allow freshness comparisons across sources when one side is legacy.
    pub ignore_legacy_diff_src: bool,
}

impl CheckpointConfig {
    /// Creates config from system limits.
    #[must_use]
    pub const fn from_limits(limits: &Limits) -> Self {
        Self {
            max_progress_entries: limits.max_progress_entries,
            max_user_data_bytes: limits.max_user_data_bytes,
            ignore_legacy_diff_src: true,
        }
    }

    /// Creates config for testing with tight limits.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_progress_entries: 64,
            max_user_data_bytes: 1024,
            ignore_legacy_diff_src: true,
        }
    }
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self::from_limits(&Limits::default())
    }
}
