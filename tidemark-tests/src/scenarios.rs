//! Reusable test scenarios for locator simulation.
//!
//! Scenarios define common worker layouts and seeds that can be composed
//! to create comprehensive tests.

/// Standard worker layouts over the hash universe.
pub mod layouts {
    use tidemark_core::HashRange;

    /// Splits `[0, 65535]` into `workers` contiguous, equally sized ranges.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is zero or does not divide 65536.
    #[must_use]
    pub fn even_split(workers: u32) -> Vec<HashRange> {
        assert!(workers > 0, "workers must be positive");
        assert_eq!(65_536 % workers, 0, "workers must divide the hash universe");

        let width = 65_536 / workers;
        (0..workers)
            .map(|i| {
                HashRange::new(i * width, (i + 1) * width - 1).expect("range within universe")
            })
            .collect()
    }

    /// Four workers, one per quarter of the hash universe.
    #[must_use]
    pub fn quarters() -> Vec<HashRange> {
        even_split(4)
    }
}

/// Seeds for reproducible testing.
pub mod seeds {
    /// Standard test seeds that have historically found bugs.
    pub const REGRESSION_SEEDS: &[u64] = &[
        42,
        12345,
        0xDEAD_BEEF,
        999,
        7777,
        0x1337,
        0xCAFE_BABE,
        1,
        u64::MAX,
        0,
    ];

    /// Number of random seeds to test in CI.
    pub const CI_SEED_COUNT: u32 = 100;
}

/// Deterministic hash for randomized operations.
#[must_use]
pub const fn det_hash(seed: u64, counter: u64) -> u64 {
    seed.wrapping_add(counter).wrapping_mul(0x9e37_79b9_7f4a_7c15)
}
