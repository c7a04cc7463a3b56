//! Tidemark Tests - Deterministic Simulation Testing for Tidemark.
//!
//! This crate contains the DST (Deterministic Simulation Testing) and
//! property tests for locator checkpoints. Tests are organized by type:
//!
//! ## Test Organization
//!
//! **Property Tests**:
//! - `locator_tests`: Seeded merge, shrink, freshness and codec properties
//!   checked against a point-wise oracle
//!
//! **DST Tests**:
//! - `checkpoint_tests`: Parallel workers committing through
//!   `CheckpointManager` with `SimulatedLocatorStore` fault injection
//!
//! **Support Modules**:
//! - `properties`: Locator invariants and the stateful `PropertyChecker`
//! - `scenarios`: Worker layouts, seeds and the deterministic hash
//!
//! ## Naming Conventions
//!
//! - Integration tests: `test_<component>_<scenario>`
//! - Unit tests: Inline in each crate under `#[cfg(test)]`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod properties;
pub mod scenarios;
