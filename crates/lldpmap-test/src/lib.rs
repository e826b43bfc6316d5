//! Integration test infrastructure for lldpmap
//!
//! Provides:
//! - Device fixtures that produce canned walk results
//! - Ready-made device scenarios
//! - Neighbor table verification helpers

pub mod fixtures;
mod verification;

pub use fixtures::*;
pub use verification::*;
