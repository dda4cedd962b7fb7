//! Test helpers
//!
//! Builders for mined chains and forged blocks shared by the unit tests.

pub mod test_utils;

pub use test_utils::*;
