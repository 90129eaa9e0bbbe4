//! Structural validation of instance graphs against a compiled schema.
//!
//! Validation is exhaustive, not fail-fast: all violations across the
//! instance are collected in one pass (optionally bounded by a caller
//! budget) so a caller can report every problem rather than only the first.

mod validator;
mod violation;

pub use validator::*;
pub use violation::*;
