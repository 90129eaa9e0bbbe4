//! Instance graph consumed by the structural validator.
//!
//! Frontends (parsers, analysis passes) fill a [`Graph`] with typed node and
//! edge instances; the validator walks it against a compiled schema. The
//! graph itself performs no schema checks.

mod graph;

pub use graph::*;
