//! The schema compiler.
//!
//! Resolves the declaration registries into an immutable [`CompiledSchema`]:
//! multi-parent inheritance is flattened into per-type effective property
//! lists, edge rules are expanded into an adjacency table, and every element
//! receives a stable numeric id and a protocol id. Compilation is
//! deterministic: identical declaration sequences yield identical output.

mod compiler;
mod descriptor;
mod resolve;
mod schema;

pub use compiler::*;
pub use descriptor::*;
pub use schema::*;
