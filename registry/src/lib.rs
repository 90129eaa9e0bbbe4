//! Declaration registries and the schema builder.
//!
//! Declarations accumulate in three mutable registries (properties, node
//! types, edge types) behind a [`SchemaBuilder`] facade during a single
//! construction session. The compiler crate resolves and freezes them into
//! an immutable compiled schema; after that every mutator fails with
//! [`SchemaError::SchemaFrozen`].

mod builder;
mod edge_type;
mod error;
mod node_type;
mod property;

pub use builder::*;
pub use edge_type::*;
pub use error::*;
pub use node_type::*;
pub use property::*;
