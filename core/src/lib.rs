//! CPG Core Types
//!
//! This crate provides the foundational types used throughout the schema
//! system:
//! - Identity types (NodeId, EdgeId)
//! - Schema identifiers (TypeId, EdgeTypeId, PropertyId, ProtoId)
//! - Value types (the Value enum and its ValueType classification)
//! - Cardinality bounds and edge directions

mod cardinality;
mod id;
mod value;

pub use cardinality::*;
pub use id::*;
pub use value::*;
