//! Fatal schema errors.
//!
//! Every kind here aborts compilation: an inconsistent schema must never
//! back a store, so there is no partial result. Instance-level findings are
//! not errors; they are violations collected by the validator crate.

use cpg_core::ProtoId;
use thiserror::Error;

/// Errors raised while declaring or compiling a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A property name was re-registered with an incompatible definition.
    #[error("Duplicate property: {0} already registered with a different definition")]
    DuplicateProperty(String),

    /// Two inheritance paths contribute the same property name with
    /// different definitions.
    #[error("Property conflict on {node_type}: {property} contributed with differing definitions")]
    PropertyConflict { node_type: String, property: String },

    /// The extends graph contains a cycle.
    #[error("Inheritance cycle detected involving type: {0}")]
    CyclicInheritance(String),

    /// A declared base type does not exist.
    #[error("Unknown base type {base} extended by {node_type}")]
    UnknownBaseType { node_type: String, base: String },

    /// An edge rule references a node type that does not exist.
    #[error("Unknown node type {endpoint} in edge rule for {edge_type}")]
    UnknownEdgeEndpointType { edge_type: String, endpoint: String },

    /// An edge rule references an edge type that does not exist.
    #[error("Unknown edge type: {0}")]
    UnknownEdgeType(String),

    /// A node type name was declared twice.
    #[error("Duplicate node type name: {0}")]
    DuplicateNodeType(String),

    /// An edge type name was declared twice.
    #[error("Duplicate edge type name: {0}")]
    DuplicateEdgeType(String),

    /// A primary-key property is not part of the declaring type's
    /// effective property set.
    #[error("Primary key property {property} is not in the effective property set of {node_type}")]
    PrimaryKeyOutsideType { node_type: String, property: String },

    /// An explicit protocol id was assigned to more than one element.
    #[error("Duplicate protocol id: {0}")]
    DuplicateProtoId(ProtoId),

    /// A declaration referenced a property id unknown to this session's
    /// property registry.
    #[error("Unknown property id referenced by {node_type}")]
    UnknownProperty { node_type: String },

    /// The builder was mutated (or recompiled) after compile() froze it.
    #[error("Schema is frozen: no mutation is possible after compile()")]
    SchemaFrozen,
}

/// Result type for schema declaration and compilation.
pub type SchemaResult<T> = Result<T, SchemaError>;
