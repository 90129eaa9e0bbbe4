//! Violation types collected by the validator.

use cpg_core::{Cardinality, Direction, EdgeId, NodeId};
use std::fmt;

/// A single structural violation found in an instance graph.
///
/// Violations are findings, not errors: validation always returns, and the
/// caller decides whether to reject the instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// A mandatory property is absent from the instance.
    MissingMandatoryProperty {
        node: NodeId,
        node_type: String,
        property: String,
    },
    /// A property value does not conform to its declared kind.
    WrongPropertyType {
        node: NodeId,
        property: String,
        expected: String,
        actual: String,
    },
    /// The realized edge count at an endpoint breaks the resolved bound.
    CardinalityViolation {
        node: NodeId,
        edge_type: String,
        direction: Direction,
        expected: Cardinality,
        actual: usize,
    },
    /// An edge whose (sourceType, edgeType, targetType) triple is not in
    /// the adjacency table.
    DisallowedEdgeEndpoint {
        edge: EdgeId,
        edge_type: String,
        source_type: String,
        target_type: String,
    },
    /// Two instances of one concrete type share an equal key tuple.
    PrimaryKeyCollision {
        node_type: String,
        key: String,
        nodes: Vec<NodeId>,
    },
    /// A node instance declares a type id the schema does not know.
    UnknownNodeType { node: NodeId, type_id: u32 },
    /// An edge instance declares an edge type id the schema does not know.
    UnknownEdgeType { edge: EdgeId, edge_type_id: u32 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingMandatoryProperty {
                node,
                node_type,
                property,
            } => write!(f, "{node}: mandatory property {property} missing on {node_type}"),
            Violation::WrongPropertyType {
                node,
                property,
                expected,
                actual,
            } => write!(f, "{node}: property {property} expected {expected}, got {actual}"),
            Violation::CardinalityViolation {
                node,
                edge_type,
                direction,
                expected,
                actual,
            } => write!(
                f,
                "{node}: {actual} {direction}-edges of type {edge_type}, bound is {expected}"
            ),
            Violation::DisallowedEdgeEndpoint {
                edge,
                edge_type,
                source_type,
                target_type,
            } => write!(
                f,
                "{edge}: {edge_type} edge from {source_type} to {target_type} not permitted"
            ),
            Violation::PrimaryKeyCollision {
                node_type,
                key,
                nodes,
            } => write!(
                f,
                "primary key {key} on {node_type} shared by {} instances",
                nodes.len()
            ),
            Violation::UnknownNodeType { node, type_id } => {
                write!(f, "{node}: unknown node type id {type_id}")
            }
            Violation::UnknownEdgeType { edge, edge_type_id } => {
                write!(f, "{edge}: unknown edge type id {edge_type_id}")
            }
        }
    }
}

/// Collection of violations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    /// Create a new empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Whether no violations were found.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// All violations.
    pub fn all(&self) -> &[Violation] {
        &self.violations
    }

    /// Merge another collection into this one.
    pub fn merge(&mut self, other: Violations) {
        self.violations.extend(other.violations);
    }

    /// Drop everything past the first `limit` violations.
    pub fn truncate(&mut self, limit: usize) {
        self.violations.truncate(limit);
    }

    /// Iterate violations in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
