//! Cardinality bounds and edge directions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bound on the number of edges observed at one endpoint of an edge rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cardinality {
    /// At most one edge.
    ZeroOrOne,
    /// Exactly one edge.
    One,
    /// Any number of edges (default).
    #[default]
    List,
}

impl Cardinality {
    /// Restrictiveness rank used to reconcile overlapping rules:
    /// `List < ZeroOrOne < One`. The most restrictive bound wins.
    pub fn rank(&self) -> u8 {
        match self {
            Cardinality::List => 0,
            Cardinality::ZeroOrOne => 1,
            Cardinality::One => 2,
        }
    }

    /// Pick the more restrictive of two bounds.
    pub fn most_restrictive(self, other: Cardinality) -> Cardinality {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    /// Check a realized edge count against this bound.
    pub fn admits(&self, count: usize) -> bool {
        match self {
            Cardinality::ZeroOrOne => count <= 1,
            Cardinality::One => count == 1,
            Cardinality::List => true,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::ZeroOrOne => write!(f, "zeroOrOne"),
            Cardinality::One => write!(f, "one"),
            Cardinality::List => write!(f, "list"),
        }
    }
}

/// Direction of an edge relative to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Edge leaves the node.
    Out,
    /// Edge arrives at the node.
    In,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Out => write!(f, "out"),
            Direction::In => write!(f, "in"),
        }
    }
}
