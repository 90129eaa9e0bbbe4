//! Edge type declarations and directional cardinality rules.

use crate::{SchemaError, SchemaResult};
use cpg_core::{Cardinality, ProtoId};
use indexmap::IndexMap;

/// A declared edge type (the relation category, not its endpoint rules).
#[derive(Debug, Clone)]
pub struct EdgeTypeDecl {
    /// Edge type name.
    pub name: String,
    /// Free-form documentation.
    pub doc: String,
    /// Explicit protocol id, if any.
    pub proto_id: Option<ProtoId>,
}

impl EdgeTypeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            proto_id: None,
        }
    }
}

/// One permitted (source, target) pair for an edge type, with the
/// cardinality bound observed at each endpoint.
///
/// Rules accumulate additively: repeated declarations for the same source
/// widen the permitted-target set. Rules for the identical triple are
/// reconciled by the compiler (most restrictive cardinality wins).
#[derive(Debug, Clone)]
pub struct EdgeRule {
    /// Edge type name.
    pub edge_type: String,
    /// Source node type name.
    pub source: String,
    /// Target node type name.
    pub target: String,
    /// Bound on outgoing edges per source instance toward this rule's
    /// target class.
    pub cardinality_out: Cardinality,
    /// Bound on incoming edges per target instance from this rule's
    /// source class.
    pub cardinality_in: Cardinality,
    /// Optional named traversal label for the out direction.
    pub step_label_out: Option<String>,
    /// Optional named traversal label for the in direction.
    pub step_label_in: Option<String>,
}

/// Registry of edge types and their accumulated rules.
#[derive(Debug, Default)]
pub struct EdgeTypeRegistry {
    decls: IndexMap<String, EdgeTypeDecl>,
    rules: Vec<EdgeRule>,
}

impl EdgeTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an edge category; the name must be unused.
    pub fn insert(&mut self, decl: EdgeTypeDecl) -> SchemaResult<()> {
        if self.decls.contains_key(&decl.name) {
            return Err(SchemaError::DuplicateEdgeType(decl.name));
        }
        self.decls.insert(decl.name.clone(), decl);
        Ok(())
    }

    /// Append an edge rule. The edge type must already be declared; the
    /// endpoint types are resolved later by the compiler.
    pub fn add_rule(&mut self, rule: EdgeRule) -> SchemaResult<()> {
        if !self.decls.contains_key(&rule.edge_type) {
            return Err(SchemaError::UnknownEdgeType(rule.edge_type));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Look up an edge type by name.
    pub fn get(&self, name: &str) -> Option<&EdgeTypeDecl> {
        self.decls.get(name)
    }

    /// Whether an edge type with this name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.decls.contains_key(name)
    }

    /// Iterate edge type declarations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &EdgeTypeDecl> {
        self.decls.values()
    }

    /// Accumulated rules in declaration order.
    pub fn rules(&self) -> &[EdgeRule] {
        &self.rules
    }

    /// Number of declared edge types.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether no edge types are declared.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
