//! Node type declarations and their inheritance relations.

use crate::{SchemaError, SchemaResult};
use cpg_core::{PropertyId, ProtoId};
use indexmap::IndexMap;

/// A declared node type.
///
/// `extends` references are stored by name and resolved by the compiler, so
/// forward references between declarations are permitted.
#[derive(Debug, Clone)]
pub struct NodeTypeDecl {
    /// Type name.
    pub name: String,
    /// Free-form documentation.
    pub doc: String,
    /// Optional alias name (secondary lookup key for renamed types).
    pub alias: Option<String>,
    /// Whether this is an abstract base type (never instantiated).
    pub is_base: bool,
    /// Parent type names, in declaration order. Duplicates are collapsed.
    pub extends: Vec<String>,
    /// Own properties, in declaration order.
    pub properties: Vec<PropertyId>,
    /// Primary key property references, if declared.
    pub primary_key: Vec<PropertyId>,
    /// Explicit protocol id, if any.
    pub proto_id: Option<ProtoId>,
}

impl NodeTypeDecl {
    pub fn new(name: impl Into<String>, is_base: bool) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            alias: None,
            is_base,
            extends: Vec::new(),
            properties: Vec::new(),
            primary_key: Vec::new(),
            proto_id: None,
        }
    }

    /// Add an inheritance edge; repeated parents are ignored.
    pub fn add_extends(&mut self, parent: impl Into<String>) {
        let parent = parent.into();
        if !self.extends.contains(&parent) {
            self.extends.push(parent);
        }
    }

    /// Attach own properties; repeated ids are ignored.
    pub fn add_properties(&mut self, props: &[PropertyId]) {
        for &p in props {
            if !self.properties.contains(&p) {
                self.properties.push(p);
            }
        }
    }
}

/// Registry of declared node types, iterated in declaration order.
#[derive(Debug, Default)]
pub struct NodeTypeRegistry {
    decls: IndexMap<String, NodeTypeDecl>,
}

impl NodeTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new declaration; the name must be unused.
    pub fn insert(&mut self, decl: NodeTypeDecl) -> SchemaResult<()> {
        if self.decls.contains_key(&decl.name) {
            return Err(SchemaError::DuplicateNodeType(decl.name));
        }
        self.decls.insert(decl.name.clone(), decl);
        Ok(())
    }

    /// Mutable access to an existing declaration (for cumulative `extendz`
    /// blocks declared after the type itself).
    pub fn get_mut(&mut self, name: &str) -> Option<&mut NodeTypeDecl> {
        self.decls.get_mut(name)
    }

    /// Look up a declaration by name.
    pub fn get(&self, name: &str) -> Option<&NodeTypeDecl> {
        self.decls.get(name)
    }

    /// Whether a type with this name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.decls.contains_key(name)
    }

    /// Iterate declarations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeTypeDecl> {
        self.decls.values()
    }

    /// Number of declared node types.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether no node types are declared.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
