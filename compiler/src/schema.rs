//! The immutable compiled schema and its consumer lookup interface.

use cpg_core::{Cardinality, Direction, EdgeTypeId, PropertyId, ProtoId, TypeId, Value, ValueType};
use std::collections::{BTreeMap, HashMap};

/// A resolved property with its assigned protocol id.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProperty {
    /// Session-stable id; index into the schema's property table.
    pub id: PropertyId,
    /// Registry-wide unique name.
    pub name: String,
    /// Scalar kind (element kind for lists).
    pub value_type: ValueType,
    /// Whether the property must be present on instances.
    pub mandatory: bool,
    /// Whether the property holds an ordered list.
    pub is_list: bool,
    /// Default for consumers reading a graph; not an instance substitute.
    pub default: Option<Value>,
    /// Resolved protocol id.
    pub proto_id: ProtoId,
}

/// One slot of a node type's flattened effective property list.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveProperty {
    /// The referenced property.
    pub property: PropertyId,
    /// Property name (copied for direct consumer access).
    pub name: String,
    /// Scalar kind (element kind for lists).
    pub value_type: ValueType,
    /// Whether the property must be present on instances.
    pub mandatory: bool,
    /// Whether the property holds an ordered list.
    pub is_list: bool,
    /// Default for consumers reading a graph; not an instance substitute.
    pub default: Option<Value>,
    /// Position in the type's effective property list.
    pub offset: usize,
    /// Resolved protocol id of the property.
    pub proto_id: ProtoId,
}

/// A resolved node type.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledNodeType {
    /// Stable numeric id; index into the schema's node type table.
    pub id: TypeId,
    /// Type name.
    pub name: String,
    /// Optional alias name.
    pub alias: Option<String>,
    /// Whether this is an abstract base type.
    pub is_base: bool,
    /// Resolved protocol id.
    pub proto_id: ProtoId,
    /// Flattened, offset-indexed effective property list.
    pub properties: Vec<EffectiveProperty>,
    /// Offsets (into `properties`) of the primary key components,
    /// in declaration order. Empty when no key is declared.
    pub primary_key: Vec<usize>,
    /// Transitive ancestors, nearest first.
    pub ancestors: Vec<TypeId>,
}

impl CompiledNodeType {
    /// Look up an effective property by name.
    pub fn property(&self, name: &str) -> Option<&EffectiveProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Whether a primary key is declared for this type.
    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.is_empty()
    }
}

/// A resolved edge type.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledEdgeType {
    /// Stable numeric id; index into the schema's edge type table.
    pub id: EdgeTypeId,
    /// Edge type name.
    pub name: String,
    /// Resolved protocol id.
    pub proto_id: ProtoId,
}

/// A declared edge rule with names resolved to ids. Kept alongside the
/// expanded adjacency table for traversal-label consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledEdgeRule {
    pub edge_type: EdgeTypeId,
    pub source: TypeId,
    pub target: TypeId,
    pub cardinality_out: Cardinality,
    pub cardinality_in: Cardinality,
    pub step_label_out: Option<String>,
    pub step_label_in: Option<String>,
}

/// One permitted counterpart type in the adjacency table: the reconciled
/// cardinality bound and the declared rule it came from. Counting for
/// cardinality checks groups counterpart types by rule, so a bound declared
/// against a base type applies to the whole subtype class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PermittedRule {
    /// Reconciled bound at this endpoint.
    pub cardinality: Cardinality,
    /// Index into the declared rule list.
    pub rule: u32,
}

/// Adjacency key: the endpoint type, the edge type, and the direction the
/// edge is observed from that endpoint.
pub type AdjacencyKey = (TypeId, EdgeTypeId, Direction);

/// The immutable resolved schema.
///
/// No interior mutability: once built it may be shared lock-free by any
/// number of concurrent readers.
#[derive(Debug, PartialEq)]
pub struct CompiledSchema {
    properties: Vec<CompiledProperty>,
    node_types: Vec<CompiledNodeType>,
    type_names: HashMap<String, TypeId>,
    edge_types: Vec<CompiledEdgeType>,
    edge_type_names: HashMap<String, EdgeTypeId>,
    rules: Vec<CompiledEdgeRule>,
    adjacency: BTreeMap<AdjacencyKey, BTreeMap<TypeId, PermittedRule>>,
}

impl CompiledSchema {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        properties: Vec<CompiledProperty>,
        node_types: Vec<CompiledNodeType>,
        type_names: HashMap<String, TypeId>,
        edge_types: Vec<CompiledEdgeType>,
        edge_type_names: HashMap<String, EdgeTypeId>,
        rules: Vec<CompiledEdgeRule>,
        adjacency: BTreeMap<AdjacencyKey, BTreeMap<TypeId, PermittedRule>>,
    ) -> Self {
        Self {
            properties,
            node_types,
            type_names,
            edge_types,
            edge_type_names,
            rules,
            adjacency,
        }
    }

    // ==================== Node Type Lookups ====================

    /// Resolve a type name (or alias) to its id.
    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.type_names.get(name).copied()
    }

    /// Resolve a type id to its name.
    pub fn type_name(&self, id: TypeId) -> Option<&str> {
        self.node_type(id).map(|t| t.name.as_str())
    }

    /// Get a node type by id.
    pub fn node_type(&self, id: TypeId) -> Option<&CompiledNodeType> {
        self.node_types.get(id.raw() as usize)
    }

    /// Get a node type by name or alias.
    pub fn node_type_by_name(&self, name: &str) -> Option<&CompiledNodeType> {
        self.type_id(name).and_then(|id| self.node_type(id))
    }

    /// All node types, ordered by id.
    pub fn node_types(&self) -> &[CompiledNodeType] {
        &self.node_types
    }

    // ==================== Edge Type Lookups ====================

    /// Resolve an edge type name to its id.
    pub fn edge_type_id(&self, name: &str) -> Option<EdgeTypeId> {
        self.edge_type_names.get(name).copied()
    }

    /// Get an edge type by id.
    pub fn edge_type(&self, id: EdgeTypeId) -> Option<&CompiledEdgeType> {
        self.edge_types.get(id.raw() as usize)
    }

    /// Resolve an edge type id to its name.
    pub fn edge_type_name(&self, id: EdgeTypeId) -> Option<&str> {
        self.edge_type(id).map(|t| t.name.as_str())
    }

    /// All edge types, ordered by id.
    pub fn edge_types(&self) -> &[CompiledEdgeType] {
        &self.edge_types
    }

    // ==================== Property Lookups ====================

    /// Get a property by id.
    pub fn property(&self, id: PropertyId) -> Option<&CompiledProperty> {
        self.properties.get(id.raw() as usize)
    }

    /// All registered properties, ordered by id.
    pub fn properties(&self) -> &[CompiledProperty] {
        &self.properties
    }

    // ==================== Adjacency ====================

    /// Permitted counterpart types for (endpoint type, edge type, direction),
    /// with the reconciled cardinality bound for each.
    pub fn permitted(
        &self,
        endpoint: TypeId,
        edge_type: EdgeTypeId,
        direction: Direction,
    ) -> Option<&BTreeMap<TypeId, PermittedRule>> {
        self.adjacency.get(&(endpoint, edge_type, direction))
    }

    /// Whether an edge of `edge_type` from `source` to `target` is permitted.
    pub fn edge_allowed(&self, source: TypeId, edge_type: EdgeTypeId, target: TypeId) -> bool {
        self.permitted(source, edge_type, Direction::Out)
            .is_some_and(|targets| targets.contains_key(&target))
    }

    /// The full expanded adjacency table.
    pub fn adjacency(&self) -> &BTreeMap<AdjacencyKey, BTreeMap<TypeId, PermittedRule>> {
        &self.adjacency
    }

    /// The declared edge rules with resolved ids.
    pub fn rules(&self) -> &[CompiledEdgeRule] {
        &self.rules
    }
}
