//! In-memory instance graph storage with endpoint and type indexes.

use cpg_core::{EdgeId, EdgeTypeId, NodeId, TypeId, Value};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors that can occur while building an instance graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A node with this id already exists.
    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// An edge with this id already exists.
    #[error("Duplicate edge id: {0}")]
    DuplicateEdge(EdgeId),

    /// An edge endpoint references a node not present in the graph.
    #[error("Edge {edge} references missing node {node}")]
    MissingEndpoint { edge: EdgeId, node: NodeId },
}

/// Result type for graph mutations.
pub type GraphResult<T> = Result<T, GraphError>;

/// A node instance.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Declared type of this node (reference to the compiled schema).
    pub type_id: TypeId,
    /// Property values by name.
    pub properties: HashMap<String, Value>,
}

impl Node {
    /// Create a new node with the given type and properties.
    pub fn new(id: NodeId, type_id: TypeId, properties: HashMap<String, Value>) -> Self {
        Self {
            id,
            type_id,
            properties,
        }
    }

    /// Get a property value by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// A directed edge instance connecting two nodes.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Unique identifier for this edge.
    pub id: EdgeId,
    /// Declared edge type (reference to the compiled schema).
    pub edge_type: EdgeTypeId,
    /// Source node.
    pub source: NodeId,
    /// Target node.
    pub target: NodeId,
}

impl Edge {
    /// Create a new edge.
    pub fn new(id: EdgeId, edge_type: EdgeTypeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            edge_type,
            source,
            target,
        }
    }
}

/// Type index: TypeId -> Set<NodeId>
#[derive(Debug, Default)]
struct TypeIndex {
    index: HashMap<TypeId, HashSet<NodeId>>,
}

impl TypeIndex {
    fn insert(&mut self, type_id: TypeId, node_id: NodeId) {
        self.index.entry(type_id).or_default().insert(node_id);
    }

    fn get(&self, type_id: TypeId) -> impl Iterator<Item = NodeId> + '_ {
        self.index
            .get(&type_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

/// The in-memory instance graph.
#[derive(Debug, Default)]
pub struct Graph {
    /// Node storage.
    nodes: HashMap<NodeId, Node>,
    /// Edge storage.
    edges: HashMap<EdgeId, Edge>,
    /// Type index.
    type_index: TypeIndex,
    /// Outgoing edges per node.
    out_index: HashMap<NodeId, Vec<EdgeId>>,
    /// Incoming edges per node.
    in_index: HashMap<NodeId, Vec<EdgeId>>,
    /// Next id handed out by `add_node_auto` / `add_edge_auto`.
    next_node_id: u64,
    next_edge_id: u64,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Node Operations ====================

    /// Insert a node with a caller-assigned id.
    pub fn add_node(
        &mut self,
        id: NodeId,
        type_id: TypeId,
        properties: HashMap<String, Value>,
    ) -> GraphResult<NodeId> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.type_index.insert(type_id, id);
        self.nodes.insert(id, Node::new(id, type_id, properties));
        self.next_node_id = self.next_node_id.max(id.raw() + 1);
        Ok(id)
    }

    /// Insert a node, allocating the next free id.
    pub fn add_node_auto(
        &mut self,
        type_id: TypeId,
        properties: HashMap<String, Value>,
    ) -> NodeId {
        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        self.type_index.insert(type_id, id);
        self.nodes.insert(id, Node::new(id, type_id, properties));
        id
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Iterate over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All nodes of a given type.
    pub fn nodes_of_type(&self, type_id: TypeId) -> impl Iterator<Item = &Node> + '_ {
        self.type_index.get(type_id).filter_map(|id| self.nodes.get(&id))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ==================== Edge Operations ====================

    /// Insert an edge with a caller-assigned id. Both endpoints must exist.
    pub fn add_edge(
        &mut self,
        id: EdgeId,
        edge_type: EdgeTypeId,
        source: NodeId,
        target: NodeId,
    ) -> GraphResult<EdgeId> {
        if self.edges.contains_key(&id) {
            return Err(GraphError::DuplicateEdge(id));
        }
        if !self.nodes.contains_key(&source) {
            return Err(GraphError::MissingEndpoint { edge: id, node: source });
        }
        if !self.nodes.contains_key(&target) {
            return Err(GraphError::MissingEndpoint { edge: id, node: target });
        }
        self.out_index.entry(source).or_default().push(id);
        self.in_index.entry(target).or_default().push(id);
        self.edges.insert(id, Edge::new(id, edge_type, source, target));
        self.next_edge_id = self.next_edge_id.max(id.raw() + 1);
        Ok(id)
    }

    /// Insert an edge, allocating the next free id.
    pub fn add_edge_auto(
        &mut self,
        edge_type: EdgeTypeId,
        source: NodeId,
        target: NodeId,
    ) -> GraphResult<EdgeId> {
        let id = EdgeId::new(self.next_edge_id);
        self.next_edge_id += 1;
        self.add_edge(id, edge_type, source, target)
    }

    /// Get an edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Iterate over all edges.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Outgoing edges of a node.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.out_index
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
    }

    /// Incoming edges of a node.
    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.in_index
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
