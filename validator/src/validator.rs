//! The structural validator.
//!
//! Walks an instance graph against a compiled schema and collects every
//! violation. Property and cardinality checks are independent per node;
//! primary-key and endpoint checks are associative reductions, so a large
//! graph can be partitioned across rayon workers and the per-partition
//! results merged.

use crate::violation::{Violation, Violations};
use cpg_compiler::CompiledSchema;
use cpg_core::{Cardinality, Direction, EdgeTypeId, NodeId, TypeId};
use cpg_graph::{Edge, Graph, Node};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Nodes per rayon work unit in `validate_parallel`.
const PARTITION_SIZE: usize = 512;

/// Grouping key for primary-key uniqueness: concrete type plus the rendered
/// key tuple. Uniqueness is global per concrete type.
type KeyMap = HashMap<(TypeId, Vec<String>), Vec<NodeId>>;

/// Checks candidate instance graphs against a compiled schema.
pub struct Validator<'s> {
    schema: &'s CompiledSchema,
    limit: Option<usize>,
}

impl<'s> Validator<'s> {
    /// Create a validator for one compiled schema.
    pub fn new(schema: &'s CompiledSchema) -> Self {
        Self {
            schema,
            limit: None,
        }
    }

    /// Stop collecting once `limit` violations have been found. The partial
    /// list is valid as far as it goes.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Validate a graph in one sequential pass.
    pub fn validate(&self, graph: &Graph) -> Violations {
        let mut violations = Violations::new();

        for node in graph.nodes() {
            if self.reached_limit(&violations) {
                break;
            }
            self.check_node_properties(node, &mut violations);
            self.check_node_cardinality(node, graph, &mut violations);
        }

        if !self.reached_limit(&violations) {
            let nodes: Vec<&Node> = graph.nodes().collect();
            let keys = self.collect_keys(&nodes);
            self.report_key_collisions(keys, &mut violations);
        }

        for edge in graph.edges() {
            if self.reached_limit(&violations) {
                break;
            }
            self.check_edge_endpoints(edge, graph, &mut violations);
        }

        if let Some(limit) = self.limit {
            violations.truncate(limit);
        }
        debug!(violations = violations.len(), "validation finished");
        violations
    }

    /// Validate a graph by partitioning nodes and edges across rayon
    /// workers and merging per-partition violation lists. The violation
    /// budget applies to the merged result.
    pub fn validate_parallel(&self, graph: &Graph) -> Violations {
        let nodes: Vec<&Node> = graph.nodes().collect();
        let edges: Vec<&Edge> = graph.edges().collect();

        let mut violations = nodes
            .par_chunks(PARTITION_SIZE)
            .map(|chunk| {
                let mut partial = Violations::new();
                for node in chunk {
                    self.check_node_properties(node, &mut partial);
                    self.check_node_cardinality(node, graph, &mut partial);
                }
                partial
            })
            .reduce(Violations::new, |mut a, b| {
                a.merge(b);
                a
            });

        let keys = nodes
            .par_chunks(PARTITION_SIZE)
            .map(|chunk| self.collect_keys(chunk))
            .reduce(KeyMap::new, merge_key_maps);
        self.report_key_collisions(keys, &mut violations);

        let edge_violations = edges
            .par_chunks(PARTITION_SIZE)
            .map(|chunk| {
                let mut partial = Violations::new();
                for edge in chunk {
                    self.check_edge_endpoints(edge, graph, &mut partial);
                }
                partial
            })
            .reduce(Violations::new, |mut a, b| {
                a.merge(b);
                a
            });
        violations.merge(edge_violations);

        if let Some(limit) = self.limit {
            violations.truncate(limit);
        }
        debug!(violations = violations.len(), "parallel validation finished");
        violations
    }

    fn reached_limit(&self, violations: &Violations) -> bool {
        self.limit.is_some_and(|limit| violations.len() >= limit)
    }

    // ==================== Property Checks ====================

    /// Every mandatory property must be present with a value of the correct
    /// kind. The schema default is a consumer-side substitute; it does not
    /// excuse an absent mandatory value on the instance.
    fn check_node_properties(&self, node: &Node, violations: &mut Violations) {
        let Some(node_type) = self.schema.node_type(node.type_id) else {
            violations.push(Violation::UnknownNodeType {
                node: node.id,
                type_id: node.type_id.raw(),
            });
            return;
        };

        for effective in &node_type.properties {
            match node.property(&effective.name) {
                None => {
                    if effective.mandatory {
                        violations.push(Violation::MissingMandatoryProperty {
                            node: node.id,
                            node_type: node_type.name.clone(),
                            property: effective.name.clone(),
                        });
                    }
                }
                Some(value) => {
                    if !value.conforms_to(effective.value_type, effective.is_list) {
                        let expected = if effective.is_list {
                            format!("List<{}>", effective.value_type)
                        } else {
                            effective.value_type.to_string()
                        };
                        violations.push(Violation::WrongPropertyType {
                            node: node.id,
                            property: effective.name.clone(),
                            expected,
                            actual: value.type_name().to_string(),
                        });
                    }
                }
            }
        }
    }

    // ==================== Primary Keys ====================

    /// Collect key tuples for every node whose concrete type declares a
    /// primary key. Absent components fall back to the schema default so a
    /// missing mandatory value does not mask a collision. String components
    /// are rendered unquoted.
    fn collect_keys(&self, nodes: &[&Node]) -> KeyMap {
        let mut keys = KeyMap::new();
        for node in nodes {
            let Some(node_type) = self.schema.node_type(node.type_id) else {
                continue;
            };
            if !node_type.has_primary_key() {
                continue;
            }
            let tuple: Vec<String> = node_type
                .primary_key
                .iter()
                .map(|&offset| {
                    let effective = &node_type.properties[offset];
                    node.property(&effective.name)
                        .or(effective.default.as_ref())
                        .map(|v| {
                            v.as_str()
                                .map(str::to_string)
                                .unwrap_or_else(|| v.to_string())
                        })
                        .unwrap_or_else(|| "<absent>".to_string())
                })
                .collect();
            keys.entry((node.type_id, tuple)).or_default().push(node.id);
        }
        keys
    }

    /// Emit one collision per shared key tuple, in deterministic order.
    fn report_key_collisions(&self, keys: KeyMap, violations: &mut Violations) {
        let mut collisions: Vec<((TypeId, Vec<String>), Vec<NodeId>)> = keys
            .into_iter()
            .filter(|(_, nodes)| nodes.len() > 1)
            .collect();
        collisions.sort_by(|a, b| a.0.cmp(&b.0));

        for ((type_id, tuple), mut nodes) in collisions {
            if self.reached_limit(violations) {
                return;
            }
            nodes.sort();
            violations.push(Violation::PrimaryKeyCollision {
                node_type: self
                    .schema
                    .type_name(type_id)
                    .unwrap_or_default()
                    .to_string(),
                key: tuple.join("|"),
                nodes,
            });
        }
    }

    // ==================== Edge Checks ====================

    /// The (sourceType, edgeType, targetType) triple must be present in the
    /// adjacency table. Endpoints with unknown types are skipped here; the
    /// node pass already reported them.
    fn check_edge_endpoints(&self, edge: &Edge, graph: &Graph, violations: &mut Violations) {
        let Some(edge_type) = self.schema.edge_type(edge.edge_type) else {
            violations.push(Violation::UnknownEdgeType {
                edge: edge.id,
                edge_type_id: edge.edge_type.raw(),
            });
            return;
        };
        let (Some(source), Some(target)) = (graph.node(edge.source), graph.node(edge.target))
        else {
            return;
        };
        let (Some(source_type), Some(target_type)) = (
            self.schema.node_type(source.type_id),
            self.schema.node_type(target.type_id),
        ) else {
            return;
        };

        if !self
            .schema
            .edge_allowed(source.type_id, edge.edge_type, target.type_id)
        {
            violations.push(Violation::DisallowedEdgeEndpoint {
                edge: edge.id,
                edge_type: edge_type.name.clone(),
                source_type: source_type.name.clone(),
                target_type: target_type.name.clone(),
            });
        }
    }

    // ==================== Cardinality ====================

    /// Count realized edges at this node per (edge type, direction, rule
    /// class) and compare each non-List bound, including bounds with a zero
    /// count: a `One` rule with no realized edge is a violation.
    fn check_node_cardinality(&self, node: &Node, graph: &Graph, violations: &mut Violations) {
        if self.schema.node_type(node.type_id).is_none() {
            return;
        }

        let mut counts: HashMap<(EdgeTypeId, Direction, u32), usize> = HashMap::new();
        for edge in graph.out_edges(node.id) {
            if let Some(counterpart) = graph.node(edge.target) {
                if let Some(permitted) =
                    self.schema
                        .permitted(node.type_id, edge.edge_type, Direction::Out)
                {
                    if let Some(rule) = permitted.get(&counterpart.type_id) {
                        *counts
                            .entry((edge.edge_type, Direction::Out, rule.rule))
                            .or_default() += 1;
                    }
                }
            }
        }
        for edge in graph.in_edges(node.id) {
            if let Some(counterpart) = graph.node(edge.source) {
                if let Some(permitted) =
                    self.schema
                        .permitted(node.type_id, edge.edge_type, Direction::In)
                {
                    if let Some(rule) = permitted.get(&counterpart.type_id) {
                        *counts
                            .entry((edge.edge_type, Direction::In, rule.rule))
                            .or_default() += 1;
                    }
                }
            }
        }

        let range_start = (node.type_id, EdgeTypeId::new(0), Direction::Out);
        let range_end = (node.type_id, EdgeTypeId::new(u32::MAX), Direction::In);
        for (&(_, edge_type, direction), permitted) in
            self.schema.adjacency().range(range_start..=range_end)
        {
            // One bound per rule class; counterpart types of the same rule
            // share the class, so gather the distinct rules first.
            let mut bounds: BTreeMap<u32, Cardinality> = BTreeMap::new();
            for rule in permitted.values() {
                bounds
                    .entry(rule.rule)
                    .and_modify(|c| *c = c.most_restrictive(rule.cardinality))
                    .or_insert(rule.cardinality);
            }
            for (rule, cardinality) in bounds {
                if cardinality == Cardinality::List {
                    continue;
                }
                let count = counts
                    .get(&(edge_type, direction, rule))
                    .copied()
                    .unwrap_or(0);
                if !cardinality.admits(count) {
                    violations.push(Violation::CardinalityViolation {
                        node: node.id,
                        edge_type: self
                            .schema
                            .edge_type_name(edge_type)
                            .unwrap_or_default()
                            .to_string(),
                        direction,
                        expected: cardinality,
                        actual: count,
                    });
                }
            }
        }
    }
}

/// Merge per-partition key maps, concatenating the node lists per key tuple.
fn merge_key_maps(mut a: KeyMap, b: KeyMap) -> KeyMap {
    for (key, nodes) in b {
        a.entry(key).or_default().extend(nodes);
    }
    a
}
