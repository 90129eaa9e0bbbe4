//! Persisted schema descriptor.
//!
//! A stable, versioned record form of a [`CompiledSchema`], keyed by
//! protocol id, so a storage engine can check compatibility between the
//! schema version used to write data and the one used to read it.

use crate::schema::{
    AdjacencyKey, CompiledEdgeRule, CompiledEdgeType, CompiledNodeType, CompiledProperty,
    CompiledSchema, EffectiveProperty, PermittedRule,
};
use cpg_core::{
    Cardinality, Direction, EdgeTypeId, PropertyId, ProtoId, TypeId, Value, ValueType,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Current descriptor format version.
pub const FORMAT_VERSION: u32 = 1;

/// Errors raised while reading a persisted descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The descriptor was written with an unsupported format version.
    #[error("Unsupported descriptor format version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// A record references a protocol id with no matching record.
    #[error("Descriptor references unknown protocol id {0}")]
    UnknownProtoId(ProtoId),

    /// JSON (de)serialization failure.
    #[error("Descriptor serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One registered property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub proto_id: u32,
    pub name: String,
    pub value_type: ValueType,
    pub mandatory: bool,
    pub is_list: bool,
    pub default: Option<Value>,
}

/// One node type with its resolved effective property list
/// (property protocol ids, effective order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTypeRecord {
    pub proto_id: u32,
    pub type_id: u32,
    pub name: String,
    pub alias: Option<String>,
    pub is_base: bool,
    pub properties: Vec<u32>,
    pub primary_key: Vec<usize>,
    pub ancestors: Vec<u32>,
}

/// One edge type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeTypeRecord {
    pub proto_id: u32,
    pub edge_type_id: u32,
    pub name: String,
}

/// One declared edge rule, endpoints keyed by node type protocol id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRuleRecord {
    pub edge_type: u32,
    pub source: u32,
    pub target: u32,
    pub cardinality_out: Cardinality,
    pub cardinality_in: Cardinality,
    pub step_label_out: Option<String>,
    pub step_label_in: Option<String>,
}

/// One expanded adjacency entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjacencyRecord {
    pub endpoint: u32,
    pub edge_type: u32,
    pub direction: Direction,
    pub counterpart: u32,
    pub cardinality: Cardinality,
    pub rule: u32,
}

/// The versioned persisted form of a compiled schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub format_version: u32,
    pub properties: Vec<PropertyRecord>,
    pub node_types: Vec<NodeTypeRecord>,
    pub edge_types: Vec<EdgeTypeRecord>,
    pub edge_rules: Vec<EdgeRuleRecord>,
    pub adjacency: Vec<AdjacencyRecord>,
}

impl CompiledSchema {
    /// Serialize this schema into its persisted record form.
    pub fn to_descriptor(&self) -> SchemaDescriptor {
        let properties = self
            .properties()
            .iter()
            .map(|p| PropertyRecord {
                proto_id: p.proto_id.raw(),
                name: p.name.clone(),
                value_type: p.value_type,
                mandatory: p.mandatory,
                is_list: p.is_list,
                default: p.default.clone(),
            })
            .collect();

        let node_types = self
            .node_types()
            .iter()
            .map(|t| NodeTypeRecord {
                proto_id: t.proto_id.raw(),
                type_id: t.id.raw(),
                name: t.name.clone(),
                alias: t.alias.clone(),
                is_base: t.is_base,
                properties: t.properties.iter().map(|p| p.proto_id.raw()).collect(),
                primary_key: t.primary_key.clone(),
                ancestors: t
                    .ancestors
                    .iter()
                    .map(|&a| self.node_type(a).map(|t| t.proto_id.raw()).unwrap_or(0))
                    .collect(),
            })
            .collect();

        let edge_types = self
            .edge_types()
            .iter()
            .map(|e| EdgeTypeRecord {
                proto_id: e.proto_id.raw(),
                edge_type_id: e.id.raw(),
                name: e.name.clone(),
            })
            .collect();

        let type_proto = |id: TypeId| -> u32 {
            self.node_type(id).map(|t| t.proto_id.raw()).unwrap_or(0)
        };
        let edge_proto = |id: EdgeTypeId| -> u32 {
            self.edge_type(id).map(|e| e.proto_id.raw()).unwrap_or(0)
        };

        let edge_rules = self
            .rules()
            .iter()
            .map(|r| EdgeRuleRecord {
                edge_type: edge_proto(r.edge_type),
                source: type_proto(r.source),
                target: type_proto(r.target),
                cardinality_out: r.cardinality_out,
                cardinality_in: r.cardinality_in,
                step_label_out: r.step_label_out.clone(),
                step_label_in: r.step_label_in.clone(),
            })
            .collect();

        let adjacency = self
            .adjacency()
            .iter()
            .flat_map(|(&(endpoint, edge_type, direction), counterparts)| {
                counterparts.iter().map(move |(&counterpart, permitted)| {
                    (endpoint, edge_type, direction, counterpart, *permitted)
                })
            })
            .map(|(endpoint, edge_type, direction, counterpart, permitted)| AdjacencyRecord {
                endpoint: type_proto(endpoint),
                edge_type: edge_proto(edge_type),
                direction,
                counterpart: type_proto(counterpart),
                cardinality: permitted.cardinality,
                rule: permitted.rule,
            })
            .collect();

        SchemaDescriptor {
            format_version: FORMAT_VERSION,
            properties,
            node_types,
            edge_types,
            edge_rules,
            adjacency,
        }
    }

    /// Rebuild a schema from its persisted record form.
    pub fn from_descriptor(descriptor: &SchemaDescriptor) -> Result<Self, DescriptorError> {
        if descriptor.format_version != FORMAT_VERSION {
            return Err(DescriptorError::UnsupportedVersion {
                found: descriptor.format_version,
                supported: FORMAT_VERSION,
            });
        }

        // Record order is declaration order, so indexes are the stable ids.
        let mut property_by_proto: HashMap<u32, PropertyId> = HashMap::new();
        let properties: Vec<CompiledProperty> = descriptor
            .properties
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let id = PropertyId::new(index as u32);
                property_by_proto.insert(record.proto_id, id);
                CompiledProperty {
                    id,
                    name: record.name.clone(),
                    value_type: record.value_type,
                    mandatory: record.mandatory,
                    is_list: record.is_list,
                    default: record.default.clone(),
                    proto_id: ProtoId::new(record.proto_id),
                }
            })
            .collect();

        let mut type_by_proto: HashMap<u32, TypeId> = HashMap::new();
        for record in &descriptor.node_types {
            type_by_proto.insert(record.proto_id, TypeId::new(record.type_id));
        }
        let mut edge_by_proto: HashMap<u32, EdgeTypeId> = HashMap::new();
        for record in &descriptor.edge_types {
            edge_by_proto.insert(record.proto_id, EdgeTypeId::new(record.edge_type_id));
        }

        let resolve_property = |proto: u32| -> Result<PropertyId, DescriptorError> {
            property_by_proto
                .get(&proto)
                .copied()
                .ok_or(DescriptorError::UnknownProtoId(ProtoId::new(proto)))
        };
        let resolve_type = |proto: u32| -> Result<TypeId, DescriptorError> {
            type_by_proto
                .get(&proto)
                .copied()
                .ok_or(DescriptorError::UnknownProtoId(ProtoId::new(proto)))
        };
        let resolve_edge = |proto: u32| -> Result<EdgeTypeId, DescriptorError> {
            edge_by_proto
                .get(&proto)
                .copied()
                .ok_or(DescriptorError::UnknownProtoId(ProtoId::new(proto)))
        };

        let mut type_names: HashMap<String, TypeId> = HashMap::new();
        let mut node_types: Vec<CompiledNodeType> = Vec::new();
        for record in &descriptor.node_types {
            let id = TypeId::new(record.type_id);
            let effective: Vec<EffectiveProperty> = record
                .properties
                .iter()
                .enumerate()
                .map(|(offset, &proto)| {
                    let property = resolve_property(proto)?;
                    let p = &properties[property.raw() as usize];
                    Ok(EffectiveProperty {
                        property,
                        name: p.name.clone(),
                        value_type: p.value_type,
                        mandatory: p.mandatory,
                        is_list: p.is_list,
                        default: p.default.clone(),
                        offset,
                        proto_id: p.proto_id,
                    })
                })
                .collect::<Result<_, DescriptorError>>()?;
            let ancestors = record
                .ancestors
                .iter()
                .map(|&proto| resolve_type(proto))
                .collect::<Result<_, DescriptorError>>()?;

            type_names.insert(record.name.clone(), id);
            if let Some(alias) = &record.alias {
                type_names.insert(alias.clone(), id);
            }
            node_types.push(CompiledNodeType {
                id,
                name: record.name.clone(),
                alias: record.alias.clone(),
                is_base: record.is_base,
                proto_id: ProtoId::new(record.proto_id),
                properties: effective,
                primary_key: record.primary_key.clone(),
                ancestors,
            });
        }

        let mut edge_type_names: HashMap<String, EdgeTypeId> = HashMap::new();
        let edge_types: Vec<CompiledEdgeType> = descriptor
            .edge_types
            .iter()
            .map(|record| {
                let id = EdgeTypeId::new(record.edge_type_id);
                edge_type_names.insert(record.name.clone(), id);
                CompiledEdgeType {
                    id,
                    name: record.name.clone(),
                    proto_id: ProtoId::new(record.proto_id),
                }
            })
            .collect();

        let rules: Vec<CompiledEdgeRule> = descriptor
            .edge_rules
            .iter()
            .map(|record| {
                Ok(CompiledEdgeRule {
                    edge_type: resolve_edge(record.edge_type)?,
                    source: resolve_type(record.source)?,
                    target: resolve_type(record.target)?,
                    cardinality_out: record.cardinality_out,
                    cardinality_in: record.cardinality_in,
                    step_label_out: record.step_label_out.clone(),
                    step_label_in: record.step_label_in.clone(),
                })
            })
            .collect::<Result<_, DescriptorError>>()?;

        let mut adjacency: BTreeMap<AdjacencyKey, BTreeMap<TypeId, PermittedRule>> =
            BTreeMap::new();
        for record in &descriptor.adjacency {
            let key = (
                resolve_type(record.endpoint)?,
                resolve_edge(record.edge_type)?,
                record.direction,
            );
            adjacency.entry(key).or_default().insert(
                resolve_type(record.counterpart)?,
                PermittedRule {
                    cardinality: record.cardinality,
                    rule: record.rule,
                },
            );
        }

        Ok(CompiledSchema::new(
            properties,
            node_types,
            type_names,
            edge_types,
            edge_type_names,
            rules,
            adjacency,
        ))
    }

    /// Serialize to a JSON descriptor string.
    pub fn to_json(&self) -> Result<String, DescriptorError> {
        Ok(serde_json::to_string_pretty(&self.to_descriptor())?)
    }

    /// Rebuild a schema from a JSON descriptor string.
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        let descriptor: SchemaDescriptor = serde_json::from_str(json)?;
        Self::from_descriptor(&descriptor)
    }
}
