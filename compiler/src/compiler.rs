//! Main compiler implementation: orchestrates the declaration registries
//! strictly in declaration order and freezes the result.

use crate::resolve;
use crate::schema::{
    AdjacencyKey, CompiledEdgeRule, CompiledEdgeType, CompiledNodeType, CompiledProperty,
    CompiledSchema, EffectiveProperty, PermittedRule,
};
use cpg_core::{Direction, EdgeTypeId, ProtoId, TypeId};
use cpg_registry::{SchemaBuilder, SchemaError, SchemaResult};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// The schema compiler.
///
/// `compile` resolves a builder session into a [`CompiledSchema`] and
/// freezes the builder; any later mutation or recompilation fails with
/// `SchemaFrozen`.
pub struct SchemaCompiler;

impl SchemaCompiler {
    pub fn compile(builder: &mut SchemaBuilder) -> SchemaResult<CompiledSchema> {
        if builder.is_frozen() {
            return Err(SchemaError::SchemaFrozen);
        }

        resolve::check_bases(builder.node_types())?;
        resolve::check_cycles(builder.node_types())?;

        let proto_ids = assign_proto_ids(builder)?;

        // Pass 1: properties, in declaration order.
        let properties: Vec<CompiledProperty> = builder
            .properties()
            .iter()
            .map(|def| CompiledProperty {
                id: def.id,
                name: def.name.clone(),
                value_type: def.value_type,
                mandatory: def.is_mandatory(),
                is_list: def.is_list(),
                default: def.default().cloned(),
                proto_id: proto_ids.property[def.id.raw() as usize],
            })
            .collect();

        // Pass 2: node type ids, in declaration order.
        let mut type_names: HashMap<String, TypeId> = HashMap::new();
        for (index, decl) in builder.node_types().iter().enumerate() {
            type_names.insert(decl.name.clone(), TypeId::new(index as u32));
        }

        // Pass 3: flatten inheritance into effective property lists.
        let mut node_types: Vec<CompiledNodeType> = Vec::new();
        for (index, decl) in builder.node_types().iter().enumerate() {
            let id = TypeId::new(index as u32);
            let linearization = resolve::linearize(&decl.name, builder.node_types());
            let effective = resolve::effective_properties(
                &linearization,
                builder.node_types(),
                builder.properties(),
            )?;

            let effective_props: Vec<EffectiveProperty> = effective
                .iter()
                .enumerate()
                .map(|(offset, &prop_id)| {
                    let p = &properties[prop_id.raw() as usize];
                    EffectiveProperty {
                        property: prop_id,
                        name: p.name.clone(),
                        value_type: p.value_type,
                        mandatory: p.mandatory,
                        is_list: p.is_list,
                        default: p.default.clone(),
                        offset,
                        proto_id: p.proto_id,
                    }
                })
                .collect();

            let mut primary_key = Vec::new();
            for &key_prop in &decl.primary_key {
                let offset = effective_props
                    .iter()
                    .position(|p| p.property == key_prop)
                    .ok_or_else(|| SchemaError::PrimaryKeyOutsideType {
                        node_type: decl.name.clone(),
                        property: builder
                            .properties()
                            .get(key_prop)
                            .map(|p| p.name.clone())
                            .unwrap_or_else(|| key_prop.to_string()),
                    })?;
                primary_key.push(offset);
            }

            let ancestors = linearization
                .iter()
                .skip(1)
                .map(|name| type_names[*name])
                .collect();

            node_types.push(CompiledNodeType {
                id,
                name: decl.name.clone(),
                alias: decl.alias.clone(),
                is_base: decl.is_base,
                proto_id: proto_ids.node_type[index],
                properties: effective_props,
                primary_key,
                ancestors,
            });
        }

        // Aliases are secondary lookup keys and must not shadow a name.
        for node_type in &node_types {
            if let Some(alias) = &node_type.alias {
                if type_names.contains_key(alias) {
                    return Err(SchemaError::DuplicateNodeType(alias.clone()));
                }
                type_names.insert(alias.clone(), node_type.id);
            }
        }

        // Pass 4: edge type ids, in declaration order.
        let mut edge_type_names: HashMap<String, EdgeTypeId> = HashMap::new();
        let mut edge_types: Vec<CompiledEdgeType> = Vec::new();
        for (index, decl) in builder.edge_types().iter().enumerate() {
            let id = EdgeTypeId::new(index as u32);
            edge_type_names.insert(decl.name.clone(), id);
            edge_types.push(CompiledEdgeType {
                id,
                name: decl.name.clone(),
                proto_id: proto_ids.edge_type[index],
            });
        }

        // Pass 5: resolve edge rules and expand the adjacency table.
        // A rule declared against a base type applies to every subtype on
        // both endpoints; the expansion keeps the declared rule index so the
        // validator can count per rule class.
        let subtype_map = resolve::descendants(builder.node_types());
        let mut rules: Vec<CompiledEdgeRule> = Vec::new();
        let mut adjacency: BTreeMap<AdjacencyKey, BTreeMap<TypeId, PermittedRule>> =
            BTreeMap::new();

        for (index, rule) in builder.edge_types().rules().iter().enumerate() {
            let edge_type = *edge_type_names
                .get(&rule.edge_type)
                .ok_or_else(|| SchemaError::UnknownEdgeType(rule.edge_type.clone()))?;
            let resolve_endpoint = |name: &str| -> SchemaResult<TypeId> {
                type_names
                    .get(name)
                    .copied()
                    .ok_or_else(|| SchemaError::UnknownEdgeEndpointType {
                        edge_type: rule.edge_type.clone(),
                        endpoint: name.to_string(),
                    })
            };
            let source = resolve_endpoint(&rule.source)?;
            let target = resolve_endpoint(&rule.target)?;

            let expand = |name: &str, id: TypeId| -> Vec<TypeId> {
                let mut ids = vec![id];
                if let Some(descendants) = subtype_map.get(name) {
                    ids.extend(descendants.iter().map(|d| type_names[d.as_str()]));
                }
                ids
            };
            let sources = expand(&rule.source, source);
            let targets = expand(&rule.target, target);

            for &s in &sources {
                let entry = adjacency.entry((s, edge_type, Direction::Out)).or_default();
                for &t in &targets {
                    reconcile(
                        entry,
                        t,
                        PermittedRule {
                            cardinality: rule.cardinality_out,
                            rule: index as u32,
                        },
                    );
                }
            }
            for &t in &targets {
                let entry = adjacency.entry((t, edge_type, Direction::In)).or_default();
                for &s in &sources {
                    reconcile(
                        entry,
                        s,
                        PermittedRule {
                            cardinality: rule.cardinality_in,
                            rule: index as u32,
                        },
                    );
                }
            }

            rules.push(CompiledEdgeRule {
                edge_type,
                source,
                target,
                cardinality_out: rule.cardinality_out,
                cardinality_in: rule.cardinality_in,
                step_label_out: rule.step_label_out.clone(),
                step_label_in: rule.step_label_in.clone(),
            });
        }

        debug!(
            node_types = node_types.len(),
            edge_types = edge_types.len(),
            properties = properties.len(),
            adjacency_entries = adjacency.len(),
            "schema compiled"
        );

        builder.freeze();
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
}

/// Reconcile overlapping rules for the same expanded triple: the most
/// restrictive cardinality wins; on a tie the earlier declaration stays.
/// The losing rule's class loses this counterpart, so edges toward it are
/// counted (and bounded) under the winning rule's class.
fn reconcile(
    map: &mut BTreeMap<TypeId, PermittedRule>,
    counterpart: TypeId,
    incoming: PermittedRule,
) {
    map.entry(counterpart)
        .and_modify(|existing| {
            if incoming.cardinality.rank() > existing.cardinality.rank() {
                *existing = incoming;
            }
        })
        .or_insert(incoming);
}

/// Resolved protocol ids per namespace, indexed by declaration order.
struct ProtoIds {
    property: Vec<ProtoId>,
    node_type: Vec<ProtoId>,
    edge_type: Vec<ProtoId>,
}

/// Validate explicit protocol ids and derive the missing ones.
///
/// Explicit ids must be unique across properties, node types, and edge types
/// together. Elements without one receive the smallest unassigned id in
/// declaration-order scan, so identical declaration sequences always yield
/// identical assignments.
fn assign_proto_ids(builder: &SchemaBuilder) -> SchemaResult<ProtoIds> {
    let explicit: Vec<Option<ProtoId>> = builder
        .properties()
        .iter()
        .map(|p| p.proto_id)
        .chain(builder.node_types().iter().map(|t| t.proto_id))
        .chain(builder.edge_types().iter().map(|e| e.proto_id))
        .collect();

    let mut used: HashSet<u32> = HashSet::new();
    for proto in explicit.iter().flatten() {
        if !used.insert(proto.raw()) {
            return Err(SchemaError::DuplicateProtoId(*proto));
        }
    }

    let mut candidate = 1u32;
    let mut resolved: Vec<ProtoId> = Vec::with_capacity(explicit.len());
    for slot in &explicit {
        let proto = match slot {
            Some(p) => *p,
            None => {
                while used.contains(&candidate) {
                    candidate += 1;
                }
                used.insert(candidate);
                ProtoId::new(candidate)
            }
        };
        resolved.push(proto);
    }

    let n_props = builder.properties().len();
    let n_types = builder.node_types().len();
    Ok(ProtoIds {
        property: resolved[..n_props].to_vec(),
        node_type: resolved[n_props..n_props + n_types].to_vec(),
        edge_type: resolved[n_props + n_types..].to_vec(),
    })
}
