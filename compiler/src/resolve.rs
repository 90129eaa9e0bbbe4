//! Inheritance resolution: cycle detection, linearization, and effective
//! property flattening over the extends DAG.

use cpg_registry::{NodeTypeRegistry, PropertyRegistry, SchemaError, SchemaResult};
use cpg_core::PropertyId;
use std::collections::HashMap;
use std::collections::VecDeque;
use tracing::trace;

/// Verify that every extends reference names a declared type.
pub(crate) fn check_bases(node_types: &NodeTypeRegistry) -> SchemaResult<()> {
    for decl in node_types.iter() {
        for parent in &decl.extends {
            if !node_types.contains(parent) {
                return Err(SchemaError::UnknownBaseType {
                    node_type: decl.name.clone(),
                    base: parent.clone(),
                });
            }
        }
    }
    Ok(())
}

/// DFS color marks.
#[derive(Clone, Copy, PartialEq)]
enum Mark {
    White,
    Gray,
    Black,
}

/// Reject any cycle in the extends graph, self-loops included.
///
/// Iterative three-color DFS so deep hierarchies cannot overflow the stack.
pub(crate) fn check_cycles(node_types: &NodeTypeRegistry) -> SchemaResult<()> {
    let mut marks: HashMap<&str, Mark> =
        node_types.iter().map(|d| (d.name.as_str(), Mark::White)).collect();

    for root in node_types.iter() {
        if marks[root.name.as_str()] != Mark::White {
            continue;
        }
        // Stack entries: (type name, next parent index to visit).
        let mut stack: Vec<(&str, usize)> = vec![(root.name.as_str(), 0)];
        marks.insert(root.name.as_str(), Mark::Gray);

        while let Some((name, next)) = stack.pop() {
            let decl = node_types
                .get(name)
                .expect("cycle check visits declared types only");
            if next < decl.extends.len() {
                stack.push((name, next + 1));
                let parent = decl.extends[next].as_str();
                match marks[parent] {
                    Mark::Gray => {
                        return Err(SchemaError::CyclicInheritance(parent.to_string()));
                    }
                    Mark::White => {
                        marks.insert(parent, Mark::Gray);
                        stack.push((parent, 0));
                    }
                    Mark::Black => {}
                }
            } else {
                marks.insert(name, Mark::Black);
            }
        }
    }
    Ok(())
}

/// Topologically flatten the inheritance DAG of one type.
///
/// Breadth-first from the type itself: self first, then direct parents in
/// declaration order, then their parents, deduplicated keeping the nearest
/// occurrence. This is the ancestor precedence order used for property
/// flattening and error messages.
pub(crate) fn linearize<'a>(name: &'a str, node_types: &'a NodeTypeRegistry) -> Vec<&'a str> {
    let mut order: Vec<&str> = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(name);

    while let Some(current) = queue.pop_front() {
        if order.contains(&current) {
            continue;
        }
        order.push(current);
        if let Some(decl) = node_types.get(current) {
            for parent in &decl.extends {
                queue.push_back(parent.as_str());
            }
        }
    }

    trace!(node_type = name, ancestors = order.len() - 1, "linearized");
    order
}

/// Flatten the effective property set of one type: the deduplicated union of
/// its own properties and those of all transitive ancestors, in
/// linearization order.
///
/// Two contributions of the same property name that resolve to differing
/// definitions (possible only when declarations from different builder
/// sessions are mixed) abort with `PropertyConflict`.
pub(crate) fn effective_properties(
    linearization: &[&str],
    node_types: &NodeTypeRegistry,
    properties: &PropertyRegistry,
) -> SchemaResult<Vec<PropertyId>> {
    let node_type = linearization.first().copied().unwrap_or_default();
    let mut result: Vec<PropertyId> = Vec::new();
    let mut seen: HashMap<String, PropertyId> = HashMap::new();

    for &type_name in linearization {
        let decl = node_types.get(type_name).ok_or_else(|| {
            SchemaError::UnknownBaseType {
                node_type: node_type.to_string(),
                base: type_name.to_string(),
            }
        })?;
        for &prop_id in &decl.properties {
            let def = properties
                .get(prop_id)
                .ok_or_else(|| SchemaError::UnknownProperty {
                    node_type: type_name.to_string(),
                })?;
            match seen.get(&def.name) {
                None => {
                    seen.insert(def.name.clone(), prop_id);
                    result.push(prop_id);
                }
                Some(&first) if first == prop_id => {}
                Some(_) => {
                    return Err(SchemaError::PropertyConflict {
                        node_type: node_type.to_string(),
                        property: def.name.clone(),
                    });
                }
            }
        }
    }
    Ok(result)
}

/// Transitive descendants of every type, children in declaration order.
pub(crate) fn descendants(node_types: &NodeTypeRegistry) -> HashMap<String, Vec<String>> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for decl in node_types.iter() {
        for parent in &decl.extends {
            children.entry(parent.as_str()).or_default().push(&decl.name);
        }
    }

    let mut result: HashMap<String, Vec<String>> = HashMap::new();
    for decl in node_types.iter() {
        let mut collected: Vec<&str> = Vec::new();
        let mut stack: Vec<&str> = children
            .get(decl.name.as_str())
            .map(|c| c.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            if collected.contains(&current) {
                continue;
            }
            collected.push(current);
            if let Some(grandchildren) = children.get(current) {
                for &g in grandchildren.iter().rev() {
                    stack.push(g);
                }
            }
        }
        result.insert(
            decl.name.clone(),
            collected.into_iter().map(String::from).collect(),
        );
    }
    result
}
