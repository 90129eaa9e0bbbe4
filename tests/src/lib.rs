//! Shared fixtures for integration tests.
//!
//! The fixture schema is a cut-down code property graph: an abstract
//! AST_NODE root, an EXPRESSION layer, and the handful of concrete types
//! the scenarios exercise.

pub mod prelude {
    pub use cpg_compiler::{CompiledSchema, SchemaCompiler};
    pub use cpg_core::{
        Cardinality, Direction, EdgeId, EdgeTypeId, NodeId, PropertyId, TypeId, Value, ValueType,
    };
    pub use cpg_graph::Graph;
    pub use cpg_registry::{SchemaBuilder, SchemaError};
    pub use cpg_validator::{Validator, Violation, Violations};

    pub use crate::{ast_schema, props};
}

use cpg_core::Value;
use cpg_registry::SchemaBuilder;
use std::collections::HashMap;

/// Build the fixture declarations: properties, the inheritance hierarchy,
/// and the AST edge rules. Callers compile it themselves so failing
/// scenarios can mutate the builder first.
pub fn ast_schema() -> SchemaBuilder {
    let mut b = SchemaBuilder::new();

    let code = b
        .property("CODE", cpg_core::ValueType::String)
        .mandatory("")
        .done()
        .unwrap();
    let name = b
        .property("NAME", cpg_core::ValueType::String)
        .mandatory("")
        .done()
        .unwrap();
    let order = b
        .property("ORDER", cpg_core::ValueType::Int)
        .optional()
        .done()
        .unwrap();
    let type_full_name = b
        .property("TYPE_FULL_NAME", cpg_core::ValueType::String)
        .optional()
        .done()
        .unwrap();

    b.base_type("AST_NODE").properties(&[order]).done().unwrap();
    b.base_type("EXPRESSION")
        .extendz(&["AST_NODE"])
        .properties(&[code])
        .done()
        .unwrap();
    b.base_type("DECLARATION")
        .extendz(&["AST_NODE"])
        .properties(&[name])
        .done()
        .unwrap();

    b.node_type("LITERAL")
        .extendz(&["EXPRESSION"])
        .properties(&[type_full_name])
        .done()
        .unwrap();
    b.node_type("BLOCK").extendz(&["EXPRESSION"]).done().unwrap();
    b.node_type("CONTROL_STRUCTURE")
        .extendz(&["EXPRESSION"])
        .done()
        .unwrap();
    b.node_type("LOCAL")
        .extendz(&["DECLARATION"])
        .properties(&[type_full_name])
        .done()
        .unwrap();
    b.node_type("METHOD")
        .extendz(&["AST_NODE", "DECLARATION"])
        .done()
        .unwrap();

    b.edge_type("AST")
        .doc("Syntax tree child relation")
        .done()
        .unwrap();
    b.edge_type("CFG").doc("Control flow").done().unwrap();

    b.out_edge("AST", "METHOD", "BLOCK").done().unwrap();
    b.out_edge("AST", "BLOCK", "EXPRESSION").done().unwrap();
    b.out_edge("CFG", "EXPRESSION", "EXPRESSION").done().unwrap();

    b
}

/// Build a property map from name/value pairs.
pub fn props(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
