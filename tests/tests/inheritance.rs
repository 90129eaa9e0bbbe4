//! Inheritance resolution scenarios: diamonds, precedence, cycles.

use cpg_tests::prelude::*;

#[test]
fn diamond_effective_set_is_deduplicated_union() {
    // GIVEN METHOD extending AST_NODE directly and via DECLARATION
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();

    // THEN its effective set carries ORDER exactly once
    let method = schema.node_type_by_name("METHOD").unwrap();
    let names: Vec<&str> = method.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["ORDER", "NAME"]);
    let order_slots = names.iter().filter(|n| **n == "ORDER").count();
    assert_eq!(order_slots, 1);
}

#[test]
fn effective_set_is_union_regardless_of_parent_order() {
    let build = |parents: &[&str]| {
        let mut b = SchemaBuilder::new();
        let code = b.property("CODE", ValueType::String).mandatory("").done().unwrap();
        let name = b.property("NAME", ValueType::String).optional().done().unwrap();
        b.base_type("A").properties(&[code]).done().unwrap();
        b.base_type("B").properties(&[name]).done().unwrap();
        b.node_type("C").extendz(parents).done().unwrap();
        let schema = SchemaCompiler::compile(&mut b).unwrap();
        let mut names: Vec<String> = schema
            .node_type_by_name("C")
            .unwrap()
            .properties
            .iter()
            .map(|p| p.name.clone())
            .collect();
        names.sort();
        names
    };

    // Precedence order differs, the union does not.
    assert_eq!(build(&["A", "B"]), build(&["B", "A"]));
}

#[test]
fn inherited_properties_keep_nearest_first_offsets() {
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();

    let literal = schema.node_type_by_name("LITERAL").unwrap();
    let slots: Vec<(&str, usize)> = literal
        .properties
        .iter()
        .map(|p| (p.name.as_str(), p.offset))
        .collect();
    // Own property first, then EXPRESSION's, then AST_NODE's.
    assert_eq!(
        slots,
        vec![("TYPE_FULL_NAME", 0), ("CODE", 1), ("ORDER", 2)]
    );
}

#[test]
fn self_loop_fails_compilation() {
    let mut builder = SchemaBuilder::new();
    builder.node_type("A").done().unwrap();
    builder.extendz("A", &["A"]).unwrap();

    let result = SchemaCompiler::compile(&mut builder);
    assert!(matches!(result, Err(SchemaError::CyclicInheritance(_))));
}

#[test]
fn cycles_of_any_length_fail_compilation() {
    for length in 2..=6u32 {
        let mut builder = SchemaBuilder::new();
        for i in 0..length {
            builder.node_type(format!("T{i}")).done().unwrap();
        }
        for i in 0..length {
            let parent = format!("T{}", (i + 1) % length);
            builder.extendz(&format!("T{i}"), &[parent.as_str()]).unwrap();
        }

        let result = SchemaCompiler::compile(&mut builder);
        assert!(
            matches!(result, Err(SchemaError::CyclicInheritance(_))),
            "cycle of length {length} not detected"
        );
    }
}

#[test]
fn ancestors_are_exposed_nearest_first() {
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();

    let literal = schema.node_type_by_name("LITERAL").unwrap();
    let ancestor_names: Vec<&str> = literal
        .ancestors
        .iter()
        .map(|&id| schema.type_name(id).unwrap())
        .collect();
    assert_eq!(ancestor_names, vec!["EXPRESSION", "AST_NODE"]);
}
