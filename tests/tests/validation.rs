//! Property and primary key validation scenarios.

use cpg_tests::prelude::*;

fn literal_pk_schema() -> CompiledSchema {
    let mut b = SchemaBuilder::new();
    let code = b.property("CODE", ValueType::String).mandatory("").done().unwrap();
    b.node_type("LITERAL")
        .properties(&[code])
        .primary_key(&[code])
        .done()
        .unwrap();
    SchemaCompiler::compile(&mut b).unwrap()
}

#[test]
fn distinct_primary_keys_are_clean() {
    let schema = literal_pk_schema();
    let literal = schema.type_id("LITERAL").unwrap();

    let mut graph = Graph::new();
    graph.add_node_auto(literal, cpg_tests::props(&[("CODE", Value::from("1"))]));
    graph.add_node_auto(literal, cpg_tests::props(&[("CODE", Value::from("2"))]));

    assert!(Validator::new(&schema).validate(&graph).is_empty());
}

#[test]
fn duplicate_primary_keys_collide_once() {
    let schema = literal_pk_schema();
    let literal = schema.type_id("LITERAL").unwrap();

    let mut graph = Graph::new();
    let a = graph.add_node_auto(literal, cpg_tests::props(&[("CODE", Value::from("1"))]));
    let b = graph.add_node_auto(literal, cpg_tests::props(&[("CODE", Value::from("1"))]));

    let violations = Validator::new(&schema).validate(&graph);
    assert_eq!(violations.len(), 1);
    match &violations.all()[0] {
        Violation::PrimaryKeyCollision { node_type, key, nodes } => {
            assert_eq!(node_type, "LITERAL");
            assert_eq!(key, "1");
            assert_eq!(nodes, &vec![a, b]);
        }
        other => panic!("expected a primary key collision, got {other}"),
    }
}

#[test]
fn key_collisions_are_scoped_to_the_concrete_type() {
    let mut b = SchemaBuilder::new();
    let name = b.property("NAME", ValueType::String).mandatory("").done().unwrap();
    b.node_type("LOCAL")
        .properties(&[name])
        .primary_key(&[name])
        .done()
        .unwrap();
    b.node_type("MEMBER")
        .properties(&[name])
        .primary_key(&[name])
        .done()
        .unwrap();
    let schema = SchemaCompiler::compile(&mut b).unwrap();

    // Same key value on two different concrete types does not collide.
    let mut graph = Graph::new();
    graph.add_node_auto(
        schema.type_id("LOCAL").unwrap(),
        cpg_tests::props(&[("NAME", Value::from("x"))]),
    );
    graph.add_node_auto(
        schema.type_id("MEMBER").unwrap(),
        cpg_tests::props(&[("NAME", Value::from("x"))]),
    );
    assert!(Validator::new(&schema).validate(&graph).is_empty());
}

#[test]
fn missing_mandatory_property_is_reported() {
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();

    let mut graph = Graph::new();
    // LITERAL inherits mandatory CODE from EXPRESSION; leave it off.
    let node = graph.add_node_auto(schema.type_id("LITERAL").unwrap(), cpg_tests::props(&[]));

    let violations = Validator::new(&schema).validate(&graph);
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        &violations.all()[0],
        Violation::MissingMandatoryProperty { node: n, property, .. }
            if *n == node && property == "CODE"
    ));
}

#[test]
fn wrong_property_type_is_reported() {
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();

    let mut graph = Graph::new();
    let node = graph.add_node_auto(
        schema.type_id("LITERAL").unwrap(),
        cpg_tests::props(&[
            ("CODE", Value::from("42")),
            ("ORDER", Value::from("first")), // declared Int
        ]),
    );

    let violations = Validator::new(&schema).validate(&graph);
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        &violations.all()[0],
        Violation::WrongPropertyType { node: n, property, expected, actual }
            if *n == node && property == "ORDER" && expected == "Int" && actual == "String"
    ));
}

#[test]
fn undeclared_properties_are_ignored() {
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();

    let mut graph = Graph::new();
    graph.add_node_auto(
        schema.type_id("LITERAL").unwrap(),
        cpg_tests::props(&[
            ("CODE", Value::from("42")),
            ("COLUMN_NUMBER", Value::from(7i64)),
        ]),
    );

    assert!(Validator::new(&schema).validate(&graph).is_empty());
}

#[test]
fn violation_limit_caps_the_report() {
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();
    let literal = schema.type_id("LITERAL").unwrap();

    let mut graph = Graph::new();
    for _ in 0..10 {
        graph.add_node_auto(literal, cpg_tests::props(&[]));
    }

    let violations = Validator::new(&schema).with_limit(4).validate(&graph);
    assert_eq!(violations.len(), 4);
}

#[test]
fn disallowed_edge_endpoint_is_reported() {
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();
    let ast = schema.edge_type_id("AST").unwrap();

    let mut graph = Graph::new();
    let block = graph.add_node_auto(
        schema.type_id("BLOCK").unwrap(),
        cpg_tests::props(&[("CODE", Value::from("{}"))]),
    );
    let local = graph.add_node_auto(
        schema.type_id("LOCAL").unwrap(),
        cpg_tests::props(&[("NAME", Value::from("x"))]),
    );
    // No rule admits BLOCK -AST-> LOCAL.
    let edge = graph.add_edge_auto(ast, block, local).unwrap();

    let violations = Validator::new(&schema).validate(&graph);
    let endpoint = violations.iter().find_map(|v| match v {
        Violation::DisallowedEdgeEndpoint { edge: e, source_type, target_type, .. } => {
            Some((*e, source_type.clone(), target_type.clone()))
        }
        _ => None,
    });
    assert_eq!(
        endpoint,
        Some((edge, "BLOCK".to_string(), "LOCAL".to_string()))
    );
}
