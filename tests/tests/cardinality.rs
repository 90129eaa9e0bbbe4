//! Edge rule and cardinality scenarios.

use cpg_tests::prelude::*;

/// BLOCK -AST-> LOCAL with an exactly-one bound at the LOCAL endpoint.
fn one_local_schema() -> CompiledSchema {
    let mut b = SchemaBuilder::new();
    let code = b.property("CODE", ValueType::String).mandatory("").done().unwrap();
    b.node_type("BLOCK").properties(&[code]).done().unwrap();
    b.node_type("LOCAL").properties(&[code]).done().unwrap();
    b.edge_type("AST").done().unwrap();
    b.out_edge("AST", "BLOCK", "LOCAL")
        .cardinality_in(Cardinality::One)
        .done()
        .unwrap();
    SchemaCompiler::compile(&mut b).unwrap()
}

fn block_and_local(schema: &CompiledSchema) -> (Graph, NodeId, NodeId) {
    let mut graph = Graph::new();
    let block = graph.add_node_auto(
        schema.type_id("BLOCK").unwrap(),
        cpg_tests::props(&[("CODE", Value::from("{}"))]),
    );
    let local = graph.add_node_auto(
        schema.type_id("LOCAL").unwrap(),
        cpg_tests::props(&[("CODE", Value::from("int x"))]),
    );
    (graph, block, local)
}

#[test]
fn exactly_one_bound_rejects_zero_edges() {
    let schema = one_local_schema();
    let (graph, _, local) = block_and_local(&schema);

    let violations = Validator::new(&schema).validate(&graph);
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        violations.all()[0],
        Violation::CardinalityViolation {
            node,
            direction: Direction::In,
            expected: Cardinality::One,
            actual: 0,
            ..
        } if node == local
    ));
}

#[test]
fn exactly_one_bound_rejects_two_edges() {
    let schema = one_local_schema();
    let (mut graph, block, local) = block_and_local(&schema);
    let ast = schema.edge_type_id("AST").unwrap();
    graph.add_edge_auto(ast, block, local).unwrap();
    graph.add_edge_auto(ast, block, local).unwrap();

    let violations = Validator::new(&schema).validate(&graph);
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        violations.all()[0],
        Violation::CardinalityViolation { actual: 2, .. }
    ));
}

#[test]
fn exactly_one_bound_accepts_one_edge() {
    let schema = one_local_schema();
    let (mut graph, block, local) = block_and_local(&schema);
    let ast = schema.edge_type_id("AST").unwrap();
    graph.add_edge_auto(ast, block, local).unwrap();

    let violations = Validator::new(&schema).validate(&graph);
    assert!(violations.is_empty());
}

/// CONTROL_STRUCTURE -AST-> BLOCK with an at-most-one bound at the BLOCK
/// endpoint. The bound applies per target, not per source.
fn zero_or_one_block_schema() -> CompiledSchema {
    let mut b = SchemaBuilder::new();
    let code = b.property("CODE", ValueType::String).mandatory("").done().unwrap();
    b.node_type("CONTROL_STRUCTURE").properties(&[code]).done().unwrap();
    b.node_type("BLOCK").properties(&[code]).done().unwrap();
    b.edge_type("AST").done().unwrap();
    b.out_edge("AST", "CONTROL_STRUCTURE", "BLOCK")
        .cardinality_in(Cardinality::ZeroOrOne)
        .done()
        .unwrap();
    SchemaCompiler::compile(&mut b).unwrap()
}

#[test]
fn at_most_one_bound_is_per_target() {
    let schema = zero_or_one_block_schema();
    let ast = schema.edge_type_id("AST").unwrap();
    let cs_type = schema.type_id("CONTROL_STRUCTURE").unwrap();
    let block_type = schema.type_id("BLOCK").unwrap();
    let code = |s: &str| cpg_tests::props(&[("CODE", Value::from(s))]);

    // Two edges to two distinct BLOCK targets: clean.
    let mut graph = Graph::new();
    let cs = graph.add_node_auto(cs_type, code("if (x)"));
    let then_block = graph.add_node_auto(block_type, code("{ a }"));
    let else_block = graph.add_node_auto(block_type, code("{ b }"));
    graph.add_edge_auto(ast, cs, then_block).unwrap();
    graph.add_edge_auto(ast, cs, else_block).unwrap();
    assert!(Validator::new(&schema).validate(&graph).is_empty());

    // Two edges to the same BLOCK target: one violation on that target.
    let mut graph = Graph::new();
    let cs = graph.add_node_auto(cs_type, code("if (x)"));
    let block = graph.add_node_auto(block_type, code("{ a }"));
    graph.add_edge_auto(ast, cs, block).unwrap();
    graph.add_edge_auto(ast, cs, block).unwrap();

    let violations = Validator::new(&schema).validate(&graph);
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        violations.all()[0],
        Violation::CardinalityViolation {
            node,
            direction: Direction::In,
            expected: Cardinality::ZeroOrOne,
            actual: 2,
            ..
        } if node == block
    ));
}

#[test]
fn rules_inherited_from_base_types_admit_subtypes() {
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();
    let ast = schema.edge_type_id("AST").unwrap();

    // BLOCK -AST-> EXPRESSION was declared against the base; LITERAL and
    // CONTROL_STRUCTURE are admitted as subtypes of EXPRESSION.
    let block = schema.type_id("BLOCK").unwrap();
    assert!(schema.edge_allowed(block, ast, schema.type_id("LITERAL").unwrap()));
    assert!(schema.edge_allowed(block, ast, schema.type_id("CONTROL_STRUCTURE").unwrap()));
    // But not LOCAL, which sits outside the EXPRESSION hierarchy.
    assert!(!schema.edge_allowed(block, ast, schema.type_id("LOCAL").unwrap()));
}

#[test]
fn overlapping_rules_resolve_to_most_restrictive() {
    let mut b = SchemaBuilder::new();
    b.node_type("A").done().unwrap();
    b.node_type("B").done().unwrap();
    b.edge_type("REF").done().unwrap();
    b.out_edge("REF", "A", "B")
        .cardinality_out(Cardinality::ZeroOrOne)
        .done()
        .unwrap();
    b.out_edge("REF", "A", "B")
        .cardinality_out(Cardinality::List)
        .done()
        .unwrap();
    let schema = SchemaCompiler::compile(&mut b).unwrap();

    let a = schema.type_id("A").unwrap();
    let b_id = schema.type_id("B").unwrap();
    let r = schema.edge_type_id("REF").unwrap();
    let targets = schema.permitted(a, r, Direction::Out).unwrap();
    assert_eq!(targets[&b_id].cardinality, Cardinality::ZeroOrOne);
}
