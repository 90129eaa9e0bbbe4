//! Post-compilation immutability of the declaration surface.

use cpg_tests::prelude::*;

#[test]
fn compilation_freezes_the_builder() {
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();
    assert!(builder.is_frozen());

    // The compiled artifact is unaffected by the frozen declarations.
    assert!(schema.type_id("LITERAL").is_some());
}

#[test]
fn every_mutator_fails_after_freeze() {
    let mut builder = cpg_tests::ast_schema();
    let order = builder.properties().get_by_name("ORDER").map(|p| p.id).unwrap();
    SchemaCompiler::compile(&mut builder).unwrap();

    assert!(matches!(
        builder.property("LINE_NUMBER", ValueType::Int).optional().done(),
        Err(SchemaError::SchemaFrozen)
    ));
    assert!(matches!(
        builder.node_type("ANNOTATION").done(),
        Err(SchemaError::SchemaFrozen)
    ));
    assert!(matches!(
        builder.base_type("CFG_NODE").done(),
        Err(SchemaError::SchemaFrozen)
    ));
    assert!(matches!(
        builder.edge_type("DOMINATE").done(),
        Err(SchemaError::SchemaFrozen)
    ));
    assert!(matches!(
        builder.out_edge("AST", "METHOD", "LITERAL").done(),
        Err(SchemaError::SchemaFrozen)
    ));
    assert!(matches!(
        builder.extendz("LITERAL", &["DECLARATION"]),
        Err(SchemaError::SchemaFrozen)
    ));
    assert!(matches!(
        builder.add_properties("BLOCK", &[order]),
        Err(SchemaError::SchemaFrozen)
    ));
}

#[test]
fn recompiling_a_frozen_builder_fails() {
    let mut builder = cpg_tests::ast_schema();
    SchemaCompiler::compile(&mut builder).unwrap();

    assert!(matches!(
        SchemaCompiler::compile(&mut builder),
        Err(SchemaError::SchemaFrozen)
    ));
}

#[test]
fn cumulative_declarations_work_before_freeze() {
    let mut builder = cpg_tests::ast_schema();
    let order = builder.properties().get_by_name("ORDER").map(|p| p.id).unwrap();

    // BLOCK picks up ORDER directly; redundant since it already inherits
    // it, so the effective set must not grow. The direct declaration is
    // nearer than AST_NODE's, so ORDER moves ahead of CODE.
    builder.add_properties("BLOCK", &[order]).unwrap();

    let schema = SchemaCompiler::compile(&mut builder).unwrap();
    let block = schema.node_type(schema.type_id("BLOCK").unwrap()).unwrap();
    let names: Vec<&str> = block.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["ORDER", "CODE"]);
}
