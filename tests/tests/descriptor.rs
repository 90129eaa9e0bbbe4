//! Descriptor serialization across a compiled fixture schema.

use cpg_tests::prelude::*;

#[test]
fn round_trip_preserves_the_schema() {
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();

    let json = schema.to_json().unwrap();
    let restored = CompiledSchema::from_json(&json).unwrap();

    assert_eq!(schema, restored);
}

#[test]
fn restored_schema_answers_lookups() {
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();
    let restored = CompiledSchema::from_json(&schema.to_json().unwrap()).unwrap();

    let literal = restored.type_id("LITERAL").unwrap();
    assert_eq!(restored.type_id("LITERAL"), schema.type_id("LITERAL"));

    let names: Vec<&str> = restored
        .node_type(literal)
        .unwrap()
        .properties
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, ["TYPE_FULL_NAME", "CODE", "ORDER"]);

    let ast = restored.edge_type_id("AST").unwrap();
    let block = restored.type_id("BLOCK").unwrap();
    assert!(restored.edge_allowed(block, ast, literal));
    assert_eq!(restored.adjacency(), schema.adjacency());
}

#[test]
fn identical_declarations_serialize_identically() {
    let mut first = cpg_tests::ast_schema();
    let mut second = cpg_tests::ast_schema();

    let a = SchemaCompiler::compile(&mut first).unwrap().to_json().unwrap();
    let b = SchemaCompiler::compile(&mut second).unwrap().to_json().unwrap();

    assert_eq!(a, b);
}

#[test]
fn future_format_versions_are_rejected() {
    let mut builder = cpg_tests::ast_schema();
    let schema = SchemaCompiler::compile(&mut builder).unwrap();

    let mut descriptor = schema.to_descriptor();
    descriptor.format_version = 2;
    let err = CompiledSchema::from_descriptor(&descriptor).unwrap_err();
    assert!(matches!(
        err,
        cpg_compiler::DescriptorError::UnsupportedVersion { found: 2, supported: 1 }
    ));
}
