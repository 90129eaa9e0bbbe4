//! SchemaBuilder: the fluent declaration facade over the three registries.
//!
//! One builder is one construction session. Declarations accumulate until
//! the compiler resolves them; after a successful compile the builder is
//! frozen and every mutator fails with `SchemaFrozen`.

use crate::{
    EdgeRule, EdgeTypeDecl, EdgeTypeRegistry, NewProperty, NodeTypeDecl, NodeTypeRegistry,
    PropertyKind, PropertyRegistry, SchemaError, SchemaResult,
};
use cpg_core::{Cardinality, PropertyId, ProtoId, Value, ValueType};

/// Mutable builder accumulating schema declarations.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    properties: PropertyRegistry,
    node_types: NodeTypeRegistry,
    edge_types: EdgeTypeRegistry,
    frozen: bool,
}

impl SchemaBuilder {
    /// Create a new builder (a fresh construction session).
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property.
    pub fn property(&mut self, name: impl Into<String>, value_type: ValueType) -> PropertyBuilder<'_> {
        PropertyBuilder {
            builder: self,
            name: name.into(),
            value_type,
            kind: PropertyKind::Optional,
            proto_id: None,
        }
    }

    /// Declare an abstract base type (never instantiated directly).
    pub fn base_type(&mut self, name: impl Into<String>) -> NodeTypeBuilder<'_> {
        NodeTypeBuilder {
            builder: self,
            decl: NodeTypeDecl::new(name, true),
        }
    }

    /// Declare a concrete node type.
    pub fn node_type(&mut self, name: impl Into<String>) -> NodeTypeBuilder<'_> {
        NodeTypeBuilder {
            builder: self,
            decl: NodeTypeDecl::new(name, false),
        }
    }

    /// Add inheritance edges to an already-declared node type.
    /// Multiple calls are cumulative.
    pub fn extendz(&mut self, node_type: &str, parents: &[&str]) -> SchemaResult<()> {
        if self.frozen {
            return Err(SchemaError::SchemaFrozen);
        }
        let decl = self
            .node_types
            .get_mut(node_type)
            .ok_or_else(|| SchemaError::UnknownBaseType {
                node_type: node_type.to_string(),
                base: node_type.to_string(),
            })?;
        for parent in parents {
            decl.add_extends(*parent);
        }
        Ok(())
    }

    /// Attach further own properties to an already-declared node type.
    pub fn add_properties(&mut self, node_type: &str, props: &[PropertyId]) -> SchemaResult<()> {
        if self.frozen {
            return Err(SchemaError::SchemaFrozen);
        }
        let decl = self
            .node_types
            .get_mut(node_type)
            .ok_or_else(|| SchemaError::UnknownBaseType {
                node_type: node_type.to_string(),
                base: node_type.to_string(),
            })?;
        decl.add_properties(props);
        Ok(())
    }

    /// Declare an edge type.
    pub fn edge_type(&mut self, name: impl Into<String>) -> EdgeTypeBuilder<'_> {
        EdgeTypeBuilder {
            builder: self,
            decl: EdgeTypeDecl::new(name),
        }
    }

    /// Declare one permitted (source, target) pair for an edge type.
    /// Both cardinalities default to `List`.
    pub fn out_edge(
        &mut self,
        edge_type: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> EdgeRuleBuilder<'_> {
        EdgeRuleBuilder {
            builder: self,
            rule: EdgeRule {
                edge_type: edge_type.into(),
                source: source.into(),
                target: target.into(),
                cardinality_out: Cardinality::List,
                cardinality_in: Cardinality::List,
                step_label_out: None,
                step_label_in: None,
            },
        }
    }

    /// Mark the session frozen. Called by the compiler after a successful
    /// compile; not intended for direct use.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether the session has been frozen by a compile.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The property registry for this session.
    pub fn properties(&self) -> &PropertyRegistry {
        &self.properties
    }

    /// The node type registry for this session.
    pub fn node_types(&self) -> &NodeTypeRegistry {
        &self.node_types
    }

    /// The edge type registry for this session.
    pub fn edge_types(&self) -> &EdgeTypeRegistry {
        &self.edge_types
    }
}

/// Builder for a property declaration.
pub struct PropertyBuilder<'a> {
    builder: &'a mut SchemaBuilder,
    name: String,
    value_type: ValueType,
    kind: PropertyKind,
    proto_id: Option<ProtoId>,
}

impl<'a> PropertyBuilder<'a> {
    /// Mandatory scalar. The default is recorded for consumers reading the
    /// graph; producers still have to set the value on every instance.
    pub fn mandatory(mut self, default: impl Into<Value>) -> Self {
        self.kind = PropertyKind::Mandatory {
            default: default.into(),
        };
        self
    }

    /// Optional scalar (the default).
    pub fn optional(mut self) -> Self {
        self.kind = PropertyKind::Optional;
        self
    }

    /// Ordered, possibly empty list of scalars.
    pub fn as_list(mut self) -> Self {
        self.kind = PropertyKind::List;
        self
    }

    /// Assign an explicit protocol id.
    pub fn proto_id(mut self, id: u32) -> Self {
        self.proto_id = Some(ProtoId::new(id));
        self
    }

    /// Finish this declaration.
    pub fn done(self) -> SchemaResult<PropertyId> {
        if self.builder.frozen {
            return Err(SchemaError::SchemaFrozen);
        }
        self.builder.properties.register(NewProperty {
            name: self.name,
            value_type: self.value_type,
            kind: self.kind,
            proto_id: self.proto_id,
        })
    }
}

/// Builder for a node type declaration.
pub struct NodeTypeBuilder<'a> {
    builder: &'a mut SchemaBuilder,
    decl: NodeTypeDecl,
}

impl<'a> NodeTypeBuilder<'a> {
    /// Attach documentation.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.decl.doc = doc.into();
        self
    }

    /// Record an alias name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.decl.alias = Some(alias.into());
        self
    }

    /// Add one or more parent types. Multiple calls are cumulative.
    pub fn extendz(mut self, parents: &[&str]) -> Self {
        for parent in parents {
            self.decl.add_extends(*parent);
        }
        self
    }

    /// Attach own properties. Multiple calls are cumulative.
    pub fn properties(mut self, props: &[PropertyId]) -> Self {
        self.decl.add_properties(props);
        self
    }

    /// Record the uniqueness key.
    pub fn primary_key(mut self, props: &[PropertyId]) -> Self {
        for &p in props {
            if !self.decl.primary_key.contains(&p) {
                self.decl.primary_key.push(p);
            }
        }
        self
    }

    /// Assign an explicit protocol id.
    pub fn proto_id(mut self, id: u32) -> Self {
        self.decl.proto_id = Some(ProtoId::new(id));
        self
    }

    /// Finish this declaration.
    pub fn done(self) -> SchemaResult<()> {
        if self.builder.frozen {
            return Err(SchemaError::SchemaFrozen);
        }
        self.builder.node_types.insert(self.decl)
    }
}

/// Builder for an edge type declaration.
pub struct EdgeTypeBuilder<'a> {
    builder: &'a mut SchemaBuilder,
    decl: EdgeTypeDecl,
}

impl<'a> EdgeTypeBuilder<'a> {
    /// Attach documentation.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.decl.doc = doc.into();
        self
    }

    /// Assign an explicit protocol id.
    pub fn proto_id(mut self, id: u32) -> Self {
        self.decl.proto_id = Some(ProtoId::new(id));
        self
    }

    /// Finish this declaration.
    pub fn done(self) -> SchemaResult<()> {
        if self.builder.frozen {
            return Err(SchemaError::SchemaFrozen);
        }
        self.builder.edge_types.insert(self.decl)
    }
}

/// Builder for an edge rule declaration.
pub struct EdgeRuleBuilder<'a> {
    builder: &'a mut SchemaBuilder,
    rule: EdgeRule,
}

impl<'a> EdgeRuleBuilder<'a> {
    /// Bound observed at the source endpoint.
    pub fn cardinality_out(mut self, cardinality: Cardinality) -> Self {
        self.rule.cardinality_out = cardinality;
        self
    }

    /// Bound observed at the target endpoint.
    pub fn cardinality_in(mut self, cardinality: Cardinality) -> Self {
        self.rule.cardinality_in = cardinality;
        self
    }

    /// Named traversal labels for each direction.
    pub fn step_labels(
        mut self,
        out: impl Into<String>,
        r#in: impl Into<String>,
    ) -> Self {
        self.rule.step_label_out = Some(out.into());
        self.rule.step_label_in = Some(r#in.into());
        self
    }

    /// Finish this declaration.
    pub fn done(self) -> SchemaResult<()> {
        if self.builder.frozen {
            return Err(SchemaError::SchemaFrozen);
        }
        self.builder.edge_types.add_rule(self.rule)
    }
}
