//! Property declarations.

use crate::{SchemaError, SchemaResult};
use cpg_core::{PropertyId, ProtoId, Value, ValueType};
use indexmap::IndexMap;

/// How a property is carried on an instance.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// Scalar that must be present on every instance. The default is a
    /// read-side substitute for consumers, not permission to omit.
    Mandatory { default: Value },
    /// Scalar that may be absent.
    Optional,
    /// Ordered, possibly empty sequence of scalars.
    List,
}

/// A registered property definition.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    /// Unique identifier within the session.
    pub id: PropertyId,
    /// Registry-wide unique name.
    pub name: String,
    /// Scalar kind of the value (element kind for lists).
    pub value_type: ValueType,
    /// Mandatory / optional / list.
    pub kind: PropertyKind,
    /// Explicit protocol id, if any.
    pub proto_id: Option<ProtoId>,
}

impl PropertyDef {
    /// Whether this property holds an ordered list.
    pub fn is_list(&self) -> bool {
        matches!(self.kind, PropertyKind::List)
    }

    /// Whether this property must be present on instances.
    pub fn is_mandatory(&self) -> bool {
        matches!(self.kind, PropertyKind::Mandatory { .. })
    }

    /// The default value carried by a mandatory property.
    pub fn default(&self) -> Option<&Value> {
        match &self.kind {
            PropertyKind::Mandatory { default } => Some(default),
            _ => None,
        }
    }

    /// Definitions are compatible when everything except the session-local
    /// id matches; re-registration of a compatible definition is idempotent.
    fn compatible(&self, other: &NewProperty) -> bool {
        self.name == other.name
            && self.value_type == other.value_type
            && self.kind == other.kind
            && self.proto_id == other.proto_id
    }
}

/// The parts of a property definition before an id is assigned.
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub name: String,
    pub value_type: ValueType,
    pub kind: PropertyKind,
    pub proto_id: Option<ProtoId>,
}

/// Registry of declared properties, iterated in declaration order.
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    defs: IndexMap<String, PropertyDef>,
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a property.
    ///
    /// Re-registering an identical definition returns the existing id;
    /// an incompatible redefinition fails with `DuplicateProperty`.
    pub fn register(&mut self, new: NewProperty) -> SchemaResult<PropertyId> {
        if let Some(existing) = self.defs.get(&new.name) {
            if existing.compatible(&new) {
                return Ok(existing.id);
            }
            return Err(SchemaError::DuplicateProperty(new.name));
        }

        let id = PropertyId::new(self.defs.len() as u32);
        let def = PropertyDef {
            id,
            name: new.name.clone(),
            value_type: new.value_type,
            kind: new.kind,
            proto_id: new.proto_id,
        };
        self.defs.insert(new.name, def);
        Ok(id)
    }

    /// Look up a property by id.
    pub fn get(&self, id: PropertyId) -> Option<&PropertyDef> {
        self.defs.get_index(id.raw() as usize).map(|(_, def)| def)
    }

    /// Look up a property by name.
    pub fn get_by_name(&self, name: &str) -> Option<&PropertyDef> {
        self.defs.get(name)
    }

    /// Iterate definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyDef> {
        self.defs.values()
    }

    /// Number of registered properties.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether no properties are registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
