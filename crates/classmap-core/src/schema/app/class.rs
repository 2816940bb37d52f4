use super::{ClassMapAttrs, PropertyDef, PropertyId, Relationship};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A class as supplied by a schema definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,

    pub kind: ClassKind<ClassRef>,

    #[serde(default)]
    pub modifier: Modifier,

    /// Direct base classes, in declaration order.
    #[serde(default)]
    pub bases: Vec<ClassRef>,

    #[serde(default)]
    pub properties: Vec<PropertyDef>,

    /// Mapping custom attributes.
    #[serde(default)]
    pub attrs: ClassMapAttrs,
}

/// A class after every class reference was resolved to a [`ClassId`].
#[derive(Debug, Clone)]
pub struct Class {
    /// Uniquely identifies the class. This is the value stored in the
    /// ECClassId column of mapped tables.
    pub id: ClassId,

    pub schema: super::SchemaId,

    pub name: String,

    pub kind: ClassKind<ClassId>,

    pub modifier: Modifier,

    pub bases: Vec<ClassId>,

    /// Properties declared by this class. Inherited properties are not
    /// included; see [`super::Schema::properties`].
    pub properties: Vec<super::Property>,

    pub attrs: ClassMapAttrs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassKind<C> {
    Entity,
    Mixin,
    Struct,
    CustomAttribute,
    Relationship(Relationship<C>),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    #[default]
    None,
    Abstract,
    Sealed,
}

/// Reference to a class by name, optionally qualified by schema name.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ClassRef {
    pub schema: Option<String>,
    pub name: String,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct ClassId(pub i64);

impl ClassDef {
    pub fn new(name: impl Into<String>, kind: ClassKind<ClassRef>) -> ClassDef {
        ClassDef {
            name: name.into(),
            kind,
            modifier: Modifier::None,
            bases: vec![],
            properties: vec![],
            attrs: ClassMapAttrs::default(),
        }
    }

    pub fn entity(name: impl Into<String>) -> ClassDef {
        ClassDef::new(name, ClassKind::Entity)
    }

    pub fn mixin(name: impl Into<String>) -> ClassDef {
        ClassDef::new(name, ClassKind::Mixin).modifier(Modifier::Abstract)
    }

    pub fn structure(name: impl Into<String>) -> ClassDef {
        ClassDef::new(name, ClassKind::Struct)
    }

    pub fn custom_attribute(name: impl Into<String>) -> ClassDef {
        ClassDef::new(name, ClassKind::CustomAttribute)
    }

    pub fn relationship(name: impl Into<String>, relationship: Relationship<ClassRef>) -> ClassDef {
        ClassDef::new(name, ClassKind::Relationship(relationship))
    }

    pub fn modifier(mut self, modifier: Modifier) -> ClassDef {
        self.modifier = modifier;
        self
    }

    pub fn base(mut self, base: impl Into<ClassRef>) -> ClassDef {
        self.bases.push(base.into());
        self
    }

    pub fn property(mut self, property: PropertyDef) -> ClassDef {
        self.properties.push(property);
        self
    }

    pub fn attrs(mut self, f: impl FnOnce(&mut ClassMapAttrs)) -> ClassDef {
        f(&mut self.attrs);
        self
    }

    /// Returns the property definitions paired with already assigned ids.
    pub fn properties_with_ids<'a>(
        &'a self,
        ids: &'a [PropertyId],
    ) -> impl Iterator<Item = (PropertyId, &'a PropertyDef)> + 'a {
        assert_eq!(ids.len(), self.properties.len(), "one id per property");
        ids.iter().copied().zip(self.properties.iter())
    }
}

impl Class {
    pub fn is_abstract(&self) -> bool {
        self.modifier == Modifier::Abstract || self.is_mixin()
    }

    pub fn is_mixin(&self) -> bool {
        matches!(self.kind, ClassKind::Mixin)
    }

    pub fn is_entity(&self) -> bool {
        matches!(self.kind, ClassKind::Entity)
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, ClassKind::Struct)
    }

    pub fn is_custom_attribute(&self) -> bool {
        matches!(self.kind, ClassKind::CustomAttribute)
    }

    pub fn as_relationship(&self) -> Option<&Relationship<ClassId>> {
        match &self.kind {
            ClassKind::Relationship(relationship) => Some(relationship),
            _ => None,
        }
    }

    pub fn is_relationship(&self) -> bool {
        self.as_relationship().is_some()
    }

    pub fn property(&self, name: &str) -> Option<&super::Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

impl ClassRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> ClassRef {
        ClassRef {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }
}

impl From<&str> for ClassRef {
    fn from(value: &str) -> Self {
        match value.split_once(':') {
            Some((schema, name)) => ClassRef::new(schema, name),
            None => ClassRef {
                schema: None,
                name: value.to_string(),
            },
        }
    }
}

impl From<String> for ClassRef {
    fn from(value: String) -> Self {
        ClassRef::from(&value[..])
    }
}

impl From<ClassRef> for String {
    fn from(value: ClassRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}:{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassRef({self})")
    }
}

impl ClassId {
    pub fn placeholder() -> ClassId {
        ClassId(-1)
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ClassId({})", self.0)
    }
}

impl fmt::LowerHex for ClassId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, fmt)
    }
}
