use super::{Class, ClassDef, ClassId, ClassRef, InheritedProperty, ANY_CLASS};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A schema as supplied by the caller of an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDef {
    pub name: String,

    /// Short name used as the table name prefix.
    pub alias: String,

    #[serde(default)]
    pub version: Version,

    /// Supplemental schemas only decorate other schemas and are never mapped.
    #[serde(default)]
    pub supplemental: bool,

    /// System schemas hold marker classes such as [`ANY_CLASS`].
    #[serde(default)]
    pub system: bool,

    #[serde(default)]
    pub classes: Vec<ClassDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub read: u32,
    pub write: u32,
    pub minor: u32,
}

#[derive(Debug, Clone)]
pub struct SchemaInfo {
    pub id: SchemaId,
    pub name: String,
    pub alias: String,
    pub version: Version,
    pub system: bool,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct SchemaId(pub i64);

/// All known classes, with every reference resolved.
#[derive(Debug, Default, Clone)]
pub struct Schema {
    pub schemas: IndexMap<SchemaId, SchemaInfo>,
    pub classes: IndexMap<ClassId, Class>,
}

impl SchemaDef {
    pub fn new(name: impl Into<String>, alias: impl Into<String>) -> SchemaDef {
        SchemaDef {
            name: name.into(),
            alias: alias.into(),
            version: Version::default(),
            supplemental: false,
            system: false,
            classes: vec![],
        }
    }

    pub fn version(mut self, read: u32, write: u32, minor: u32) -> SchemaDef {
        self.version = Version { read, write, minor };
        self
    }

    pub fn supplemental(mut self) -> SchemaDef {
        self.supplemental = true;
        self
    }

    pub fn system(mut self) -> SchemaDef {
        self.system = true;
        self
    }

    pub fn class(mut self, class: ClassDef) -> SchemaDef {
        self.classes.push(class);
        self
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut ClassDef> {
        self.classes.iter_mut().find(|class| class.name == name)
    }
}

impl Default for Version {
    fn default() -> Self {
        Version {
            read: 1,
            write: 0,
            minor: 0,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}.{:02}", self.read, self.write, self.minor)
    }
}

impl fmt::Debug for SchemaId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "SchemaId({})", self.0)
    }
}

impl Schema {
    pub fn schema(&self, id: SchemaId) -> &SchemaInfo {
        self.schemas.get(&id).expect("invalid schema ID")
    }

    pub fn schema_by_name(&self, name: &str) -> Option<&SchemaInfo> {
        self.schemas.values().find(|schema| schema.name == name)
    }

    pub fn class(&self, id: ClassId) -> &Class {
        self.classes.get(&id).expect("invalid class ID")
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    /// Finds a class by schema name and class name.
    pub fn find_class(&self, schema: &str, name: &str) -> Option<&Class> {
        let schema = self.schema_by_name(schema)?;
        self.classes
            .values()
            .find(|class| class.schema == schema.id && class.name == name)
    }

    /// Resolves a class reference. Unqualified references are looked up in
    /// `default_schema`.
    pub fn resolve(&self, class_ref: &ClassRef, default_schema: &str) -> Option<&Class> {
        let schema = class_ref.schema.as_deref().unwrap_or(default_schema);
        self.find_class(schema, &class_ref.name)
    }

    /// `Schema:Class` name used in diagnostics.
    pub fn qualified_name(&self, id: ClassId) -> String {
        let class = self.class(id);
        format!("{}:{}", self.schema(class.schema).name, class.name)
    }

    pub fn alias(&self, id: ClassId) -> &str {
        &self.schema(self.class(id).schema).alias
    }

    /// `true` for the marker class standing for any class.
    pub fn is_any_class(&self, id: ClassId) -> bool {
        let class = self.class(id);
        class.name == ANY_CLASS && self.schema(class.schema).system
    }

    /// Direct subclasses of `id`, in class id order.
    pub fn derived_classes(&self, id: ClassId) -> Vec<ClassId> {
        let mut derived: Vec<_> = self
            .classes
            .values()
            .filter(|class| class.bases.contains(&id))
            .map(|class| class.id)
            .collect();
        derived.sort();
        derived
    }

    /// All transitive subclasses of `id`, depth first, without duplicates.
    pub fn descendants(&self, id: ClassId) -> Vec<ClassId> {
        let mut out = vec![];
        let mut stack = self.derived_classes(id);
        stack.reverse();

        while let Some(next) = stack.pop() {
            if out.contains(&next) {
                continue;
            }
            out.push(next);
            let mut derived = self.derived_classes(next);
            derived.reverse();
            stack.extend(derived);
        }

        out
    }

    /// All transitive base classes of `id`, nearest first.
    pub fn ancestors(&self, id: ClassId) -> Vec<ClassId> {
        let mut out: Vec<ClassId> = vec![];
        let mut queue: Vec<ClassId> = self.class(id).bases.clone();
        let mut i = 0;

        while i < queue.len() {
            let next = queue[i];
            i += 1;
            if out.contains(&next) {
                continue;
            }
            out.push(next);
            queue.extend(self.class(next).bases.iter().copied());
        }

        out
    }

    /// Returns `true` if `class` is `base` or derives from it.
    pub fn is_a(&self, class: ClassId, base: ClassId) -> bool {
        class == base || self.ancestors(class).contains(&base)
    }

    /// Ultimate base classes of `id`: ancestors without bases of their own.
    /// A class without bases is its own root.
    pub fn roots(&self, id: ClassId) -> Vec<ClassId> {
        if self.class(id).bases.is_empty() {
            return vec![id];
        }

        self.ancestors(id)
            .into_iter()
            .filter(|ancestor| self.class(*ancestor).bases.is_empty())
            .collect()
    }

    /// Every property visible on the class, base class properties first.
    ///
    /// A property declared again further down the hierarchy overrides the
    /// inherited one but keeps its position.
    pub fn properties(&self, id: ClassId) -> Vec<InheritedProperty<'_>> {
        let class = self.class(id);
        let mut out: Vec<InheritedProperty<'_>> = vec![];

        for base in &class.bases {
            let base_is_mixin = self.class(*base).is_mixin() && !class.is_mixin();

            for inherited in self.properties(*base) {
                if out
                    .iter()
                    .any(|p| p.property.name == inherited.property.name)
                {
                    continue;
                }
                out.push(InheritedProperty {
                    property: inherited.property,
                    via_mixin: base_is_mixin,
                });
            }
        }

        for property in &class.properties {
            let local = InheritedProperty {
                property,
                via_mixin: false,
            };
            match out.iter_mut().find(|p| p.property.name == property.name) {
                Some(slot) => *slot = local,
                None => out.push(local),
            }
        }

        out
    }

    /// Looks up a visible property by name.
    pub fn property(&self, class: ClassId, name: &str) -> Option<InheritedProperty<'_>> {
        self.properties(class)
            .into_iter()
            .find(|p| p.property.name == name)
    }

    /// Concrete classes a relationship constraint admits, including
    /// subclasses when the constraint is polymorphic.
    pub fn constraint_classes(&self, constraint: &super::Constraint<ClassId>) -> Vec<ClassId> {
        let mut out = vec![];
        for class in &constraint.classes {
            if self.is_any_class(*class) {
                continue;
            }
            if !out.contains(class) {
                out.push(*class);
            }
            if constraint.polymorphic {
                for derived in self.descendants(*class) {
                    if !out.contains(&derived) {
                        out.push(derived);
                    }
                }
            }
        }
        out
    }
}
