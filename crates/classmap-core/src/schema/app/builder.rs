use super::{
    Class, ClassDef, ClassId, ClassKind, ClassRef, Constraint, Property, PropertyId, PropertyKind,
    Relationship, Schema, SchemaId, SchemaInfo,
};
use crate::{Error, Result};

use indexmap::IndexMap;

/// Resolves class definitions, whose references are by name, into a
/// [`Schema`] whose references are by id.
#[derive(Debug, Default)]
pub struct Builder {
    schemas: IndexMap<SchemaId, SchemaInfo>,
    classes: Vec<ClassEntry>,
}

/// A class definition with its ids already assigned.
#[derive(Debug, Clone)]
pub struct ClassEntry {
    pub id: ClassId,
    pub schema: SchemaId,
    pub def: ClassDef,

    /// One id per entry of `def.properties`, in the same order.
    pub property_ids: Vec<PropertyId>,
}

/// Used to track state while resolving references
struct BuildSchema<'a> {
    builder: &'a Builder,

    /// (schema name, class name) -> id
    lookup: IndexMap<(&'a str, &'a str), ClassId>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn schema(&mut self, schema: SchemaInfo) -> &mut Self {
        self.schemas.insert(schema.id, schema);
        self
    }

    pub fn class(&mut self, entry: ClassEntry) -> &mut Self {
        assert_eq!(
            entry.def.properties.len(),
            entry.property_ids.len(),
            "one id per property"
        );
        self.classes.push(entry);
        self
    }

    pub fn build(&self) -> Result<Schema> {
        let mut cx = BuildSchema {
            builder: self,
            lookup: IndexMap::new(),
        };

        for entry in &self.classes {
            let schema = self.schema_info(entry.schema)?;
            cx.lookup
                .insert((schema.name.as_str(), entry.def.name.as_str()), entry.id);
        }

        let mut classes = IndexMap::new();

        for entry in &self.classes {
            let class = cx.build_class(entry)?;
            classes.insert(class.id, class);
        }

        classes.sort_keys();

        let schema = Schema {
            schemas: self.schemas.clone(),
            classes,
        };

        cx.verify(&schema)?;

        Ok(schema)
    }

    fn schema_info(&self, id: SchemaId) -> Result<&SchemaInfo> {
        self.schemas
            .get(&id)
            .ok_or_else(|| Error::invalid_schema(format!("unknown schema id {}", id.0)))
    }
}

impl BuildSchema<'_> {
    fn build_class(&self, entry: &ClassEntry) -> Result<Class> {
        let schema = &self.builder.schema_info(entry.schema)?.name;
        let owner = format!("{schema}:{}", entry.def.name);

        let bases = entry
            .def
            .bases
            .iter()
            .map(|base| self.lookup(base, schema, &owner))
            .collect::<Result<Vec<_>>>()?;

        let kind = match &entry.def.kind {
            ClassKind::Entity => ClassKind::Entity,
            ClassKind::Mixin => ClassKind::Mixin,
            ClassKind::Struct => ClassKind::Struct,
            ClassKind::CustomAttribute => ClassKind::CustomAttribute,
            ClassKind::Relationship(relationship) => ClassKind::Relationship(Relationship {
                strength: relationship.strength,
                strength_direction: relationship.strength_direction,
                source: self.build_constraint(&relationship.source, schema, &owner)?,
                target: self.build_constraint(&relationship.target, schema, &owner)?,
            }),
        };

        let mut properties = vec![];

        for (id, def) in entry.def.properties_with_ids(&entry.property_ids) {
            let kind = match &def.kind {
                PropertyKind::Primitive(ty) => PropertyKind::Primitive(*ty),
                PropertyKind::PrimitiveArray(ty) => PropertyKind::PrimitiveArray(*ty),
                PropertyKind::Struct(class) => {
                    PropertyKind::Struct(self.lookup(class, schema, &owner)?)
                }
                PropertyKind::StructArray(class) => {
                    PropertyKind::StructArray(self.lookup(class, schema, &owner)?)
                }
                PropertyKind::Navigation {
                    relationship,
                    direction,
                } => PropertyKind::Navigation {
                    relationship: self.lookup(relationship, schema, &owner)?,
                    direction: *direction,
                },
            };

            properties.push(Property {
                id,
                class: entry.id,
                name: def.name.clone(),
                kind,
                attrs: def.attrs.clone(),
            });
        }

        Ok(Class {
            id: entry.id,
            schema: entry.schema,
            name: entry.def.name.clone(),
            kind,
            modifier: entry.def.modifier,
            bases,
            properties,
            attrs: entry.def.attrs.clone(),
        })
    }

    fn build_constraint(
        &self,
        constraint: &Constraint<ClassRef>,
        schema: &str,
        owner: &str,
    ) -> Result<Constraint<ClassId>> {
        Ok(Constraint {
            multiplicity: constraint.multiplicity,
            polymorphic: constraint.polymorphic,
            classes: constraint
                .classes
                .iter()
                .map(|class| self.lookup(class, schema, owner))
                .collect::<Result<_>>()?,
        })
    }

    fn lookup(&self, class: &ClassRef, schema: &str, owner: &str) -> Result<ClassId> {
        let schema = class.schema.as_deref().unwrap_or(schema);
        self.lookup
            .get(&(schema, class.name.as_str()))
            .copied()
            .ok_or_else(|| {
                Error::invalid_schema(format!(
                    "class `{owner}` references unknown class `{schema}:{}`",
                    class.name
                ))
            })
    }

    /// Checks the references resolved above point at the right kind of class.
    fn verify(&self, schema: &Schema) -> Result<()> {
        for class in schema.classes() {
            let name = schema.qualified_name(class.id);

            for base in &class.bases {
                let base_class = schema.class(*base);
                let compatible = match (&class.kind, &base_class.kind) {
                    (_, ClassKind::Mixin) => !class.is_struct() && !class.is_custom_attribute(),
                    (ClassKind::Relationship(_), ClassKind::Relationship(_)) => true,
                    (ClassKind::Relationship(_), _) | (_, ClassKind::Relationship(_)) => false,
                    (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
                };

                if !compatible {
                    return Err(Error::invalid_schema(format!(
                        "class `{name}` cannot derive from `{}`",
                        schema.qualified_name(*base)
                    )));
                }

                if schema.ancestors(*base).contains(&class.id) {
                    return Err(Error::invalid_schema(format!(
                        "class `{name}` is part of an inheritance cycle"
                    )));
                }
            }

            for property in &class.properties {
                match property.kind {
                    PropertyKind::Struct(target) | PropertyKind::StructArray(target)
                        if !schema.class(target).is_struct() =>
                    {
                        return Err(Error::invalid_schema(format!(
                            "property `{name}.{}` refers to `{}` which is not a struct class",
                            property.name,
                            schema.qualified_name(target)
                        )));
                    }
                    PropertyKind::Navigation { relationship, .. }
                        if !schema.class(relationship).is_relationship() =>
                    {
                        return Err(Error::invalid_schema(format!(
                            "navigation property `{name}.{}` refers to `{}` which is not a relationship class",
                            property.name,
                            schema.qualified_name(relationship)
                        )));
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}
