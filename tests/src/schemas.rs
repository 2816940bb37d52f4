//! Shorthands for building test schemas.

use classmap::app::{
    ClassDef, ClassRef, Constraint, Multiplicity, PrimitiveType, PropertyDef, Relationship,
    SchemaDef, Strength,
};

/// An empty schema named `Zoo` whose tables are prefixed with `zoo_`.
pub fn zoo() -> SchemaDef {
    SchemaDef::new("Zoo", "zoo")
}

pub fn string(name: &str) -> PropertyDef {
    PropertyDef::primitive(name, PrimitiveType::String)
}

pub fn int(name: &str) -> PropertyDef {
    PropertyDef::primitive(name, PrimitiveType::Integer)
}

pub fn double(name: &str) -> PropertyDef {
    PropertyDef::primitive(name, PrimitiveType::Double)
}

/// A referencing relationship from `source` to `target`.
pub fn relationship(
    name: &str,
    source: (&str, Multiplicity),
    target: (&str, Multiplicity),
) -> ClassDef {
    ClassDef::relationship(
        name,
        Relationship::new(
            Strength::Referencing,
            Constraint::new(source.1, [ClassRef::from(source.0)]),
            Constraint::new(target.1, [ClassRef::from(target.0)]),
        ),
    )
}
