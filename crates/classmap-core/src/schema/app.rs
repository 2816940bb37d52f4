mod attrs;
pub use attrs::{
    ClassMapAttr, ClassMapAttrs, DbIndexDef, ForeignKeyAttr, LinkTableAttr, ShareColumnsAttr,
    UniqueKey, UniqueKeyKind,
};

mod builder;
pub use builder::{Builder, ClassEntry};

mod class;
pub use class::{Class, ClassDef, ClassId, ClassKind, ClassRef, Modifier};

mod property;
pub use property::{
    InheritedProperty, PrimitiveType, Property, PropertyAttrs, PropertyDef, PropertyId,
    PropertyKind,
};

mod relationship;
pub use relationship::{Cardinality, Constraint, Direction, End, Multiplicity, Relationship, Strength};

mod schema;
pub use schema::{Schema, SchemaDef, SchemaId, SchemaInfo, Version};

/// Name of the class that stands for "any class" in the system schema.
pub const ANY_CLASS: &str = "AnyClass";
