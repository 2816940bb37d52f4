use super::{ClassId, ClassRef, Direction};
use crate::schema::db::ColumnType;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A property as supplied by a schema definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,

    pub kind: PropertyKind<ClassRef>,

    #[serde(default)]
    pub attrs: PropertyAttrs,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub id: PropertyId,

    /// The class declaring the property
    pub class: ClassId,

    pub name: String,

    pub kind: PropertyKind<ClassId>,

    pub attrs: PropertyAttrs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyKind<C> {
    Primitive(PrimitiveType),
    PrimitiveArray(PrimitiveType),
    Struct(C),
    StructArray(C),
    Navigation { relationship: C, direction: Direction },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveType {
    Integer,
    Long,
    Double,
    String,
    Binary,
    Boolean,
    DateTime,
    Guid,
    Point2d,
    Point3d,
}

/// Column-level options declared on a property.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyAttrs {
    pub not_null: bool,

    pub unique: bool,

    pub collation: Option<String>,

    /// Explicit column name. Only honored for dedicated columns.
    pub column_name: Option<String>,
}

/// A property visible on a class, either declared locally or inherited.
#[derive(Debug, Clone, Copy)]
pub struct InheritedProperty<'a> {
    pub property: &'a Property,

    /// `true` when the property reached the class through a mixin base.
    /// Such properties never share columns with the mixin.
    pub via_mixin: bool,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct PropertyId(pub i64);

impl PropertyDef {
    pub fn new(name: impl Into<String>, kind: PropertyKind<ClassRef>) -> PropertyDef {
        PropertyDef {
            name: name.into(),
            kind,
            attrs: PropertyAttrs::default(),
        }
    }

    pub fn primitive(name: impl Into<String>, ty: PrimitiveType) -> PropertyDef {
        PropertyDef::new(name, PropertyKind::Primitive(ty))
    }

    pub fn primitive_array(name: impl Into<String>, ty: PrimitiveType) -> PropertyDef {
        PropertyDef::new(name, PropertyKind::PrimitiveArray(ty))
    }

    pub fn structure(name: impl Into<String>, class: impl Into<ClassRef>) -> PropertyDef {
        PropertyDef::new(name, PropertyKind::Struct(class.into()))
    }

    pub fn struct_array(name: impl Into<String>, class: impl Into<ClassRef>) -> PropertyDef {
        PropertyDef::new(name, PropertyKind::StructArray(class.into()))
    }

    pub fn navigation(
        name: impl Into<String>,
        relationship: impl Into<ClassRef>,
        direction: Direction,
    ) -> PropertyDef {
        PropertyDef::new(
            name,
            PropertyKind::Navigation {
                relationship: relationship.into(),
                direction,
            },
        )
    }

    pub fn not_null(mut self) -> PropertyDef {
        self.attrs.not_null = true;
        self
    }

    pub fn unique(mut self) -> PropertyDef {
        self.attrs.unique = true;
        self
    }

    pub fn column_name(mut self, name: impl Into<String>) -> PropertyDef {
        self.attrs.column_name = Some(name.into());
        self
    }
}

impl Property {
    pub fn as_navigation(&self) -> Option<(ClassId, Direction)> {
        match self.kind {
            PropertyKind::Navigation {
                relationship,
                direction,
            } => Some((relationship, direction)),
            _ => None,
        }
    }
}

impl<C> PropertyKind<C> {
    /// Returns `true` when two kinds store data in the same shape, ignoring
    /// the class they reference.
    pub fn same_shape<D>(&self, other: &PropertyKind<D>) -> bool {
        use PropertyKind::*;

        match (self, other) {
            (Primitive(a), Primitive(b)) | (PrimitiveArray(a), PrimitiveArray(b)) => a == b,
            (Struct(_), Struct(_)) | (StructArray(_), StructArray(_)) => true,
            (Navigation { .. }, Navigation { .. }) => true,
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PropertyKind::Primitive(_) => "primitive",
            PropertyKind::PrimitiveArray(_) => "primitive array",
            PropertyKind::Struct(_) => "struct",
            PropertyKind::StructArray(_) => "struct array",
            PropertyKind::Navigation { .. } => "navigation",
        }
    }
}

impl PrimitiveType {
    /// Storage type of a single-column primitive. Points are stored as one
    /// `Real` column per coordinate.
    pub fn column_type(self) -> ColumnType {
        match self {
            PrimitiveType::Integer | PrimitiveType::Long => ColumnType::Integer,
            PrimitiveType::Double | PrimitiveType::Point2d | PrimitiveType::Point3d => {
                ColumnType::Real
            }
            PrimitiveType::String => ColumnType::Text,
            PrimitiveType::Binary | PrimitiveType::Guid => ColumnType::Blob,
            PrimitiveType::Boolean => ColumnType::Boolean,
            PrimitiveType::DateTime => ColumnType::TimeStamp,
        }
    }

    /// Coordinate member names for point types.
    pub fn coordinates(self) -> Option<&'static [&'static str]> {
        match self {
            PrimitiveType::Point2d => Some(&["X", "Y"]),
            PrimitiveType::Point3d => Some(&["X", "Y", "Z"]),
            _ => None,
        }
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "PropertyId({})", self.0)
    }
}
