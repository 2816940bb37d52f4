use crate::schema::{app::PropertyId, db::ColumnId};

/// Maps one property, or one struct member, to its column(s).
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMap {
    /// The top-level property this map belongs to
    pub property: PropertyId,

    /// Dotted path from the class to the mapped value, e.g. `Address.City`
    pub access: String,

    pub kind: PropertyMapKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyMapKind {
    Primitive(ColumnId),
    PrimitiveArray(ColumnId),
    StructArray(ColumnId),

    /// One child per struct member
    Struct(Vec<PropertyMap>),

    /// One child per coordinate
    Point(Vec<PropertyMap>),

    /// `Id` and `RelECClassId` children
    Navigation(Vec<PropertyMap>),
}

/// Maps a system property to one column per table the class spans.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemPropertyMap {
    pub kind: SystemProperty,
    pub columns: Vec<ColumnId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemProperty {
    InstanceId,
    ClassId,
    SourceInstanceId,
    SourceClassId,
    TargetInstanceId,
    TargetClassId,
}

impl PropertyMap {
    pub fn new(property: PropertyId, access: impl Into<String>, kind: PropertyMapKind) -> Self {
        PropertyMap {
            property,
            access: access.into(),
            kind,
        }
    }

    /// Maps that point at exactly one column, depth first.
    pub fn leaves(&self) -> Vec<&PropertyMap> {
        let mut out = vec![];
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a PropertyMap>) {
        match &self.kind {
            PropertyMapKind::Primitive(_)
            | PropertyMapKind::PrimitiveArray(_)
            | PropertyMapKind::StructArray(_) => out.push(self),
            PropertyMapKind::Struct(children)
            | PropertyMapKind::Point(children)
            | PropertyMapKind::Navigation(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// The column of a single-column map.
    pub fn column(&self) -> Option<ColumnId> {
        match self.kind {
            PropertyMapKind::Primitive(column)
            | PropertyMapKind::PrimitiveArray(column)
            | PropertyMapKind::StructArray(column) => Some(column),
            _ => None,
        }
    }

    pub fn columns(&self) -> Vec<ColumnId> {
        self.leaves()
            .into_iter()
            .filter_map(|leaf| leaf.column())
            .collect()
    }

    /// Finds this map or a nested map by access string.
    pub fn find(&self, access: &str) -> Option<&PropertyMap> {
        if self.access == access {
            return Some(self);
        }

        match &self.kind {
            PropertyMapKind::Struct(children)
            | PropertyMapKind::Point(children)
            | PropertyMapKind::Navigation(children) => {
                children.iter().find_map(|child| child.find(access))
            }
            _ => None,
        }
    }

    /// Name of the top-level property, the first segment of the access string.
    pub fn property_name(&self) -> &str {
        self.access.split('.').next().unwrap_or(&self.access)
    }
}

impl SystemProperty {
    pub const ALL: [SystemProperty; 6] = [
        SystemProperty::InstanceId,
        SystemProperty::ClassId,
        SystemProperty::SourceInstanceId,
        SystemProperty::SourceClassId,
        SystemProperty::TargetInstanceId,
        SystemProperty::TargetClassId,
    ];

    pub fn access_string(self) -> &'static str {
        match self {
            SystemProperty::InstanceId => "ECInstanceId",
            SystemProperty::ClassId => "ECClassId",
            SystemProperty::SourceInstanceId => "SourceECInstanceId",
            SystemProperty::SourceClassId => "SourceECClassId",
            SystemProperty::TargetInstanceId => "TargetECInstanceId",
            SystemProperty::TargetClassId => "TargetECClassId",
        }
    }

    pub fn from_access_string(access: &str) -> Option<SystemProperty> {
        SystemProperty::ALL
            .into_iter()
            .find(|kind| kind.access_string() == access)
    }

    pub fn is_relationship_end(self) -> bool {
        !matches!(self, SystemProperty::InstanceId | SystemProperty::ClassId)
    }
}
