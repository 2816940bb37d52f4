use super::Verify;

use classmap_core::schema::{
    app::{ClassId, PropertyKind},
    db::ColumnId,
    mapping::{ClassMap, ClassMapKind, PropertyMap, PropertyMapKind},
};

use std::collections::HashMap;

impl Verify<'_> {
    /// Every visible property of a class that holds data has a map of the
    /// property's shape, and no map is left for a property that is gone.
    pub(super) fn verify_property_maps_cover_properties(&mut self, class_map: &ClassMap) {
        if !holds_data(class_map) {
            return;
        }

        let session = self.session;
        let class = session.app.qualified_name(class_map.class);
        let properties = session.app.properties(class_map.class);

        for inherited in &properties {
            let property = inherited.property;

            match class_map.property(&property.name) {
                Some(map) => self.verify_map_shape(&class, map, &property.kind),
                None => self.finding(format!(
                    "property `{class}.{}` has no property map",
                    property.name
                )),
            }
        }

        for map in &class_map.properties {
            if !properties.iter().any(|p| p.property.name == map.access) {
                self.finding(format!(
                    "class `{class}` maps `{}`, which is not one of its properties",
                    map.access
                ));
            }
        }
    }

    fn verify_map_shape(&mut self, class: &str, map: &PropertyMap, kind: &PropertyKind<ClassId>) {
        let session = self.session;

        let matches = match (kind, &map.kind) {
            (PropertyKind::Primitive(ty), PropertyMapKind::Primitive(_)) => ty.coordinates().is_none(),
            (PropertyKind::Primitive(ty), PropertyMapKind::Point(children)) => {
                ty.coordinates().map(|coordinates| coordinates.len()) == Some(children.len())
            }
            (PropertyKind::PrimitiveArray(_), PropertyMapKind::PrimitiveArray(_)) => true,
            (PropertyKind::StructArray(_), PropertyMapKind::StructArray(_)) => true,
            (PropertyKind::Navigation { .. }, PropertyMapKind::Navigation(children)) => children.len() == 2,
            (PropertyKind::Struct(struct_class), PropertyMapKind::Struct(children)) => {
                let members = session.app.properties(*struct_class);

                for member in &members {
                    let access = format!("{}.{}", map.access, member.property.name);

                    match children.iter().find(|child| child.access == access) {
                        Some(child) => self.verify_map_shape(class, child, &member.property.kind),
                        None => self.finding(format!("struct member `{class}.{access}` has no property map")),
                    }
                }

                members.len() == children.len()
            }
            _ => false,
        };

        if !matches {
            self.finding(format!(
                "the map of `{class}.{}` does not match its {} property",
                map.access,
                kind.name()
            ));
        }
    }

    /// Within one class, two single-column maps never point at the same
    /// column.
    pub(super) fn verify_columns_are_not_reused(&mut self, class_map: &ClassMap) {
        let session = self.session;
        let mut seen: HashMap<ColumnId, &str> = HashMap::new();

        for leaf in class_map.leaves() {
            let Some(column) = leaf.column() else {
                continue;
            };

            if let Some(first) = seen.insert(column, &leaf.access) {
                let table = session.db.table(column.table);

                self.finding(format!(
                    "`{first}` and `{}` of class `{}` are both mapped to column `{}.{}`",
                    leaf.access,
                    session.app.qualified_name(class_map.class),
                    table.name,
                    table.column(column).name
                ));
            }
        }
    }
}

/// Foreign key relationships borrow the table of one of their ends and
/// keep no data maps of their own.
fn holds_data(class_map: &ClassMap) -> bool {
    !class_map.tables.is_empty()
        && matches!(
            class_map.kind,
            ClassMapKind::Class | ClassMapKind::RelationshipLinkTable
        )
}
