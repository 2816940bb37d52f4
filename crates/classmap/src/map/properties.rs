use super::{
    columns::{column_name, ColumnTarget},
    resolve::ClassMapInfo,
    Mapper,
};
use crate::Result;

use classmap_core::schema::{
    app::{ClassId, Property, PropertyAttrs, PropertyId, PropertyKind},
    db::{ColumnId, ColumnType, TableId},
    mapping::{ClassMap, PropertyMap, PropertyMapKind},
};

impl Mapper<'_> {
    /// Maps every visible property of the class. Maps loaded from the
    /// catalog are kept, maps of properties that are gone are dropped and
    /// missing ones are created.
    pub(super) fn map_properties(
        &mut self,
        class_map: &mut ClassMap,
        info: &ClassMapInfo,
        primary: Option<TableId>,
    ) -> Result<()> {
        let class = class_map.class;

        let Some(primary) = primary else {
            if !class_map.properties.is_empty() {
                class_map.properties.clear();
                class_map.touch();
            }
            return Ok(());
        };

        let visible: Vec<(Property, bool)> = self
            .session
            .app
            .properties(class)
            .into_iter()
            .map(|inherited| (inherited.property.clone(), inherited.via_mixin))
            .collect();

        let mut existing = std::mem::take(&mut class_map.properties);
        let mut maps = Vec::with_capacity(visible.len());

        for (property, via_mixin) in &visible {
            if let Some(pos) = existing.iter().position(|map| map.access == property.name) {
                let mut map = existing.remove(pos);
                set_property(&mut map, property.id);
                maps.push(map);
                continue;
            }

            let mut claimed: Vec<ColumnId> = maps
                .iter()
                .chain(existing.iter())
                .flat_map(|map: &PropertyMap| map.columns())
                .collect();

            let map = self.map_property(class, info, primary, property, *via_mixin, &mut claimed)?;

            log::debug!(
                "mapped property; class={} property={} columns={:?}",
                self.session.app.qualified_name(class),
                property.name,
                map.columns()
            );

            maps.push(map);
            class_map.touch();
        }

        if !existing.is_empty() {
            for stale in &existing {
                log::debug!(
                    "dropping property map; class={} property={}",
                    self.session.app.qualified_name(class),
                    stale.access
                );
            }
            class_map.touch();
        }

        class_map.properties = maps;
        Ok(())
    }

    fn map_property(
        &mut self,
        class: ClassId,
        info: &ClassMapInfo,
        primary: TableId,
        property: &Property,
        via_mixin: bool,
        claimed: &mut Vec<ColumnId>,
    ) -> Result<PropertyMap> {
        // Inside a shared table, a property a base already maps keeps the
        // base's columns. Any base sharing the table may be the one that
        // maps it.
        if info.tph_base.is_some() && !via_mixin {
            let inherited = self
                .shared_table_bases(class, primary)
                .into_iter()
                .find_map(|base| self.inherited_map(base, property));

            if let Some(map) = inherited {
                return Ok(map);
            }
        }

        let table = match &info.joined_table {
            Some(name) => self.joined_table(primary, name)?,
            None => primary,
        };

        let target = ColumnTarget {
            class,
            table,
            strategy: &info.strategy,
        };

        self.map_value(
            &target,
            property.id,
            &property.name,
            &property.kind,
            Some(&property.attrs),
            claimed,
        )
    }

    fn shared_table_bases(&self, class: ClassId, primary: TableId) -> Vec<ClassId> {
        let app = &self.session.app;
        app.class(class)
            .bases
            .iter()
            .copied()
            .filter(|base| !app.class(*base).is_mixin())
            .filter(|base| {
                self.session
                    .mapping
                    .get(*base)
                    .is_some_and(|base_map| base_map.strategy.is_tph() && base_map.primary_table() == Some(primary))
            })
            .collect()
    }

    fn inherited_map(&self, base: ClassId, property: &Property) -> Option<PropertyMap> {
        let base_map = self.session.mapping.get(base)?.property(&property.name)?;
        let base_property = self.session.app.property(base, &property.name)?;

        if !base_property.property.kind.same_shape(&property.kind) {
            return None;
        }

        let mut map = base_map.clone();
        set_property(&mut map, property.id);
        Some(map)
    }

    /// Maps a property, or a struct member, onto new columns.
    fn map_value(
        &mut self,
        target: &ColumnTarget<'_>,
        property: PropertyId,
        access: &str,
        kind: &PropertyKind<ClassId>,
        attrs: Option<&PropertyAttrs>,
        claimed: &mut Vec<ColumnId>,
    ) -> Result<PropertyMap> {
        let kind = match kind {
            PropertyKind::Primitive(ty) => match ty.coordinates() {
                Some(coordinates) => {
                    let mut children = vec![];
                    for coordinate in coordinates {
                        let access = format!("{access}.{coordinate}");
                        let column = self.data_column(
                            target,
                            &column_name(&access, None),
                            ColumnType::Real,
                            None,
                            claimed,
                        )?;
                        children.push(PropertyMap::new(property, access, PropertyMapKind::Primitive(column)));
                    }
                    PropertyMapKind::Point(children)
                }
                None => PropertyMapKind::Primitive(self.data_column(
                    target,
                    &column_name(access, attrs),
                    ty.column_type(),
                    attrs,
                    claimed,
                )?),
            },
            PropertyKind::PrimitiveArray(_) => PropertyMapKind::PrimitiveArray(self.data_column(
                target,
                &column_name(access, attrs),
                ColumnType::Text,
                attrs,
                claimed,
            )?),
            PropertyKind::StructArray(_) => PropertyMapKind::StructArray(self.data_column(
                target,
                &column_name(access, attrs),
                ColumnType::Text,
                attrs,
                claimed,
            )?),
            PropertyKind::Struct(struct_class) => {
                let members: Vec<Property> = self
                    .session
                    .app
                    .properties(*struct_class)
                    .into_iter()
                    .map(|member| member.property.clone())
                    .collect();

                let mut children = vec![];
                for member in &members {
                    let access = format!("{access}.{}", member.name);
                    children.push(self.map_value(
                        target,
                        property,
                        &access,
                        &member.kind,
                        Some(&member.attrs),
                        claimed,
                    )?);
                }
                PropertyMapKind::Struct(children)
            }
            PropertyKind::Navigation { .. } => {
                let mut children = vec![];
                for (member, suffix) in [("Id", "Id"), ("RelECClassId", "RelECClassId")] {
                    let name = format!("{}{suffix}", column_name(access, None));
                    let column = self.data_column(target, &name, ColumnType::Integer, None, claimed)?;
                    children.push(PropertyMap::new(
                        property,
                        format!("{access}.{member}"),
                        PropertyMapKind::Primitive(column),
                    ));
                }
                PropertyMapKind::Navigation(children)
            }
        };

        Ok(PropertyMap::new(property, access, kind))
    }
}

/// Points every map of the tree at `property`.
fn set_property(map: &mut PropertyMap, property: PropertyId) {
    map.property = property;

    match &mut map.kind {
        PropertyMapKind::Struct(children)
        | PropertyMapKind::Point(children)
        | PropertyMapKind::Navigation(children) => {
            for child in children {
                set_property(child, property);
            }
        }
        _ => {}
    }
}
