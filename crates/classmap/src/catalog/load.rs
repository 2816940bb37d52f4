use crate::{session::MappingSession, Result, Storage};

use classmap_core::{
    err,
    schema::{
        app::{self, ClassDef, ClassEntry, ClassId, PropertyDef, PropertyId, PropertyKind, SchemaId, SchemaInfo, Version},
        db::{self, ColumnId, ColumnKind, ColumnType, ForeignKey, Index, IndexId, OnDelete, Persistence, TableId, TableType},
        mapping::{
            ClassMap, ClassMapKind, JoinedTableInfo, MapState, MapStrategy, PropertyMap, PropertyMapKind,
            ShareColumnsMode, Strategy, SystemProperty, SystemPropertyMap, TphInfo,
        },
    },
};
use indexmap::IndexMap;

use std::collections::HashMap;

/// Catalog content as read from storage, before the class definitions are
/// resolved into an [`app::Schema`].
#[derive(Debug, Default)]
pub(crate) struct Persisted {
    pub(crate) schemas: Vec<SchemaInfo>,
    pub(crate) classes: Vec<ClassEntry>,
    pub(crate) class_maps: Vec<ClassMapRow>,
    pub(crate) property_maps: Vec<PropertyMapRow>,
}

#[derive(Debug)]
pub(crate) struct ClassMapRow {
    pub(crate) class: ClassId,
    pub(crate) strategy: MapStrategy,
}

#[derive(Debug)]
pub(crate) struct PropertyMapRow {
    pub(crate) class: ClassId,
    pub(crate) access: String,
    pub(crate) column: ColumnId,
}

/// Loads the whole catalog into `session`.
pub(crate) fn load(storage: &mut dyn Storage, session: &mut MappingSession) -> Result<()> {
    let persisted = read(storage, &mut session.db)?;

    let mut builder = app::Builder::new();
    for schema in &persisted.schemas {
        builder.schema(schema.clone());
    }
    for entry in &persisted.classes {
        builder.class(entry.clone());
    }
    session.app = builder.build()?;

    session.load_class_maps(&persisted.class_maps, &persisted.property_maps)
}

/// Reads schemas, classes, the physical model and the raw class map rows.
/// The physical model is loaded into `db`.
pub(crate) fn read(storage: &mut dyn Storage, db: &mut db::Schema) -> Result<Persisted> {
    let mut persisted = Persisted::default();

    for row in storage.query(
        r#"SELECT "Id", "Name", "Alias", "VersionMajor", "VersionWrite", "VersionMinor", "IsSystem" FROM "ec_Schema" ORDER BY "Id""#,
        &[],
    )? {
        persisted.schemas.push(SchemaInfo {
            id: SchemaId(row.get_i64(0)?),
            name: row.get_string(1)?,
            alias: row.get_string(2)?,
            version: Version {
                read: u32::try_from(row.get_i64(3)?)?,
                write: u32::try_from(row.get_i64(4)?)?,
                minor: u32::try_from(row.get_i64(5)?)?,
            },
            system: row.get_bool(6)?,
        });
    }

    for row in storage.query(
        r#"SELECT "Id", "SchemaId", "Definition" FROM "ec_Class" ORDER BY "Id""#,
        &[],
    )? {
        let def: ClassDef = serde_json::from_str(&row.get_string(2)?)?;
        persisted.classes.push(ClassEntry {
            id: ClassId(row.get_i64(0)?),
            schema: SchemaId(row.get_i64(1)?),
            def,
            property_ids: vec![],
        });
    }

    for row in storage.query(
        r#"SELECT "Id", "ClassId", "Definition" FROM "ec_Property" ORDER BY "ClassId", "Ordinal""#,
        &[],
    )? {
        let class = ClassId(row.get_i64(1)?);
        let def: PropertyDef = serde_json::from_str(&row.get_string(2)?)?;

        let entry = persisted
            .classes
            .iter_mut()
            .find(|entry| entry.id == class)
            .ok_or_else(|| err!("catalog property row refers to unknown class {}", class.0))?;
        entry.def.properties.push(def);
        entry.property_ids.push(PropertyId(row.get_i64(0)?));
    }

    let columns = read_tables(storage, db)?;

    for row in storage.query(
        r#"SELECT "ClassId", "MapStrategy", "AppliesToSubclasses", "ShareColumnsMode", "MaxSharedColumnsBeforeOverflow", "JoinedTableInfo" FROM "ec_ClassMap" ORDER BY "ClassId""#,
        &[],
    )? {
        let class = ClassId(row.get_i64(0)?);
        let name = row.get_string(1)?;
        let strategy = Strategy::parse(&name)
            .ok_or_else(|| err!("unknown map strategy `{name}` for class {}", class.0))?;

        let mut strategy = MapStrategy::new(strategy, row.get_bool(2)?);

        if let Some(share_columns) = row.get_opt_string(3)? {
            let joined_table = row.get_opt_string(5)?.unwrap_or_default();
            strategy.tph = Some(TphInfo {
                share_columns: ShareColumnsMode::parse(&share_columns)
                    .ok_or_else(|| err!("unknown share columns mode `{share_columns}`"))?,
                max_shared_columns_before_overflow: row
                    .get_opt_i64(4)?
                    .map(u32::try_from)
                    .transpose()?,
                joined_table: JoinedTableInfo::parse(&joined_table)
                    .ok_or_else(|| err!("unknown joined table info `{joined_table}`"))?,
            });
        }

        persisted.class_maps.push(ClassMapRow { class, strategy });
    }

    for row in storage.query(
        r#"SELECT "ClassId", "AccessString", "ColumnId" FROM "ec_PropertyMap" ORDER BY "Id""#,
        &[],
    )? {
        let catalog_id = row.get_i64(2)?;
        let column = *columns
            .get(&catalog_id)
            .ok_or_else(|| err!("property map refers to unknown column {catalog_id}"))?;

        persisted.property_maps.push(PropertyMapRow {
            class: ClassId(row.get_i64(0)?),
            access: row.get_string(1)?,
            column,
        });
    }

    Ok(persisted)
}

/// Loads tables, columns, foreign keys and indexes. Returns the column ids
/// keyed by catalog row id.
fn read_tables(storage: &mut dyn Storage, db: &mut db::Schema) -> Result<HashMap<i64, ColumnId>> {
    let mut tables = HashMap::new();
    let mut columns = HashMap::new();

    for row in storage.query(
        r#"SELECT "Id", "Name", "Type", "ExclusiveRootClassId", "ParentTableId" FROM "ec_Table" ORDER BY "Id""#,
        &[],
    )? {
        let catalog_id = row.get_i64(0)?;
        let ty_name = row.get_string(2)?;
        let ty = TableType::parse(&ty_name).ok_or_else(|| err!("unknown table type `{ty_name}`"))?;

        let id = db.create_table(row.get_string(1)?, ty);
        let table = db.table_mut(id);
        table.catalog_id = Some(catalog_id);
        table.exclusive_root_class = row.get_opt_i64(3)?.map(ClassId);
        table.parent = match row.get_opt_i64(4)? {
            Some(parent) => Some(lookup_table(&tables, parent)?),
            None => None,
        };

        tables.insert(catalog_id, id);
    }

    for row in storage.query(
        r#"SELECT "Id", "TableId", "Name", "Type", "IsVirtual", "NotNull", "IsUnique", "CollationConstraint", "DefaultConstraint", "CheckConstraint", "OrdinalInPrimaryKey", "ColumnKind" FROM "ec_Column" ORDER BY "TableId", "Ordinal""#,
        &[],
    )? {
        let catalog_id = row.get_i64(0)?;
        let table = lookup_table(&tables, row.get_i64(1)?)?;
        let ty_name = row.get_string(3)?;
        let ty = ColumnType::parse(&ty_name).ok_or_else(|| err!("unknown column type `{ty_name}`"))?;

        let id = db.table_mut(table).add_column(row.get_string(2)?, ty);
        let column = db.column_mut(id);
        column.persistence = if row.get_bool(4)? {
            Persistence::Virtual
        } else {
            Persistence::Physical
        };
        column.not_null = row.get_bool(5)?;
        column.unique = row.get_bool(6)?;
        column.collation = row.get_opt_string(7)?;
        column.default = row.get_opt_string(8)?;
        column.check = row.get_opt_string(9)?;
        column.kind = ColumnKind::from_bits(u16::try_from(row.get_i64(11)?)?);
        column.catalog_id = Some(catalog_id);

        if row.get_opt_i64(10)?.unwrap_or(0) > 0 {
            db.table_mut(table).primary_key = Some(id);
        }

        columns.insert(catalog_id, id);
    }

    for row in storage.query(
        r#"SELECT "ColumnId", "ReferencedColumnId", "OnDelete" FROM "ec_ForeignKey" ORDER BY "Id""#,
        &[],
    )? {
        let column = lookup_column(&columns, row.get_i64(0)?)?;
        let references = lookup_column(&columns, row.get_i64(1)?)?;
        let on_delete_name = row.get_string(2)?;
        let on_delete = OnDelete::parse(&on_delete_name)
            .ok_or_else(|| err!("unknown on delete action `{on_delete_name}`"))?;

        db.table_mut(column.table).foreign_keys.push(ForeignKey {
            column,
            references,
            on_delete,
        });
    }

    let mut index_columns: HashMap<i64, Vec<ColumnId>> = HashMap::new();
    for row in storage.query(
        r#"SELECT "IndexId", "ColumnId" FROM "ec_IndexColumn" ORDER BY "IndexId", "Ordinal""#,
        &[],
    )? {
        let column = lookup_column(&columns, row.get_i64(1)?)?;
        index_columns.entry(row.get_i64(0)?).or_default().push(column);
    }

    for row in storage.query(
        r#"SELECT "Id", "Name", "TableId", "ClassId", "IsUnique", "AddNotNullWhereExp", "IsAutoGenerated", "ClassFilter" FROM "ec_Index" ORDER BY "Id""#,
        &[],
    )? {
        let catalog_id = row.get_i64(0)?;
        let class_filter = match row.get_opt_string(7)? {
            Some(json) => Some(
                serde_json::from_str::<Vec<i64>>(&json)?
                    .into_iter()
                    .map(ClassId)
                    .collect(),
            ),
            None => None,
        };

        db.add_index(Index {
            id: IndexId::placeholder(),
            name: row.get_string(1)?,
            on: lookup_table(&tables, row.get_i64(2)?)?,
            columns: index_columns.remove(&catalog_id).unwrap_or_default(),
            unique: row.get_bool(4)?,
            where_not_null: row.get_bool(5)?,
            class_filter,
            class: row.get_opt_i64(3)?.map(ClassId),
            auto_generated: row.get_bool(6)?,
            catalog_id: Some(catalog_id),
        });
    }

    Ok(columns)
}

fn lookup_table(tables: &HashMap<i64, TableId>, catalog_id: i64) -> Result<TableId> {
    tables
        .get(&catalog_id)
        .copied()
        .ok_or_else(|| err!("catalog refers to unknown table {catalog_id}"))
}

fn lookup_column(columns: &HashMap<i64, ColumnId>, catalog_id: i64) -> Result<ColumnId> {
    columns
        .get(&catalog_id)
        .copied()
        .ok_or_else(|| err!("catalog refers to unknown column {catalog_id}"))
}

impl MappingSession {
    /// Rebuilds class maps from their catalog rows. A property whose
    /// columns are not all recorded ends up without a map.
    pub(crate) fn load_class_maps(
        &mut self,
        class_maps: &[ClassMapRow],
        property_maps: &[PropertyMapRow],
    ) -> Result<()> {
        let mut rows: IndexMap<ClassId, HashMap<&str, Vec<ColumnId>>> = IndexMap::new();
        for row in property_maps {
            rows.entry(row.class)
                .or_default()
                .entry(row.access.as_str())
                .or_default()
                .push(row.column);
        }

        let empty = HashMap::new();

        for row in class_maps {
            if !self.app.classes.contains_key(&row.class) {
                return Err(err!("class map refers to unknown class {}", row.class.0));
            }

            let class = self.app.class(row.class);
            let columns = rows.get(&row.class).unwrap_or(&empty);

            let kind = match row.strategy.strategy {
                Strategy::NotMapped => ClassMapKind::NotMapped,
                Strategy::ForeignKeyInSource => ClassMapKind::RelationshipEndTable {
                    fk_end: app::End::Source,
                },
                Strategy::ForeignKeyInTarget => ClassMapKind::RelationshipEndTable {
                    fk_end: app::End::Target,
                },
                _ if class.is_relationship() => ClassMapKind::RelationshipLinkTable,
                _ => ClassMapKind::Class,
            };

            let mut class_map = ClassMap::new(row.class, row.strategy.clone(), kind);
            class_map.state = MapState::Persisted;

            for system in SystemProperty::ALL {
                if let Some(columns) = columns.get(system.access_string()) {
                    class_map.system.push(SystemPropertyMap {
                        kind: system,
                        columns: columns.clone(),
                    });
                }
            }

            if let Some(instance_id) = class_map.system(SystemProperty::InstanceId) {
                let mut tables = vec![];
                for column in &instance_id.columns {
                    if !tables.contains(&column.table) {
                        tables.push(column.table);
                    }
                }
                class_map.tables = tables;
            }

            for inherited in self.app.properties(row.class) {
                let property = inherited.property;
                if let Some(map) = rebuild(&self.app, property.id, &property.name, &property.kind, columns) {
                    class_map.properties.push(map);
                }
            }

            self.mapping.insert(class_map);
        }

        Ok(())
    }
}

fn rebuild(
    app: &app::Schema,
    property: PropertyId,
    access: &str,
    kind: &PropertyKind<ClassId>,
    rows: &HashMap<&str, Vec<ColumnId>>,
) -> Option<PropertyMap> {
    let column = |access: &str| rows.get(access).and_then(|columns| columns.first().copied());

    let kind = match kind {
        PropertyKind::Primitive(ty) => match ty.coordinates() {
            Some(coordinates) => PropertyMapKind::Point(
                coordinates
                    .iter()
                    .map(|coordinate| {
                        let access = format!("{access}.{coordinate}");
                        let column = column(&access)?;
                        Some(PropertyMap::new(property, access, PropertyMapKind::Primitive(column)))
                    })
                    .collect::<Option<_>>()?,
            ),
            None => PropertyMapKind::Primitive(column(access)?),
        },
        PropertyKind::PrimitiveArray(_) => PropertyMapKind::PrimitiveArray(column(access)?),
        PropertyKind::StructArray(_) => PropertyMapKind::StructArray(column(access)?),
        PropertyKind::Struct(struct_class) => PropertyMapKind::Struct(
            app.properties(*struct_class)
                .into_iter()
                .map(|member| {
                    let access = format!("{access}.{}", member.property.name);
                    rebuild(app, property, &access, &member.property.kind, rows)
                })
                .collect::<Option<_>>()?,
        ),
        PropertyKind::Navigation { .. } => PropertyMapKind::Navigation(
            ["Id", "RelECClassId"]
                .iter()
                .map(|member| {
                    let access = format!("{access}.{member}");
                    let column = column(&access)?;
                    Some(PropertyMap::new(property, access, PropertyMapKind::Primitive(column)))
                })
                .collect::<Option<_>>()?,
        ),
    };

    Some(PropertyMap::new(property, access, kind))
}
