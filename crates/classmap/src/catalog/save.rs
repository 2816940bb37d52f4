use crate::{session::MappingSession, Result, Storage};

use classmap_core::{
    err,
    schema::{
        app::ClassId,
        db::{self, ColumnId, TableId},
        mapping::{ClassMap, MapState},
    },
    stmt::Value,
};

/// Writes the physical model and every new or changed class map.
pub(crate) fn save(storage: &mut dyn Storage, session: &mut MappingSession) -> Result<()> {
    save_tables(storage, &mut session.db)?;
    save_foreign_keys(storage, &session.db)?;
    save_indexes(storage, &mut session.db)?;

    for class_map in session.mapping.classes.values_mut() {
        match class_map.state {
            MapState::Persisted => continue,
            MapState::New => insert_class_map(storage, class_map)?,
            MapState::Updated => update_class_map(storage, class_map)?,
        }

        save_property_maps(storage, &session.db, class_map)?;
        class_map.state = MapState::Persisted;
    }

    Ok(())
}

/// Deletes the rows of a property map, including nested members.
pub(crate) fn delete_property_maps(
    storage: &mut dyn Storage,
    class: ClassId,
    access: &str,
) -> Result<usize> {
    storage.execute(
        r#"DELETE FROM "ec_PropertyMap" WHERE "ClassId" = ?1 AND ("AccessString" = ?2 OR "AccessString" LIKE ?3)"#,
        &[class.0.into(), access.into(), format!("{access}.%").into()],
    )
}

/// Deletes the catalog rows of a table and of everything referring to
/// its columns.
pub(crate) fn delete_table(storage: &mut dyn Storage, table: i64) -> Result<()> {
    const COLUMNS: &str = r#"SELECT "Id" FROM "ec_Column" WHERE "TableId" = ?1"#;

    for sql in [
        format!(r#"DELETE FROM "ec_PropertyMap" WHERE "ColumnId" IN ({COLUMNS})"#),
        format!(r#"DELETE FROM "ec_IndexColumn" WHERE "ColumnId" IN ({COLUMNS})"#),
        r#"DELETE FROM "ec_IndexColumn" WHERE "IndexId" IN (SELECT "Id" FROM "ec_Index" WHERE "TableId" = ?1)"#.to_string(),
        r#"DELETE FROM "ec_Index" WHERE "TableId" = ?1"#.to_string(),
        format!(r#"DELETE FROM "ec_ForeignKey" WHERE "TableId" = ?1 OR "ReferencedColumnId" IN ({COLUMNS})"#),
        r#"DELETE FROM "ec_Column" WHERE "TableId" = ?1"#.to_string(),
        r#"DELETE FROM "ec_Table" WHERE "Id" = ?1"#.to_string(),
    ] {
        storage.execute(&sql, &[table.into()])?;
    }

    Ok(())
}

fn save_tables(storage: &mut dyn Storage, db: &mut db::Schema) -> Result<()> {
    for index in 0..db.tables.len() {
        let id = TableId(index);

        if db.table(id).dropped {
            continue;
        }

        if db.table(id).catalog_id.is_none() {
            let table = db.table(id);
            let parent = match table.parent {
                Some(parent) => Some(catalog_id_of_table(db, parent)?),
                None => None,
            };

            let catalog_id = storage.insert(
                r#"INSERT INTO "ec_Table" ("Name", "Type", "ExclusiveRootClassId", "ParentTableId") VALUES (?1, ?2, ?3, ?4)"#,
                &[
                    table.name.as_str().into(),
                    table.ty.as_str().into(),
                    table.exclusive_root_class.map(|class| class.0).into(),
                    parent.into(),
                ],
            )?;

            db.table_mut(id).catalog_id = Some(catalog_id);
        }

        let table_catalog_id = catalog_id_of_table(db, id)?;

        for index in 0..db.table(id).columns.len() {
            let column_id = ColumnId { table: id, index };
            let primary_key = db.table(id).primary_key == Some(column_id);
            let column = db.column(column_id);

            match column.catalog_id {
                Some(catalog_id) => {
                    storage.execute(
                        r#"UPDATE "ec_Column" SET "ColumnKind" = ?1 WHERE "Id" = ?2"#,
                        &[i64::from(column.kind.bits()).into(), catalog_id.into()],
                    )?;
                }
                None => {
                    let catalog_id = storage.insert(
                        r#"INSERT INTO "ec_Column" ("TableId", "Name", "Type", "IsVirtual", "Ordinal", "NotNull", "IsUnique", "CollationConstraint", "DefaultConstraint", "CheckConstraint", "OrdinalInPrimaryKey", "ColumnKind") VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"#,
                        &[
                            table_catalog_id.into(),
                            column.name.as_str().into(),
                            column.ty.as_str().into(),
                            column.is_virtual().into(),
                            i64::try_from(index)?.into(),
                            column.not_null.into(),
                            column.unique.into(),
                            column.collation.as_deref().into(),
                            column.default.as_deref().into(),
                            column.check.as_deref().into(),
                            if primary_key { Value::I64(1) } else { Value::Null },
                            i64::from(column.kind.bits()).into(),
                        ],
                    )?;
                    db.column_mut(column_id).catalog_id = Some(catalog_id);
                }
            }
        }
    }

    Ok(())
}

/// Foreign keys carry no identity worth keeping, so they are rewritten.
fn save_foreign_keys(storage: &mut dyn Storage, db: &db::Schema) -> Result<()> {
    storage.execute(r#"DELETE FROM "ec_ForeignKey""#, &[])?;

    for table in db.live_tables() {
        for fk in &table.foreign_keys {
            storage.insert(
                r#"INSERT INTO "ec_ForeignKey" ("TableId", "ColumnId", "ReferencedColumnId", "OnDelete") VALUES (?1, ?2, ?3, ?4)"#,
                &[
                    catalog_id_of_table(db, table.id)?.into(),
                    catalog_id_of_column(db, fk.column)?.into(),
                    catalog_id_of_column(db, fk.references)?.into(),
                    fk.on_delete.as_str().into(),
                ],
            )?;
        }
    }

    Ok(())
}

fn save_indexes(storage: &mut dyn Storage, db: &mut db::Schema) -> Result<()> {
    let mut new_indexes = vec![];

    for table in db.live_tables() {
        for index in &table.indices {
            if index.catalog_id.is_none() {
                new_indexes.push(index.id);
            }
        }
    }

    for id in new_indexes {
        let index = db.index(id);

        let class_filter = match &index.class_filter {
            Some(classes) => Some(serde_json::to_string(
                &classes.iter().map(|class| class.0).collect::<Vec<_>>(),
            )?),
            None => None,
        };

        let catalog_id = storage.insert(
            r#"INSERT INTO "ec_Index" ("Name", "TableId", "ClassId", "IsUnique", "AddNotNullWhereExp", "IsAutoGenerated", "AppliesToSubclassesIfPartial", "ClassFilter") VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            &[
                index.name.as_str().into(),
                catalog_id_of_table(db, index.on)?.into(),
                index.class.map(|class| class.0).into(),
                index.unique.into(),
                index.where_not_null.into(),
                index.auto_generated.into(),
                true.into(),
                class_filter.into(),
            ],
        )?;

        for (ordinal, column) in index.columns.iter().enumerate() {
            storage.execute(
                r#"INSERT INTO "ec_IndexColumn" ("IndexId", "ColumnId", "Ordinal") VALUES (?1, ?2, ?3)"#,
                &[
                    catalog_id.into(),
                    catalog_id_of_column(db, *column)?.into(),
                    i64::try_from(ordinal)?.into(),
                ],
            )?;
        }

        db.table_mut(id.table).indices[id.index].catalog_id = Some(catalog_id);
    }

    Ok(())
}

fn insert_class_map(storage: &mut dyn Storage, class_map: &ClassMap) -> Result<()> {
    storage.execute(
        r#"INSERT INTO "ec_ClassMap" ("ClassId", "MapStrategy", "AppliesToSubclasses", "ShareColumnsMode", "MaxSharedColumnsBeforeOverflow", "JoinedTableInfo") VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        &class_map_params(class_map),
    )?;
    Ok(())
}

fn update_class_map(storage: &mut dyn Storage, class_map: &ClassMap) -> Result<()> {
    storage.execute(
        r#"UPDATE "ec_ClassMap" SET "MapStrategy" = ?2, "AppliesToSubclasses" = ?3, "ShareColumnsMode" = ?4, "MaxSharedColumnsBeforeOverflow" = ?5, "JoinedTableInfo" = ?6 WHERE "ClassId" = ?1"#,
        &class_map_params(class_map),
    )?;
    Ok(())
}

fn class_map_params(class_map: &ClassMap) -> [Value; 6] {
    let strategy = &class_map.strategy;
    let tph = strategy.tph;

    [
        class_map.class.0.into(),
        strategy.strategy.as_str().into(),
        strategy.applies_to_subclasses.into(),
        tph.map(|tph| tph.share_columns.as_str()).into(),
        tph.and_then(|tph| tph.max_shared_columns_before_overflow)
            .map(i64::from)
            .into(),
        tph.map(|tph| tph.joined_table.as_str()).into(),
    ]
}

/// Rewrites every property map row of the class, system maps first.
fn save_property_maps(
    storage: &mut dyn Storage,
    db: &db::Schema,
    class_map: &ClassMap,
) -> Result<()> {
    let class = class_map.class;

    storage.execute(
        r#"DELETE FROM "ec_PropertyMap" WHERE "ClassId" = ?1"#,
        &[class.0.into()],
    )?;

    let mut rows: Vec<(&str, ColumnId)> = vec![];

    for system in &class_map.system {
        for column in &system.columns {
            rows.push((system.kind.access_string(), *column));
        }
    }

    for leaf in class_map.leaves() {
        if let Some(column) = leaf.column() {
            rows.push((leaf.access.as_str(), column));
        }
    }

    for (access, column) in rows {
        storage.insert(
            r#"INSERT INTO "ec_PropertyMap" ("ClassId", "AccessString", "ColumnId") VALUES (?1, ?2, ?3)"#,
            &[class.0.into(), access.into(), catalog_id_of_column(db, column)?.into()],
        )?;
    }

    Ok(())
}

fn catalog_id_of_table(db: &db::Schema, id: TableId) -> Result<i64> {
    let table = db.table(id);
    table
        .catalog_id
        .ok_or_else(|| err!("table `{}` has not been saved", table.name))
}

fn catalog_id_of_column(db: &db::Schema, id: ColumnId) -> Result<i64> {
    let column = db.column(id);
    column.catalog_id.ok_or_else(|| {
        err!(
            "column `{}.{}` has not been saved",
            db.table(id.table).name,
            column.name
        )
    })
}
