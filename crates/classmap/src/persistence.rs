//! Brings storage in line with the physical model: creates tables, adds
//! columns and creates indexes.

use crate::{Error, Result, Storage};

use classmap_core::schema::db::{self, Table};
use classmap_sql::{Serializer, Statement};

use std::collections::HashSet;

/// Creates missing tables and adds missing columns. Returns the number of
/// DDL statements issued.
pub(crate) fn sync_tables(storage: &mut dyn Storage, db: &db::Schema, serializer: &Serializer) -> Result<usize> {
    let mut issued = 0;

    for table in db.live_tables() {
        if table.is_existing() {
            check_existing_table(storage, table)?;
            continue;
        }

        if !table.is_managed() {
            continue;
        }

        if !storage.table_exists(&table.name)? {
            let sql = serializer.serialize(&Statement::create_table(db, table.id));
            log::info!("creating table; name={}", table.name);
            log::debug!("{sql}");

            storage.execute_ddl(&sql)?;
            issued += 1;
            continue;
        }

        issued += add_missing_columns(storage, db, table, serializer)?;
    }

    Ok(issued)
}

fn add_missing_columns(
    storage: &mut dyn Storage,
    db: &db::Schema,
    table: &Table,
    serializer: &Serializer,
) -> Result<usize> {
    let stored: HashSet<String> = storage
        .columns(&table.name)?
        .into_iter()
        .map(|column| column.name.to_ascii_lowercase())
        .collect();

    let modeled: HashSet<String> = table
        .physical_columns()
        .map(|column| column.name.to_ascii_lowercase())
        .collect();

    if let Some(unknown) = stored.iter().find(|name| !modeled.contains(*name)) {
        return Err(Error::physical_schema_drift(format!(
            "table `{}` has column `{unknown}` which is not part of the mapping",
            table.name
        )));
    }

    let with_foreign_key = storage.capability().add_column_with_foreign_key;
    let mut issued = 0;

    for column in table.physical_columns() {
        if stored.contains(&column.name.to_ascii_lowercase()) {
            continue;
        }

        if table.primary_key == Some(column.id) {
            return Err(Error::physical_schema_drift(format!(
                "table `{}` is missing its primary key column `{}`",
                table.name, column.name
            )));
        }

        let sql = serializer.serialize(&Statement::add_column(db, column.id, with_foreign_key));
        log::debug!("{sql}");

        storage.execute_ddl(&sql)?;
        issued += 1;
    }

    if issued > 0 {
        log::info!("added columns; table={} count={issued}", table.name);
    }

    Ok(issued)
}

/// Existing tables are never altered; every column the mapping binds to
/// must already be there.
fn check_existing_table(storage: &mut dyn Storage, table: &Table) -> Result<()> {
    let stored: HashSet<String> = storage
        .columns(&table.name)?
        .into_iter()
        .map(|column| column.name.to_ascii_lowercase())
        .collect();

    if stored.is_empty() {
        return Err(Error::physical_schema_drift(format!(
            "existing table `{}` does not exist in the database",
            table.name
        )));
    }

    for column in table.physical_columns() {
        if !stored.contains(&column.name.to_ascii_lowercase()) {
            return Err(Error::physical_schema_drift(format!(
                "existing table `{}` has no column `{}`",
                table.name, column.name
            )));
        }
    }

    Ok(())
}

/// Creates every index of a managed table that storage does not have yet.
pub(crate) fn create_indexes(storage: &mut dyn Storage, db: &db::Schema, serializer: &Serializer) -> Result<usize> {
    let partial = storage.capability().partial_indexes;
    let mut created = 0;

    for table in db.live_tables() {
        if !table.is_managed() {
            continue;
        }

        for index in &table.indices {
            if storage.index_exists(&index.name)? {
                continue;
            }

            let stmt = if index.class_filter.is_some() && !partial {
                let mut index = index.clone();
                index.class_filter = None;
                Statement::create_index(db, &index)
            } else {
                Statement::create_index(db, index)
            };

            let sql = serializer.serialize(&stmt);
            log::debug!("{sql}");

            storage.execute_ddl(&sql)?;
            created += 1;
        }
    }

    if created > 0 {
        log::info!("created indexes; count={created}");
    }

    Ok(created)
}
