//! Drops tables no class map refers to any more.

use crate::{catalog, session::MappingSession, Error, Result, Storage};

use classmap_core::schema::db::{self, TableId};
use classmap_sql::{Serializer, Statement};

use std::collections::HashSet;

pub(crate) fn purge(
    storage: &mut dyn Storage,
    session: &mut MappingSession,
    serializer: &Serializer,
    allow_drops: bool,
) -> Result<()> {
    let mut orphans = orphan_tables(session);

    if orphans.is_empty() {
        return Ok(());
    }

    let physical: Vec<&str> = orphans
        .iter()
        .map(|table| session.db.table(*table))
        .filter(|table| table.is_managed())
        .map(|table| table.name.as_str())
        .collect();

    if !allow_drops && !physical.is_empty() {
        return Err(Error::structural_conflict(format!(
            "the import requires dropping tables {}, which is not allowed",
            physical
                .iter()
                .map(|name| format!("`{name}`"))
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    // Children reference their parent, so they go first.
    orphans.sort_by_key(|table| std::cmp::Reverse(depth(&session.db, *table)));

    for id in orphans {
        let table = session.db.table(id);

        if table.is_managed() && storage.table_exists(&table.name)? {
            let sql = serializer.serialize(&Statement::drop_table(&table.name));
            log::debug!("{sql}");
            storage.execute_ddl(&sql)?;
        }

        if let Some(catalog_id) = table.catalog_id {
            catalog::delete_table(storage, catalog_id)?;
        }

        log::info!("dropped table; name={}", table.name);

        for other in &mut session.db.tables {
            other.foreign_keys.retain(|fk| fk.references.table != id);
        }

        let table = session.db.table_mut(id);
        table.dropped = true;
        table.catalog_id = None;
    }

    Ok(())
}

/// Live tables that neither hold data of a class nor carry one of its
/// system properties.
fn orphan_tables(session: &MappingSession) -> Vec<TableId> {
    let mut referenced = HashSet::new();

    for class_map in session.mapping.classes.values() {
        referenced.extend(class_map.tables.iter().copied());
        referenced.extend(
            class_map
                .system
                .iter()
                .flat_map(|system| system.columns.iter().map(|column| column.table)),
        );
        referenced.extend(class_map.data_columns().into_iter().map(|column| column.table));
    }

    // A table stays while one of its children is in use.
    let mut changed = true;
    while changed {
        changed = false;
        for table in session.db.live_tables() {
            if let Some(parent) = table.parent {
                if referenced.contains(&table.id) && referenced.insert(parent) {
                    changed = true;
                }
            }
        }
    }

    session
        .db
        .live_tables()
        .filter(|table| !referenced.contains(&table.id))
        .map(|table| table.id)
        .collect()
}

fn depth(db: &db::Schema, table: TableId) -> usize {
    let mut depth = 0;
    let mut current = db.table(table).parent;

    while let Some(parent) = current {
        depth += 1;
        current = db.table(parent).parent;
    }

    depth
}
