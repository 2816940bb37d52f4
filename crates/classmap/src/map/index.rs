use super::Mapper;
use crate::{Error, Result};

use classmap_core::schema::{
    app::{ClassId, DbIndexDef},
    db::{ColumnId, Index, IndexId, TableId},
    mapping::ClassMap,
};

/// An index requested by a class, before it is bound to a table.
struct IndexRequest {
    name: Option<String>,
    unique: bool,
    where_not_null: bool,
    properties: Vec<String>,
    auto_generated: bool,

    /// `BusinessKey`, `GlobalId` or `SyncId` for implicit unique indexes.
    key: Option<&'static str>,
}

impl Mapper<'_> {
    /// Adds declared indexes and the implicit unique indexes of unique
    /// key attributes, then copies each one to the other tables the
    /// declaring subtree spans.
    pub(super) fn build_indexes(&mut self) -> Result<()> {
        let classes: Vec<ClassId> = self.session.app.classes.keys().copied().collect();

        for class in classes {
            let Some(class_map) = self.session.mapping.get(class) else {
                continue;
            };

            if class_map.is_not_mapped() || class_map.primary_table().is_none() {
                continue;
            }

            for request in self.index_requests(class) {
                self.build_index(class, &request)
                    .map_err(|err| err.context(classmap_core::err!(
                        "indexing class `{}`",
                        self.session.app.qualified_name(class)
                    )))?;
            }
        }

        Ok(())
    }

    fn index_requests(&self, class: ClassId) -> Vec<IndexRequest> {
        let attrs = &self.session.app.class(class).attrs;

        let declared = attrs.indexes.iter().map(|def: &DbIndexDef| IndexRequest {
            name: Some(def.name.clone()),
            unique: def.unique,
            where_not_null: def.where_not_null,
            properties: def.properties.clone(),
            auto_generated: false,
            key: None,
        });

        let keys = attrs.unique_keys.iter().map(|key| IndexRequest {
            name: None,
            unique: true,
            where_not_null: false,
            properties: vec![key.property.clone()],
            auto_generated: true,
            key: Some(key.kind.as_str()),
        });

        declared.chain(keys).collect()
    }

    fn build_index(&mut self, class: ClassId, request: &IndexRequest) -> Result<()> {
        let class_map = self.session.mapping.class(class);
        let Some((table, columns)) = self.index_columns(class_map, request)? else {
            return Ok(());
        };

        let name = match (&request.name, request.key) {
            (Some(name), _) => name.clone(),
            (None, key) => format!(
                "uix_{}_{}_{}",
                self.session.db.table(table).name,
                key.unwrap_or("key"),
                request.properties.join("_").replace('.', "_")
            ),
        };

        self.add_index(class, &name, table, columns, request);

        // Subclasses whose values land in another table get a copy there.
        for derived in self.session.app.descendants(class) {
            let Some(derived_map) = self.session.mapping.get(derived) else {
                continue;
            };

            if derived_map.is_not_mapped() {
                continue;
            }

            let Some((derived_table, columns)) = self.index_columns(derived_map, request)? else {
                continue;
            };

            if derived_table == table {
                continue;
            }

            let copy = format!("{name}_{}", self.session.db.table(derived_table).name);
            self.add_index(class, &copy, derived_table, columns, request);
        }

        Ok(())
    }

    /// Columns of the indexed properties and the one table holding them.
    /// `None` when the table is never created by the engine.
    fn index_columns(
        &self,
        class_map: &ClassMap,
        request: &IndexRequest,
    ) -> Result<Option<(TableId, Vec<ColumnId>)>> {
        let app = &self.session.app;
        let db = &self.session.db;

        let mut columns = vec![];
        for access in &request.properties {
            let Some(map) = class_map.find(access) else {
                return Err(Error::invalid_schema(format!(
                    "index on class `{}` refers to unknown property `{access}`",
                    app.qualified_name(class_map.class)
                )));
            };
            columns.extend(map.columns());
        }

        let Some(first) = columns.first() else {
            return Ok(None);
        };

        let table = first.table;
        if columns.iter().any(|column| column.table != table) {
            return Err(Error::structural_conflict(format!(
                "index over {} of class `{}` spans more than one table",
                request.properties.join(", "),
                app.qualified_name(class_map.class)
            )));
        }

        let table_ref = db.table(table);
        if table_ref.is_virtual() || table_ref.is_existing() {
            return Ok(None);
        }

        Ok(Some((table, columns)))
    }

    fn add_index(
        &mut self,
        class: ClassId,
        name: &str,
        table: TableId,
        columns: Vec<ColumnId>,
        request: &IndexRequest,
    ) {
        if self.session.db.find_index(name).is_some() {
            return;
        }

        let class_filter = self.class_filter(class, table);

        log::debug!(
            "adding index; name={name} table={} partial={}",
            self.session.db.table(table).name,
            class_filter.is_some()
        );

        self.session.db.add_index(Index {
            id: IndexId::placeholder(),
            name: name.to_string(),
            on: table,
            columns,
            unique: request.unique,
            where_not_null: request.where_not_null,
            class_filter,
            class: Some(class),
            auto_generated: request.auto_generated,
            catalog_id: None,
        });
    }

    /// Restricts the index to the subtree of `class` when other classes
    /// store rows in the same table.
    fn class_filter(&self, class: ClassId, table: TableId) -> Option<Vec<ClassId>> {
        if !self.storage.capability().partial_indexes {
            return None;
        }

        let mut subtree = vec![class];
        subtree.extend(self.session.app.descendants(class));

        let shared = self.session.mapping.classes.values().any(|class_map| {
            !class_map.is_not_mapped()
                && class_map.tables.contains(&table)
                && !subtree.contains(&class_map.class)
        });

        if !shared {
            return None;
        }

        subtree.sort();
        Some(subtree)
    }
}
