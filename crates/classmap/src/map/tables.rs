use super::{resolve::TableInfo, Mapper};
use crate::{catalog, Error, Result};

use classmap_core::schema::db::{
    ColumnId, ColumnKind, ColumnType, ForeignKey, Index, IndexId, OnDelete, Persistence, TableId,
    TableType, CLASS_ID_COLUMN,
};

impl Mapper<'_> {
    pub(super) fn find_or_create_table(&mut self, info: &TableInfo) -> Result<TableId> {
        if let Some(id) = self.session.db.find_table(&info.name) {
            let table = self.session.db.table(id);

            if table.ty != info.ty {
                return Err(Error::structural_conflict(format!(
                    "table `{}` is used as {} table and cannot be mapped as {} table",
                    table.name,
                    table.ty.as_str(),
                    info.ty.as_str()
                )));
            }

            if let (Some(existing), Some(requested)) = (table.exclusive_root_class, info.exclusive_root) {
                if existing != requested {
                    return Err(Error::structural_conflict(format!(
                        "table `{}` is owned by class `{}` and cannot be used by `{}`",
                        table.name,
                        self.session.app.qualified_name(existing),
                        self.session.app.qualified_name(requested)
                    )));
                }
            }

            return Ok(id);
        }

        if catalog::is_catalog_table(&info.name) {
            return Err(Error::structural_conflict(format!(
                "table name `{}` is reserved for the system catalog",
                info.name
            )));
        }

        match info.ty {
            TableType::Existing => self.load_existing_table(info),
            TableType::Virtual => Ok(self.create_table(info)),
            _ => {
                if self.storage.table_exists(&info.name)? {
                    return Err(Error::structural_conflict(format!(
                        "table `{}` already exists in the database but is not known to the mapping",
                        info.name
                    )));
                }

                log::debug!("adding table; name={} type={:?}", info.name, info.ty);
                Ok(self.create_table(info))
            }
        }
    }

    fn create_table(&mut self, info: &TableInfo) -> TableId {
        let db = &mut self.session.db;
        let id = db.create_table(info.name.clone(), info.ty);

        let table = db.table_mut(id);
        table.exclusive_root_class = info.exclusive_root;

        let instance_id = table.add_column(info.instance_id_column.clone(), ColumnType::Integer);
        table.primary_key = Some(instance_id);

        let column = db.column_mut(instance_id);
        column.kind = ColumnKind::INSTANCE_ID;
        column.not_null = true;

        self.add_class_id_column(id, info.physical_class_id);
        id
    }

    /// Existing tables are described by storage. The engine only adds a
    /// virtual class id column.
    fn load_existing_table(&mut self, info: &TableInfo) -> Result<TableId> {
        let columns = self.storage.columns(&info.name)?;

        if columns.is_empty() {
            return Err(Error::physical_schema_drift(format!(
                "existing table `{}` does not exist in the database",
                info.name
            )));
        }

        let primary_key: Vec<_> = columns
            .iter()
            .filter(|column| column.primary_key_ordinal > 0)
            .collect();

        if primary_key.len() > 1 {
            return Err(Error::structural_conflict(format!(
                "existing table `{}` has a multi-column primary key",
                info.name
            )));
        }

        if !columns
            .iter()
            .any(|column| column.name.eq_ignore_ascii_case(&info.instance_id_column))
        {
            return Err(Error::structural_conflict(format!(
                "existing table `{}` has no instance id column `{}`",
                info.name, info.instance_id_column
            )));
        }

        let db = &mut self.session.db;
        let id = db.create_table(info.name.clone(), TableType::Existing);

        for info_column in &columns {
            let column_id = db
                .table_mut(id)
                .add_column(info_column.name.clone(), ColumnType::from_declared(&info_column.declared_type));

            let column = db.column_mut(column_id);
            column.not_null = info_column.not_null;
            column.default = info_column.default.clone();

            if info_column.name.eq_ignore_ascii_case(&info.instance_id_column) {
                column.kind = ColumnKind::INSTANCE_ID;
                if info_column.primary_key_ordinal > 0 {
                    db.table_mut(id).primary_key = Some(column_id);
                }
            }
        }

        self.add_class_id_column(id, false);

        log::debug!("mapped existing table; name={} columns={}", info.name, columns.len());
        Ok(id)
    }

    fn add_class_id_column(&mut self, table: TableId, physical: bool) {
        let db = &mut self.session.db;
        let column_id = db.table_mut(table).add_column(CLASS_ID_COLUMN, ColumnType::Integer);

        let column = db.column_mut(column_id);
        column.kind = ColumnKind::CLASS_ID;

        if physical && db.table(table).is_managed() {
            let column = db.column_mut(column_id);
            column.not_null = true;

            let name = format!("ix_{}_ecclassid", db.table(table).name);
            self.add_auto_index(&name, table, vec![column_id], false, false);
        } else {
            db.column_mut(column_id).persistence = Persistence::Virtual;
        }
    }

    /// Finds or creates the joined table of a class below `parent`.
    pub(super) fn joined_table(&mut self, parent: TableId, name: &str) -> Result<TableId> {
        self.child_table(parent, name.to_string(), TableType::Joined)
    }

    /// Finds or creates the overflow table of `parent`.
    pub(super) fn overflow_table(&mut self, parent: TableId) -> Result<TableId> {
        if let Some(overflow) = self.session.db.overflow_of(parent) {
            return Ok(overflow);
        }

        let name = format!("{}_Overflow", self.session.db.table(parent).name);
        self.child_table(parent, name, TableType::Overflow)
    }

    /// Child tables hold the rest of a row of `parent`, keyed by the same
    /// instance id.
    fn child_table(&mut self, parent: TableId, name: String, ty: TableType) -> Result<TableId> {
        if let Some(id) = self.session.db.find_table(&name) {
            let table = self.session.db.table(id);
            if table.ty != ty || table.parent != Some(parent) {
                return Err(Error::structural_conflict(format!(
                    "table `{name}` cannot be used as {} table of `{}`",
                    ty.as_str(),
                    self.session.db.table(parent).name
                )));
            }
            return Ok(id);
        }

        let parent_table = self.session.db.table(parent);
        let Some(parent_id) = parent_table.instance_id_column().map(|column| column.id) else {
            return Err(classmap_core::err!(
                "table `{}` has no instance id column",
                parent_table.name
            ));
        };

        let info = TableInfo {
            name,
            ty,
            instance_id_column: self.session.db.column(parent_id).name.clone(),
            exclusive_root: parent_table.exclusive_root_class,
            physical_class_id: true,
        };

        let id = self.find_or_create_table(&info)?;

        let table = self.session.db.table_mut(id);
        table.parent = Some(parent);

        let instance_id = table.primary_key.ok_or_else(|| {
            classmap_core::err!("table `{}` has no primary key", info.name)
        })?;

        table.foreign_keys.push(ForeignKey {
            column: instance_id,
            references: parent_id,
            on_delete: OnDelete::Cascade,
        });

        Ok(id)
    }

    /// Returns the column named `name`, adding it when missing.
    pub(super) fn ensure_column(&mut self, table: TableId, name: &str, ty: ColumnType) -> ColumnId {
        if let Some(column) = self.session.db.table(table).find_column(name) {
            return column.id;
        }

        self.session.db.table_mut(table).add_column(name, ty)
    }

    pub(super) fn ensure_virtual_column(&mut self, table: TableId, name: &str, ty: ColumnType) -> ColumnId {
        if let Some(column) = self.session.db.table(table).find_column(name) {
            return column.id;
        }

        let id = self.session.db.table_mut(table).add_column(name, ty);
        self.session.db.column_mut(id).persistence = Persistence::Virtual;
        id
    }

    /// Adds an engine generated index unless one with the same name exists.
    pub(super) fn add_auto_index(
        &mut self,
        name: &str,
        table: TableId,
        columns: Vec<ColumnId>,
        unique: bool,
        where_not_null: bool,
    ) {
        if self.session.db.find_index(name).is_some() {
            return;
        }

        self.session.db.add_index(Index {
            id: IndexId::placeholder(),
            name: name.to_string(),
            on: table,
            columns,
            unique,
            where_not_null,
            class_filter: None,
            class: None,
            auto_generated: true,
            catalog_id: None,
        });
    }
}
