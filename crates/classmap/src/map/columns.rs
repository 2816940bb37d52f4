use super::Mapper;
use crate::{Error, Result};

use classmap_core::schema::{
    app::{ClassId, PropertyAttrs},
    db::{ColumnId, ColumnKind, ColumnType, TableId, TableType},
    mapping::{MapStrategy, Strategy},
};

use std::collections::HashSet;

/// Where new data columns of a class go.
pub(super) struct ColumnTarget<'a> {
    pub(super) class: ClassId,
    pub(super) table: TableId,
    pub(super) strategy: &'a MapStrategy,
}

impl Mapper<'_> {
    /// Picks the column for one mapped value: a shared column when the
    /// class uses shared columns, a dedicated one otherwise.
    pub(super) fn data_column(
        &mut self,
        target: &ColumnTarget<'_>,
        name: &str,
        ty: ColumnType,
        attrs: Option<&PropertyAttrs>,
        claimed: &mut Vec<ColumnId>,
    ) -> Result<ColumnId> {
        let column = if target.strategy.uses_shared_columns() {
            self.shared_column(target, claimed)?
        } else {
            self.dedicated_column(target, name, ty, attrs, claimed)?
        };

        claimed.push(column);
        Ok(column)
    }

    /// Columns claimed by the classes the class shares rows with: its
    /// ancestors and its descendants.
    fn lineage_columns(&self, class: ClassId) -> HashSet<ColumnId> {
        let app = &self.session.app;
        let mapping = &self.session.mapping;

        app.ancestors(class)
            .into_iter()
            .chain(app.descendants(class))
            .filter(|related| *related != class)
            .filter_map(|related| mapping.get(related))
            .flat_map(|class_map| class_map.data_columns())
            .collect()
    }

    fn shared_column(&mut self, target: &ColumnTarget<'_>, claimed: &[ColumnId]) -> Result<ColumnId> {
        let mut excluded = self.lineage_columns(target.class);
        excluded.extend(claimed.iter().copied());

        let max_shared = target
            .strategy
            .tph
            .and_then(|tph| tph.max_shared_columns_before_overflow)
            .map(|max| max as usize);

        let max_columns = self.options.max_columns_per_table;
        let mut table_id = target.table;

        loop {
            let table = self.session.db.table(table_id);

            if let Some(column) = table
                .shared_columns()
                .find(|column| !excluded.contains(&column.id))
            {
                return Ok(column.id);
            }

            let shared = table.shared_columns().count();
            let has_room = match (table.ty, max_shared) {
                (TableType::Overflow, _) | (_, None) => table.columns.len() < max_columns,
                (_, Some(max)) => shared < max && table.columns.len() < max_columns,
            };

            if has_room {
                let prefix = match table.ty {
                    TableType::Joined => "js",
                    TableType::Overflow => "os",
                    _ => "ps",
                };

                let name = format!("{prefix}{}", shared + 1);
                let id = self.session.db.table_mut(table_id).add_column(name, ColumnType::Any);
                self.session.db.column_mut(id).kind = ColumnKind::SHARED_DATA;
                return Ok(id);
            }

            if table.ty == TableType::Overflow {
                return Err(Error::structural_conflict(format!(
                    "overflow table `{}` has reached the limit of {max_columns} columns",
                    table.name
                )));
            }

            table_id = self.overflow_table(table_id)?;
        }
    }

    fn dedicated_column(
        &mut self,
        target: &ColumnTarget<'_>,
        name: &str,
        ty: ColumnType,
        attrs: Option<&PropertyAttrs>,
        claimed: &[ColumnId],
    ) -> Result<ColumnId> {
        let table = self.session.db.table(target.table);

        if table.is_existing() {
            return match table.find_column(name) {
                Some(column) => Ok(column.id),
                None => Err(Error::physical_schema_drift(format!(
                    "existing table `{}` has no column `{name}` for class `{}`",
                    table.name,
                    self.session.app.qualified_name(target.class)
                ))),
            };
        }

        let mut used = self.lineage_columns(target.class);
        used.extend(claimed.iter().copied());

        let table = self.session.db.table(target.table);
        let mut column_name = name.to_string();

        if let Some(existing) = table.find_column(name) {
            let reusable = existing.kind == ColumnKind::DEFAULT
                && ty.is_compatible(existing.ty)
                && !used.contains(&existing.id);

            if reusable {
                return Ok(existing.id);
            }

            column_name = unique_column_name(target.class, name, |candidate| {
                table.find_column(candidate).is_some()
            });
        }

        if table.is_managed() && table.columns.len() >= self.options.max_columns_per_table {
            return Err(Error::structural_conflict(format!(
                "table `{}` has reached the limit of {} columns",
                table.name, self.options.max_columns_per_table
            )));
        }

        // Constraints can only be declared while the table is created.
        let constrained = table.catalog_id.is_none() && target.strategy.strategy != Strategy::SharedTable;

        let id = self
            .session
            .db
            .table_mut(target.table)
            .add_column(column_name, ty);

        if let (true, Some(attrs)) = (constrained, attrs) {
            let column = self.session.db.column_mut(id);
            column.not_null = attrs.not_null;
            column.unique = attrs.unique;
            column.collation = attrs.collation.clone();
        }

        Ok(id)
    }
}

/// `c{classid:x}_{name}`, then `_{n}` until the name is free.
fn unique_column_name(class: ClassId, name: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = format!("c{class:x}_{name}");
    let mut candidate = base.clone();
    let mut n = 1;

    while taken(&candidate) {
        candidate = format!("{base}_{n}");
        n += 1;
    }

    candidate
}

/// Dedicated column name of a mapped value.
pub(super) fn column_name(access: &str, attrs: Option<&PropertyAttrs>) -> String {
    match attrs.and_then(|attrs| attrs.column_name.as_deref()) {
        Some(name) => name.to_string(),
        None => access.replace('.', "_"),
    }
}
