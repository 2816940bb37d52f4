use super::{ColumnDef, Ident, References, Statement};

use classmap_core::schema::db::{ColumnId, Schema};

/// A statement to add a column to a table.
#[derive(Debug, Clone, PartialEq)]
pub struct AddColumn {
    /// Name of the table to add the column to.
    pub table: Ident,

    /// Column definition.
    pub column: ColumnDef,
}

impl Statement {
    /// Adds a column to a table. A single-column foreign key on the column
    /// becomes an inline `REFERENCES` clause when `with_foreign_key` is set.
    pub fn add_column(schema: &Schema, column: ColumnId, with_foreign_key: bool) -> Self {
        let table = schema.table(column.table);
        let mut def = ColumnDef::from_schema(schema.column(column));

        if with_foreign_key {
            def.references = table
                .foreign_keys
                .iter()
                .find(|fk| fk.column == column)
                .map(|fk| References {
                    table: Ident::from(&schema.table(fk.references.table).name),
                    column: Ident::from(&schema.column(fk.references).name),
                    on_delete: fk.on_delete,
                });
        }

        AddColumn {
            table: Ident::from(&table.name),
            column: def,
        }
        .into()
    }
}

impl From<AddColumn> for Statement {
    fn from(value: AddColumn) -> Self {
        Self::AddColumn(value)
    }
}
