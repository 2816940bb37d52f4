use super::{ColumnDef, Ident, References, Statement};

use classmap_core::schema::db::{Schema, TableId};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    /// Name of the table
    pub name: Ident,

    /// Column definitions, physical columns only
    pub columns: Vec<ColumnDef>,

    /// Primary key column
    pub primary_key: Option<Ident>,

    pub foreign_keys: Vec<ForeignKeyDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyDef {
    pub column: Ident,
    pub references: References,
}

impl Statement {
    /// Creates a table with all of its physical columns and constraints.
    pub fn create_table(schema: &Schema, table: TableId) -> Self {
        let table = schema.table(table);

        CreateTable {
            name: Ident::from(&table.name),
            columns: table.physical_columns().map(ColumnDef::from_schema).collect(),
            primary_key: table
                .primary_key
                .map(|pk| Ident::from(&schema.column(pk).name)),
            foreign_keys: table
                .foreign_keys
                .iter()
                .map(|fk| {
                    let referenced = schema.table(fk.references.table);
                    ForeignKeyDef {
                        column: Ident::from(&schema.column(fk.column).name),
                        references: References {
                            table: Ident::from(&referenced.name),
                            column: Ident::from(&schema.column(fk.references).name),
                            on_delete: fk.on_delete,
                        },
                    }
                })
                .collect(),
        }
        .into()
    }
}

impl From<CreateTable> for Statement {
    fn from(value: CreateTable) -> Self {
        Self::CreateTable(value)
    }
}
