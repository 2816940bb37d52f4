use super::Ident;

use classmap_core::schema::db::{Column, ColumnType, OnDelete};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: Ident,

    /// `None` declares the column without a type
    pub ty: Option<ColumnType>,

    pub not_null: bool,

    pub unique: bool,

    pub collation: Option<String>,

    pub default: Option<String>,

    pub check: Option<String>,

    /// Inline `REFERENCES` clause, only used when adding a column to an
    /// existing table.
    pub references: Option<References>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct References {
    pub table: Ident,
    pub column: Ident,
    pub on_delete: OnDelete,
}

impl ColumnDef {
    pub fn from_schema(column: &Column) -> ColumnDef {
        ColumnDef {
            name: Ident::from(&column.name),
            ty: match column.ty {
                ColumnType::Any => None,
                ty => Some(ty),
            },
            not_null: column.not_null,
            unique: column.unique,
            collation: column.collation.clone(),
            default: column.default.clone(),
            check: column.check.clone(),
            references: None,
        }
    }
}
