use super::{Flavor, Formatter, ToSql};

use crate::stmt::{ColumnDef, References};

impl ToSql for &ColumnDef {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, &self.name);

        match self.ty {
            Some(ty) => fmt!(f, " " ty),
            // PostgreSQL requires a type on every column
            None if f.serializer.flavor == Flavor::Postgresql => fmt!(f, " TEXT"),
            None => {}
        }

        if self.not_null {
            fmt!(f, " NOT NULL");
        }

        if self.unique {
            fmt!(f, " UNIQUE");
        }

        if let Some(collation) = &self.collation {
            fmt!(f, " COLLATE " collation.as_str());
        }

        if let Some(default) = &self.default {
            fmt!(f, " DEFAULT " default.as_str());
        }

        if let Some(check) = &self.check {
            fmt!(f, " CHECK (" check.as_str() ")");
        }

        if let Some(references) = &self.references {
            fmt!(f, " " references);
        }
    }
}

impl ToSql for &References {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = &self.table;
        let column = &self.column;

        fmt!(
            f, "REFERENCES " table " (" column ") ON DELETE " self.on_delete.as_sql()
        );
    }
}
