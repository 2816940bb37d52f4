use super::{Comma, Formatter, ToSql};

use crate::stmt::{self, Statement};

impl ToSql for &Statement {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            Statement::AddColumn(stmt) => stmt.to_sql(f),
            Statement::Count(stmt) => stmt.to_sql(f),
            Statement::CreateIndex(stmt) => stmt.to_sql(f),
            Statement::CreateTable(stmt) => stmt.to_sql(f),
            Statement::DropTable(stmt) => stmt.to_sql(f),
            Statement::InsertSelect(stmt) => stmt.to_sql(f),
            Statement::Update(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::AddColumn {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = &self.table;
        let column = &self.column;

        fmt!(f, "ALTER TABLE " table " ADD COLUMN " column);
    }
}

impl ToSql for &stmt::Count {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = &self.table;

        fmt!(f, "SELECT COUNT(*) FROM " table);

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}

impl ToSql for &stmt::CreateIndex {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let unique = if self.unique { "UNIQUE " } else { "" };
        let index_name = &self.name;
        let table_name = &self.on;

        fmt!(
            f, "CREATE " unique "INDEX " index_name " ON " table_name " (" Comma(&self.columns) ")"
        );

        if !self.filter.is_empty() {
            let mut s = " WHERE ";
            for predicate in &self.filter {
                fmt!(f, s predicate);
                s = " AND ";
            }
        }
    }
}

impl ToSql for &stmt::CreateTable {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table_name = &self.name;

        fmt!(f, "CREATE TABLE " table_name " (");

        let mut s = "\n    ";
        for column in &self.columns {
            fmt!(f, s column);
            s = ",\n    ";
        }

        if let Some(pk) = &self.primary_key {
            fmt!(f, s "PRIMARY KEY (" pk ")");
        }

        for fk in &self.foreign_keys {
            let column = &fk.column;
            let references = &fk.references;

            fmt!(f, ",\n    FOREIGN KEY (" column ") " references);
        }

        fmt!(f, "\n)");
    }
}

impl ToSql for &stmt::DropTable {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table_name = &self.name;

        fmt!(f, "DROP TABLE " table_name);
    }
}

impl ToSql for &stmt::InsertSelect {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table_name = &self.table;
        let source = &self.source;

        fmt!(
            f, "INSERT INTO " table_name " (" Comma(&self.columns) ") " source
        );
    }
}

impl ToSql for &stmt::Update {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table_name = &self.table;

        fmt!(f, "UPDATE " table_name " SET ");

        let mut s = "";
        for assignment in &self.assignments {
            let column = &assignment.column;
            let value = &assignment.value;

            fmt!(f, s column " = " value);
            s = ", ";
        }

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}
