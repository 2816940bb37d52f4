use super::{Flavor, Formatter, ToSql};

use classmap_core::schema::db::ColumnType;

impl ToSql for ColumnType {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let sql = match (f.serializer.flavor, self) {
            (Flavor::Sqlite, ColumnType::Integer) => "INTEGER",
            (Flavor::Sqlite, ColumnType::Real) => "REAL",
            (Flavor::Sqlite, ColumnType::Blob) => "BLOB",
            (Flavor::Postgresql, ColumnType::Integer) => "BIGINT",
            (Flavor::Postgresql, ColumnType::Real) => "DOUBLE PRECISION",
            (Flavor::Postgresql, ColumnType::Blob) => "BYTEA",
            (_, ColumnType::Text | ColumnType::Any) => "TEXT",
            (_, ColumnType::Boolean) => "BOOLEAN",
            (_, ColumnType::TimeStamp) => "TIMESTAMP",
        };
        fmt!(f, sql);
    }
}
