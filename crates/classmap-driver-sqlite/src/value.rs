use classmap_core::{stmt, Error, Result};
use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};

#[derive(Debug)]
pub struct Value<'a>(&'a stmt::Value);

impl<'a> From<&'a stmt::Value> for Value<'a> {
    fn from(value: &'a stmt::Value) -> Self {
        Self(value)
    }
}

impl Value<'_> {
    /// Converts a SQLite value within a row to a core value.
    pub fn from_sql(row: &Row<'_>, index: usize) -> Result<stmt::Value> {
        let value: SqlValue = row.get(index).map_err(Error::driver_operation_failed)?;

        Ok(match value {
            SqlValue::Null => stmt::Value::Null,
            SqlValue::Integer(value) => stmt::Value::I64(value),
            SqlValue::Real(value) => stmt::Value::F64(value),
            SqlValue::Text(value) => stmt::Value::String(value),
            SqlValue::Blob(value) => stmt::Value::Bytes(value),
        })
    }
}

impl ToSql for Value<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use stmt::Value;

        match self.0 {
            Value::Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            Value::Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            Value::I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            Value::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            Value::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::Bytes(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            Value::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
        }
    }
}
