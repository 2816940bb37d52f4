mod value;
pub(crate) use value::Value;

use classmap_core::{
    driver::{Capability, ColumnInfo, Row, Storage, Transaction},
    err, stmt, Error, Result,
};
use rusqlite::{params_from_iter, Connection as RusqliteConnection, OptionalExtension};
use std::path::{Path, PathBuf};
use url::Url;

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    InMemory,
}

impl Location {
    /// Parses a `sqlite:` connection URL. `sqlite::memory:` opens an
    /// in-memory database.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver_operation_failed)?;

        if url.scheme() != "sqlite" {
            return Err(err!(
                "connection URL does not have a `sqlite` scheme; url={}",
                url_str
            ));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }
}

/// [`Storage`] backed by a single SQLite connection.
#[derive(Debug)]
pub struct Sqlite {
    connection: RusqliteConnection,
}

impl Sqlite {
    /// Connects using a `sqlite:` URL.
    pub fn connect(url: impl Into<String>) -> Result<Self> {
        match Location::new(url)? {
            Location::File(path) => Self::open(path),
            Location::InMemory => Self::in_memory(),
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Result<Self> {
        let connection =
            RusqliteConnection::open_in_memory().map_err(Error::driver_operation_failed)?;
        Self::init(connection)
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;
        Self::init(connection)
    }

    fn init(connection: RusqliteConnection) -> Result<Self> {
        connection
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(Error::driver_operation_failed)?;
        Ok(Self { connection })
    }

    /// The underlying connection, for reading and writing mapped data.
    pub fn connection(&self) -> &RusqliteConnection {
        &self.connection
    }
}

impl Storage for Sqlite {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    fn execute_ddl(&mut self, sql: &str) -> Result<()> {
        log::debug!(target: "classmap::sqlite", "{sql}");
        self.connection
            .execute_batch(sql)
            .map_err(Error::driver_operation_failed)
    }

    fn execute(&mut self, sql: &str, params: &[stmt::Value]) -> Result<usize> {
        log::trace!(target: "classmap::sqlite", "{sql}; params={params:?}");
        let mut stmt = self
            .connection
            .prepare_cached(sql)
            .map_err(Error::driver_operation_failed)?;

        stmt.execute(params_from_iter(params.iter().map(Value::from)))
            .map_err(Error::driver_operation_failed)
    }

    fn query(&mut self, sql: &str, params: &[stmt::Value]) -> Result<Vec<Row>> {
        log::trace!(target: "classmap::sqlite", "{sql}; params={params:?}");
        let mut stmt = self
            .connection
            .prepare_cached(sql)
            .map_err(Error::driver_operation_failed)?;
        let width = stmt.column_count();

        let mut rows = stmt
            .query(params_from_iter(params.iter().map(Value::from)))
            .map_err(Error::driver_operation_failed)?;

        let mut ret = vec![];

        while let Some(row) = rows.next().map_err(Error::driver_operation_failed)? {
            let values = (0..width)
                .map(|index| Value::from_sql(row, index))
                .collect::<Result<Vec<_>>>()?;
            ret.push(Row::new(values));
        }

        Ok(ret)
    }

    fn insert(&mut self, sql: &str, params: &[stmt::Value]) -> Result<i64> {
        self.execute(sql, params)?;
        Ok(self.connection.last_insert_rowid())
    }

    fn table_exists(&mut self, name: &str) -> Result<bool> {
        self.sqlite_master_contains("table", name)
    }

    fn index_exists(&mut self, name: &str) -> Result<bool> {
        self.sqlite_master_contains("index", name)
    }

    fn columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self
            .connection
            .prepare("SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1)")
            .map_err(Error::driver_operation_failed)?;

        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    declared_type: row.get(1)?,
                    not_null: row.get(2)?,
                    default: row.get(3)?,
                    primary_key_ordinal: row.get(4)?,
                })
            })
            .map_err(Error::driver_operation_failed)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::driver_operation_failed)?;

        Ok(columns)
    }

    fn transaction(&mut self, op: Transaction) -> Result<()> {
        log::debug!(target: "classmap::sqlite", "{}", op.as_sql());
        self.connection
            .execute(op.as_sql(), [])
            .map_err(Error::driver_operation_failed)?;
        Ok(())
    }
}

impl Sqlite {
    fn sqlite_master_contains(&self, ty: &str, name: &str) -> Result<bool> {
        let found = self
            .connection
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2 COLLATE NOCASE",
                [ty, name],
                |_| Ok(()),
            )
            .optional()
            .map_err(Error::driver_operation_failed)?;

        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_url() {
        assert_eq!(Location::new("sqlite::memory:").unwrap(), Location::InMemory);
        assert_eq!(
            Location::new("sqlite:/tmp/catalog.db").unwrap(),
            Location::File(PathBuf::from("/tmp/catalog.db"))
        );
        assert!(Location::new("postgresql://localhost/db").is_err());
    }

    #[test]
    fn introspects_tables_and_columns() {
        let mut sqlite = Sqlite::in_memory().unwrap();
        sqlite
            .execute_ddl("CREATE TABLE \"ts_Pet\" (\"Id\" INTEGER NOT NULL, \"ps1\", PRIMARY KEY (\"Id\"));")
            .unwrap();
        sqlite
            .execute_ddl("CREATE INDEX \"ix_ts_Pet_ps1\" ON \"ts_Pet\" (\"ps1\");")
            .unwrap();

        assert!(sqlite.table_exists("ts_pet").unwrap());
        assert!(!sqlite.table_exists("ts_Person").unwrap());
        assert!(sqlite.index_exists("ix_ts_Pet_ps1").unwrap());

        let columns = sqlite.columns("ts_Pet").unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "Id");
        assert_eq!(columns[0].primary_key_ordinal, 1);
        assert!(columns[0].not_null);
        assert_eq!(columns[1].declared_type, "");
    }

    #[test]
    fn insert_returns_rowid_and_rolls_back() {
        let mut sqlite = Sqlite::in_memory().unwrap();
        sqlite
            .execute_ddl("CREATE TABLE t (\"Id\" INTEGER NOT NULL, \"Name\" TEXT, PRIMARY KEY (\"Id\"));")
            .unwrap();

        sqlite.transaction(Transaction::Begin).unwrap();
        let id = sqlite
            .insert("INSERT INTO t (\"Name\") VALUES (?1)", &["a".into()])
            .unwrap();
        assert_eq!(id, 1);
        sqlite.transaction(Transaction::Rollback).unwrap();

        assert_eq!(sqlite.query_i64("SELECT COUNT(*) FROM t", &[]).unwrap(), 0);
    }
}
