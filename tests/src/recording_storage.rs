use classmap_core::{
    driver::{Capability, ColumnInfo, Row, Storage, Transaction},
    stmt::Value,
    Result,
};
use classmap_driver_sqlite::Sqlite;

use std::sync::{Arc, Mutex};

/// Wraps the SQLite storage and records every DDL statement it runs.
#[derive(Debug)]
pub struct RecordingStorage {
    inner: Sqlite,

    /// DDL statements in execution order. Shared with the test so it can
    /// inspect the log while the storage is owned by the `DbMap`.
    ddl_log: Arc<Mutex<Vec<String>>>,
}

impl RecordingStorage {
    pub fn new(inner: Sqlite) -> Self {
        Self {
            inner,
            ddl_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn ddl_log_handle(&self) -> Arc<Mutex<Vec<String>>> {
        self.ddl_log.clone()
    }
}

impl Storage for RecordingStorage {
    fn capability(&self) -> &'static Capability {
        self.inner.capability()
    }

    fn execute_ddl(&mut self, sql: &str) -> Result<()> {
        self.inner.execute_ddl(sql)?;

        self.ddl_log
            .lock()
            .expect("Failed to acquire DDL log lock")
            .push(sql.to_string());

        Ok(())
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize> {
        self.inner.execute(sql, params)
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.inner.query(sql, params)
    }

    fn insert(&mut self, sql: &str, params: &[Value]) -> Result<i64> {
        self.inner.insert(sql, params)
    }

    fn table_exists(&mut self, name: &str) -> Result<bool> {
        self.inner.table_exists(name)
    }

    fn index_exists(&mut self, name: &str) -> Result<bool> {
        self.inner.index_exists(name)
    }

    fn columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
        self.inner.columns(table)
    }

    fn transaction(&mut self, op: Transaction) -> Result<()> {
        self.inner.transaction(op)
    }
}
