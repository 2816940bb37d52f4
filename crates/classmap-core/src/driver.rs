mod capability;
pub use capability::Capability;

mod column_info;
pub use column_info::ColumnInfo;

mod row;
pub use row::Row;

mod transaction;
pub use transaction::Transaction;

use crate::{stmt::Value, Result};

use std::fmt::Debug;

/// Synchronous access to the storage engine that holds both the system
/// catalog and the mapped data tables.
///
/// Every method takes `&mut self`: holding the storage mutably is holding
/// the connection for the duration of a schema import.
pub trait Storage: Debug {
    /// Describes what the storage backend supports.
    fn capability(&self) -> &'static Capability;

    /// Executes a single DDL statement.
    fn execute_ddl(&mut self, sql: &str) -> Result<()>;

    /// Executes a DML statement and returns the number of affected rows.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize>;

    /// Runs a query and returns all rows.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Executes an `INSERT` and returns the id of the inserted row.
    fn insert(&mut self, sql: &str, params: &[Value]) -> Result<i64>;

    fn table_exists(&mut self, name: &str) -> Result<bool>;

    fn index_exists(&mut self, name: &str) -> Result<bool>;

    /// Lists the columns physically present in a table, in declaration order.
    fn columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>>;

    fn transaction(&mut self, op: Transaction) -> Result<()>;

    /// Runs a query expected to produce a single integer.
    fn query_i64(&mut self, sql: &str, params: &[Value]) -> Result<i64> {
        let rows = self.query(sql, params)?;
        match rows.first() {
            Some(row) => row.get_i64(0),
            None => Err(crate::err!("query returned no rows; sql={sql}")),
        }
    }
}
