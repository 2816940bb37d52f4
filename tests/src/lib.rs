mod recording_storage;
pub use recording_storage::RecordingStorage;

pub mod schemas;

use classmap::{app::SchemaDef, Builder, CollectingReporter, DbMap, MappingSession, Result, Storage};
use classmap_core::stmt::Value;
use classmap_driver_sqlite::Sqlite;

use std::sync::{Arc, Mutex};

/// Drives a [`DbMap`] over an in-memory SQLite database and keeps enough
/// state around for tests to inspect what happened.
#[derive(Debug)]
pub struct MapTest {
    db_map: DbMap,

    /// DDL run against storage, shared with the [`RecordingStorage`]
    ddl_log: Arc<Mutex<Vec<String>>>,

    reporter: Arc<CollectingReporter>,
}

impl MapTest {
    pub fn new() -> MapTest {
        MapTest::with_builder(|_| {})
    }

    /// Lets the test adjust the builder before the `DbMap` is created.
    pub fn with_builder(configure: impl FnOnce(&mut Builder)) -> MapTest {
        init_logging();

        let storage = RecordingStorage::new(Sqlite::in_memory().expect("failed to open SQLite"));
        let ddl_log = storage.ddl_log_handle();
        let reporter = Arc::new(CollectingReporter::new());

        let mut builder = DbMap::builder();
        builder.issue_reporter(reporter.clone());
        configure(&mut builder);

        MapTest {
            db_map: builder.build(storage),
            ddl_log,
            reporter,
        }
    }

    pub fn map(&mut self, schemas: &[SchemaDef]) -> Result<()> {
        log::debug!("mapping {} schemas", schemas.len());
        self.db_map.map_schemas(schemas)
    }

    /// The persisted mapping, freshly loaded from the catalog.
    pub fn session(&mut self) -> MappingSession {
        self.db_map.load().expect("failed to load the mapping")
    }

    /// Returns and clears the DDL executed so far, skipping the statements
    /// that create the system catalog.
    pub fn take_ddl(&self) -> Vec<String> {
        let mut log = self.ddl_log.lock().expect("failed to lock the DDL log");
        std::mem::take(&mut *log)
            .into_iter()
            .filter(|sql| !sql.contains(r#""ec_"#))
            .collect()
    }

    /// Column names of `table` as stored, in declaration order.
    pub fn columns(&mut self, table: &str) -> Vec<String> {
        self.db_map
            .storage_mut()
            .columns(table)
            .expect("failed to read columns")
            .into_iter()
            .map(|column| column.name)
            .collect()
    }

    pub fn table_exists(&mut self, table: &str) -> bool {
        self.db_map
            .storage_mut()
            .table_exists(table)
            .expect("failed to look up table")
    }

    pub fn index_exists(&mut self, index: &str) -> bool {
        self.db_map
            .storage_mut()
            .index_exists(index)
            .expect("failed to look up index")
    }

    pub fn execute_ddl(&mut self, sql: &str) {
        self.db_map
            .storage_mut()
            .execute_ddl(sql)
            .expect("failed to execute DDL");
    }

    pub fn execute(&mut self, sql: &str, params: &[Value]) -> usize {
        self.try_execute(sql, params)
            .expect("failed to execute statement")
    }

    pub fn try_execute(&mut self, sql: &str, params: &[Value]) -> Result<usize> {
        self.db_map.storage_mut().execute(sql, params)
    }

    pub fn query_i64(&mut self, sql: &str, params: &[Value]) -> i64 {
        self.db_map
            .storage_mut()
            .query_i64(sql, params)
            .expect("failed to run query")
    }

    /// First column of the single row returned by `sql`; `None` for NULL.
    pub fn query_string(&mut self, sql: &str, params: &[Value]) -> Option<String> {
        let rows = self
            .db_map
            .storage_mut()
            .query(sql, params)
            .expect("failed to run query");

        rows.first()
            .expect("query returned no rows")
            .get_opt_string(0)
            .expect("not a string column")
    }

    pub fn errors(&self) -> Vec<String> {
        self.reporter.errors()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.reporter.warnings()
    }
}

impl Default for MapTest {
    fn default() -> Self {
        MapTest::new()
    }
}

/// Routes `log` output through the test harness. Set `RUST_LOG` to see it.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
