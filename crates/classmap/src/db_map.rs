mod builder;
pub use builder::Builder;

use crate::{catalog, map::Mapper, session::MappingSession, Result, Storage};

use classmap_core::{driver::Transaction, schema::app::SchemaDef, Issues};

/// Maps schemas onto a storage backend.
///
/// Every call to [`DbMap::map_schemas`] starts from what is persisted in
/// the system catalog: the class maps, tables and remap records built
/// during the call live in a [`MappingSession`] that is dropped when the
/// call returns, whether it succeeded or not.
#[derive(Debug)]
pub struct DbMap {
    storage: Box<dyn Storage>,
    options: Options,
    issues: Issues,
}

#[derive(Debug, Clone)]
pub(crate) struct Options {
    pub(crate) allow_changeset_incompatible_drops: bool,
    pub(crate) validation: ValidationMode,
    pub(crate) default_instance_id_column: String,
    pub(crate) max_columns_per_table: usize,
}

/// How validator findings are treated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Any finding fails the import.
    #[default]
    Strict,

    /// Findings are reported as warnings.
    Legacy,
}

impl DbMap {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Imports `schemas` and maps every class onto storage in a single
    /// transaction. On failure the transaction is rolled back and the error
    /// is reported once through the issue reporter.
    pub fn map_schemas(&mut self, schemas: &[SchemaDef]) -> Result<()> {
        if let Err(err) = self.storage.transaction(Transaction::Begin) {
            return Err(self.issues.error(err));
        }

        let res = self.map_schemas_in_transaction(schemas);

        let res = match res {
            Ok(()) => self.storage.transaction(Transaction::Commit),
            Err(err) => {
                if let Err(rollback) = self.storage.transaction(Transaction::Rollback) {
                    log::error!("rollback failed after mapping error; error={rollback}");
                }
                Err(err)
            }
        };

        res.map_err(|err| self.issues.error(err))
    }

    fn map_schemas_in_transaction(&mut self, schemas: &[SchemaDef]) -> Result<()> {
        catalog::ensure(&mut *self.storage)?;

        let mut session = MappingSession::default();
        let mut mapper = Mapper::new(&mut session, &mut *self.storage, &self.options, &self.issues);

        mapper.run(schemas)
    }

    /// Loads the persisted mapping without changing anything.
    pub fn load(&mut self) -> Result<MappingSession> {
        let mut session = MappingSession::default();

        if catalog::exists(&mut *self.storage)? {
            catalog::load(&mut *self.storage, &mut session)?;
        }

        Ok(session)
    }

    pub fn storage(&self) -> &dyn Storage {
        &*self.storage
    }

    pub fn storage_mut(&mut self) -> &mut dyn Storage {
        &mut *self.storage
    }
}
