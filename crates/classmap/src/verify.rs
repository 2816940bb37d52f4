mod catalog_rows;
mod physical_columns;
mod property_maps;
mod system_maps;
mod table_structure;

use crate::{session::MappingSession, Error, Result, Storage, ValidationMode};

use classmap_core::Issues;

/// Checks the finished mapping against itself and against storage.
///
/// Every check runs to the end and records what it finds. In strict mode
/// any finding fails the import, in legacy mode each one is reported as a
/// warning.
pub(crate) fn verify(
    storage: &mut dyn Storage,
    session: &MappingSession,
    mode: ValidationMode,
    issues: &Issues,
) -> Result<()> {
    let mut verify = Verify {
        session,
        findings: vec![],
    };

    verify.verify_model();
    verify.verify_storage(storage)?;

    verify.report(mode, issues)
}

struct Verify<'a> {
    session: &'a MappingSession,
    findings: Vec<String>,
}

impl Verify<'_> {
    fn verify_model(&mut self) {
        let session = self.session;

        for class_map in session.mapping.classes.values() {
            self.verify_system_maps(class_map);
            self.verify_property_maps_cover_properties(class_map);
            self.verify_columns_are_not_reused(class_map);
        }

        for table in session.db.live_tables() {
            self.verify_table_structure(table);
        }
    }

    fn verify_storage(&mut self, storage: &mut dyn Storage) -> Result<()> {
        self.verify_physical_columns(storage)?;
        self.verify_every_class_has_a_class_map(storage)
    }

    fn finding(&mut self, message: String) {
        log::debug!("mapping validation finding; {message}");
        self.findings.push(message);
    }

    fn report(self, mode: ValidationMode, issues: &Issues) -> Result<()> {
        if self.findings.is_empty() {
            return Ok(());
        }

        match mode {
            ValidationMode::Strict => Err(Error::validation_failure(self.findings.join("; "))),
            ValidationMode::Legacy => {
                for finding in &self.findings {
                    issues.warning(finding);
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog, CollectingReporter};
    use classmap_core::schema::db::{ColumnKind, ColumnType, TableType};
    use classmap_driver_sqlite::Sqlite;

    use std::sync::Arc;

    /// A managed table the model knows about but storage does not have.
    fn session_with_unsynced_table() -> MappingSession {
        let mut session = MappingSession::default();
        let db = &mut session.db;

        let table = db.create_table("ts_Widget", TableType::Primary);
        let id = db.table_mut(table).add_column("Id", ColumnType::Integer);
        db.table_mut(table).primary_key = Some(id);
        db.column_mut(id).kind = ColumnKind::INSTANCE_ID;

        let class_id = db.table_mut(table).add_column("ECClassId", ColumnType::Integer);
        db.column_mut(class_id).kind = ColumnKind::CLASS_ID;

        session
    }

    fn storage() -> Sqlite {
        let mut storage = Sqlite::in_memory().unwrap();
        catalog::ensure(&mut storage).unwrap();
        storage
    }

    #[test]
    fn consistent_mapping_passes() {
        let mut storage = storage();
        let session = MappingSession::default();

        verify(&mut storage, &session, ValidationMode::Strict, &Issues::default()).unwrap();
    }

    #[test]
    fn strict_mode_fails_on_findings() {
        let mut storage = storage();
        let session = session_with_unsynced_table();

        let err = verify(&mut storage, &session, ValidationMode::Strict, &Issues::default()).unwrap_err();

        assert!(err.is_validation_failure());
        assert!(err.to_string().contains("ts_Widget"), "{err}");
    }

    #[test]
    fn class_without_class_map_is_a_finding() {
        let mut storage = storage();
        storage
            .execute(
                r#"INSERT INTO "ec_Schema" ("Id", "Name", "Alias", "VersionMajor", "VersionWrite", "VersionMinor") VALUES (1, 'Zoo', 'zoo', 1, 0, 0)"#,
                &[],
            )
            .unwrap();
        storage
            .execute(
                r#"INSERT INTO "ec_Class" ("Id", "SchemaId", "Name", "Definition") VALUES (1, 1, 'Person', '{}')"#,
                &[],
            )
            .unwrap();

        let err = verify(
            &mut storage,
            &MappingSession::default(),
            ValidationMode::Strict,
            &Issues::default(),
        )
        .unwrap_err();

        assert!(err.is_validation_failure());
        assert!(err.to_string().contains("1 classes but 0 class maps"), "{err}");
    }

    #[test]
    fn legacy_mode_reports_findings_as_warnings() {
        let mut storage = storage();
        let session = session_with_unsynced_table();
        let reporter = Arc::new(CollectingReporter::new());

        verify(
            &mut storage,
            &session,
            ValidationMode::Legacy,
            &Issues::new(reporter.clone()),
        )
        .unwrap();

        let warnings = reporter.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("ts_Widget"));
        assert!(reporter.errors().is_empty());
    }
}
