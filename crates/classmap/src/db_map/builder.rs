use super::{DbMap, Options, ValidationMode};
use crate::{IssueReporter, Storage};

use classmap_core::{schema::db, Issues};

use std::sync::Arc;

/// Configures a [`DbMap`].
#[derive(Debug, Default)]
pub struct Builder {
    options: Options,
    reporter: Option<Arc<dyn IssueReporter>>,
}

impl Builder {
    /// Whether the orphan purge may drop physical tables. When disabled, an
    /// import that would drop tables fails and names them.
    pub fn allow_changeset_incompatible_drops(&mut self, allow: bool) -> &mut Self {
        self.options.allow_changeset_incompatible_drops = allow;
        self
    }

    pub fn validation(&mut self, mode: ValidationMode) -> &mut Self {
        self.options.validation = mode;
        self
    }

    /// Name of the instance-id column of tables whose class does not name one.
    pub fn default_instance_id_column(&mut self, name: &str) -> &mut Self {
        self.options.default_instance_id_column = name.to_string();
        self
    }

    /// Column limit after which shared columns spill into an overflow table.
    pub fn max_columns_per_table(&mut self, max: usize) -> &mut Self {
        self.options.max_columns_per_table = max;
        self
    }

    pub fn issue_reporter(&mut self, reporter: Arc<dyn IssueReporter>) -> &mut Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn build(&self, storage: impl Storage + 'static) -> DbMap {
        let mut options = self.options.clone();
        options.max_columns_per_table = options
            .max_columns_per_table
            .min(storage.capability().max_columns);

        DbMap {
            storage: Box::new(storage),
            options,
            issues: match &self.reporter {
                Some(reporter) => Issues::new(reporter.clone()),
                None => Issues::default(),
            },
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            allow_changeset_incompatible_drops: true,
            validation: ValidationMode::Strict,
            default_instance_id_column: db::DEFAULT_INSTANCE_ID_COLUMN.to_string(),
            max_columns_per_table: 2000,
        }
    }
}
