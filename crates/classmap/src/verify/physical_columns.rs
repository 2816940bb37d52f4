use super::Verify;
use crate::{Result, Storage};

use std::collections::BTreeSet;

impl Verify<'_> {
    /// Storage has exactly the physical columns of every managed table.
    /// Existing tables may have more columns than are mapped.
    pub(super) fn verify_physical_columns(&mut self, storage: &mut dyn Storage) -> Result<()> {
        let session = self.session;

        for table in session.db.live_tables() {
            if table.is_virtual() {
                continue;
            }

            let stored: BTreeSet<String> = storage
                .columns(&table.name)?
                .into_iter()
                .map(|column| column.name.to_ascii_lowercase())
                .collect();

            if stored.is_empty() {
                self.finding(format!("table `{}` does not exist in storage", table.name));
                continue;
            }

            let modeled: BTreeSet<String> = table
                .physical_columns()
                .map(|column| column.name.to_ascii_lowercase())
                .collect();

            let missing: Vec<_> = modeled.difference(&stored).map(String::as_str).collect();
            if !missing.is_empty() {
                self.finding(format!(
                    "table `{}` is missing columns {}",
                    table.name,
                    missing.join(", ")
                ));
            }

            if !table.is_managed() {
                continue;
            }

            let unknown: Vec<_> = stored.difference(&modeled).map(String::as_str).collect();
            if !unknown.is_empty() {
                self.finding(format!(
                    "table `{}` has columns {} which are not part of the mapping",
                    table.name,
                    unknown.join(", ")
                ));
            }
        }

        Ok(())
    }
}
