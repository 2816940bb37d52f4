use super::Verify;
use crate::{Result, Storage};

use classmap_sql::{Serializer, Statement};

impl Verify<'_> {
    /// The catalog holds one class map row per class row.
    pub(super) fn verify_every_class_has_a_class_map(&mut self, storage: &mut dyn Storage) -> Result<()> {
        let serializer = Serializer::for_capability(storage.capability());
        let mut count = |table: &str| storage.query_i64(&serializer.serialize(&Statement::count(table, None)), &[]);

        let classes = count("ec_Class")?;
        let class_maps = count("ec_ClassMap")?;

        if classes != class_maps {
            self.finding(format!(
                "the catalog has {classes} classes but {class_maps} class maps"
            ));
        }

        Ok(())
    }
}
