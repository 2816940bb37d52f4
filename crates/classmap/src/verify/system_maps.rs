use super::Verify;

use classmap_core::schema::mapping::{ClassMap, ClassMapKind, SystemProperty};

impl Verify<'_> {
    /// A mapped class has every system property its kind requires. The
    /// instance id and class id are mapped to one column in each table the
    /// class spans, in table order.
    pub(super) fn verify_system_maps(&mut self, class_map: &ClassMap) {
        let required: &[SystemProperty] = match class_map.kind {
            ClassMapKind::NotMapped => return,
            ClassMapKind::Class => &[SystemProperty::InstanceId, SystemProperty::ClassId],
            ClassMapKind::RelationshipEndTable { .. } | ClassMapKind::RelationshipLinkTable => {
                &SystemProperty::ALL
            }
        };

        let session = self.session;
        let class = session.app.qualified_name(class_map.class);

        if class_map.tables.is_empty() {
            self.finding(format!("class `{class}` is mapped but spans no table"));
            return;
        }

        for kind in required {
            let Some(map) = class_map.system(*kind) else {
                self.finding(format!(
                    "class `{class}` has no {} map",
                    kind.access_string()
                ));
                continue;
            };

            if map.columns.is_empty() {
                self.finding(format!(
                    "the {} map of class `{class}` has no column",
                    kind.access_string()
                ));
                continue;
            }

            if kind.is_relationship_end() {
                continue;
            }

            let tables: Vec<_> = map.columns.iter().map(|column| column.table).collect();
            if tables != class_map.tables {
                let names: Vec<_> = class_map
                    .tables
                    .iter()
                    .map(|table| session.db.table(*table).name.as_str())
                    .collect();

                self.finding(format!(
                    "the {} map of class `{class}` does not have one column in each of its tables ({})",
                    kind.access_string(),
                    names.join(", ")
                ));
            }
        }
    }
}
