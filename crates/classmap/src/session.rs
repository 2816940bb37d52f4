use classmap_core::schema::{
    app::{self, ClassId},
    db::{self, Column},
    mapping::{ClassMap, Mapping},
};

/// Everything known about the mapping while a schema import runs.
///
/// A session is created at the start of an import and dropped at its end,
/// so every import re-derives its state from the persisted catalog.
#[derive(Debug, Default)]
pub struct MappingSession {
    /// Resolved classes of every imported schema
    pub app: app::Schema,

    /// The physical model
    pub db: db::Schema,

    /// One class map per class
    pub mapping: Mapping,
}

impl MappingSession {
    pub fn class_id(&self, schema: &str, class: &str) -> Option<ClassId> {
        self.app.find_class(schema, class).map(|class| class.id)
    }

    pub fn class_map(&self, schema: &str, class: &str) -> Option<&ClassMap> {
        self.mapping.get(self.class_id(schema, class)?)
    }

    /// Name of the table holding the class's rows.
    pub fn table_name(&self, schema: &str, class: &str) -> Option<&str> {
        let table = self.class_map(schema, class)?.primary_table()?;
        Some(&self.db.table(table).name)
    }

    /// The column a property, or a struct member, is stored in.
    pub fn column(&self, schema: &str, class: &str, access: &str) -> Option<&Column> {
        let column = self.class_map(schema, class)?.find(access)?.column()?;
        Some(self.db.column(column))
    }
}
