use super::{MapStrategy, PropertyMap, SystemProperty, SystemPropertyMap};
use crate::schema::{
    app::{ClassId, End},
    db::{ColumnId, TableId},
};

/// The resolved mapping of one class.
#[derive(Debug, Clone)]
pub struct ClassMap {
    pub class: ClassId,

    pub strategy: MapStrategy,

    pub kind: ClassMapKind,

    /// Tables the class spans. The primary table comes first, followed by
    /// joined and overflow tables.
    pub tables: Vec<TableId>,

    pub system: Vec<SystemPropertyMap>,

    /// One map per visible property, in property order
    pub properties: Vec<PropertyMap>,

    pub state: MapState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassMapKind {
    NotMapped,
    Class,

    /// Relationship stored as a foreign key column in the table of `fk_end`.
    RelationshipEndTable { fk_end: End },

    /// Relationship stored in its own link table.
    RelationshipLinkTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    /// Created during this import
    New,

    /// Loaded from the catalog and unchanged
    Persisted,

    /// Loaded from the catalog and changed during this import
    Updated,
}

impl ClassMap {
    pub fn new(class: ClassId, strategy: MapStrategy, kind: ClassMapKind) -> ClassMap {
        ClassMap {
            class,
            strategy,
            kind,
            tables: vec![],
            system: vec![],
            properties: vec![],
            state: MapState::New,
        }
    }

    pub fn primary_table(&self) -> Option<TableId> {
        self.tables.first().copied()
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMap> {
        self.properties.iter().find(|map| map.access == name)
    }

    /// Finds a map, possibly nested, by access string.
    pub fn find(&self, access: &str) -> Option<&PropertyMap> {
        self.properties.iter().find_map(|map| map.find(access))
    }

    pub fn system(&self, kind: SystemProperty) -> Option<&SystemPropertyMap> {
        self.system.iter().find(|map| map.kind == kind)
    }

    /// Every single-column data map of the class.
    pub fn leaves(&self) -> Vec<&PropertyMap> {
        self.properties.iter().flat_map(|map| map.leaves()).collect()
    }

    /// Columns claimed by the data property maps of the class.
    pub fn data_columns(&self) -> Vec<ColumnId> {
        self.properties.iter().flat_map(|map| map.columns()).collect()
    }

    pub fn is_not_mapped(&self) -> bool {
        self.kind == ClassMapKind::NotMapped
    }

    pub fn is_relationship(&self) -> bool {
        matches!(
            self.kind,
            ClassMapKind::RelationshipEndTable { .. } | ClassMapKind::RelationshipLinkTable
        )
    }

    /// Marks a persisted map as changed.
    pub fn touch(&mut self) {
        if self.state == MapState::Persisted {
            self.state = MapState::Updated;
        }
    }
}
