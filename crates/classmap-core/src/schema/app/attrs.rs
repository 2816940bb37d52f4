use crate::schema::{db::OnDelete, mapping::Strategy};

use serde::{Deserialize, Serialize};

/// Custom attributes that steer how a class is mapped.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassMapAttrs {
    pub class_map: Option<ClassMapAttr>,

    pub share_columns: Option<ShareColumnsAttr>,

    /// Opts this class out of shared columns inherited from its base.
    pub disable_share_columns: bool,

    /// Each direct subclass stores its own properties in a joined table.
    pub joined_table_per_direct_subclass: bool,

    pub link_table: Option<LinkTableAttr>,

    pub foreign_key: Option<ForeignKeyAttr>,

    pub indexes: Vec<DbIndexDef>,

    pub unique_keys: Vec<UniqueKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMapAttr {
    pub strategy: Strategy,

    #[serde(default)]
    pub applies_to_subclasses: bool,

    /// Required for `ExistingTable` and for a non-polymorphic `SharedTable`.
    #[serde(default)]
    pub table_name: Option<String>,

    #[serde(default)]
    pub instance_id_column: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareColumnsAttr {
    pub applies_to_subclasses_only: bool,

    pub max_shared_columns_before_overflow: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkTableAttr {
    pub source_column: Option<String>,

    pub target_column: Option<String>,

    pub create_foreign_key_constraints: bool,

    pub allow_duplicate_relationships: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForeignKeyAttr {
    pub on_delete: Option<OnDelete>,
}

/// A user declared index over property access strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbIndexDef {
    pub name: String,

    #[serde(default)]
    pub unique: bool,

    pub properties: Vec<String>,

    #[serde(default)]
    pub where_not_null: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueKey {
    pub kind: UniqueKeyKind,
    pub property: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UniqueKeyKind {
    BusinessKey,
    GlobalId,
    SyncId,
}

impl ClassMapAttrs {
    /// Declares `SharedTable` with `AppliesToSubclasses`.
    pub fn table_per_hierarchy(&mut self) -> &mut Self {
        self.class_map = Some(ClassMapAttr::new(Strategy::SharedTable, true));
        self
    }

    pub fn strategy(&mut self, strategy: Strategy, applies_to_subclasses: bool) -> &mut Self {
        self.class_map = Some(ClassMapAttr::new(strategy, applies_to_subclasses));
        self
    }

    pub fn existing_table(&mut self, table_name: &str) -> &mut Self {
        let mut attr = ClassMapAttr::new(Strategy::ExistingTable, false);
        attr.table_name = Some(table_name.to_string());
        self.class_map = Some(attr);
        self
    }

    pub fn share_columns(&mut self, max_before_overflow: Option<u32>) -> &mut Self {
        self.share_columns = Some(ShareColumnsAttr {
            applies_to_subclasses_only: false,
            max_shared_columns_before_overflow: max_before_overflow,
        });
        self
    }

    pub fn index(&mut self, name: &str, unique: bool, properties: &[&str]) -> &mut Self {
        self.indexes.push(DbIndexDef {
            name: name.to_string(),
            unique,
            properties: properties.iter().map(|p| p.to_string()).collect(),
            where_not_null: false,
        });
        self
    }

    pub fn unique_key(&mut self, kind: UniqueKeyKind, property: &str) -> &mut Self {
        self.unique_keys.push(UniqueKey {
            kind,
            property: property.to_string(),
        });
        self
    }

    /// `true` when the class declares any strategy-level attribute.
    pub fn declares_strategy(&self) -> bool {
        self.class_map.is_some()
    }
}

impl ClassMapAttr {
    pub fn new(strategy: Strategy, applies_to_subclasses: bool) -> ClassMapAttr {
        ClassMapAttr {
            strategy,
            applies_to_subclasses,
            table_name: None,
            instance_id_column: None,
        }
    }
}

impl Default for LinkTableAttr {
    fn default() -> Self {
        LinkTableAttr {
            source_column: None,
            target_column: None,
            create_foreign_key_constraints: true,
            allow_duplicate_relationships: false,
        }
    }
}

impl UniqueKeyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UniqueKeyKind::BusinessKey => "businesskey",
            UniqueKeyKind::GlobalId => "globalid",
            UniqueKeyKind::SyncId => "syncid",
        }
    }
}
