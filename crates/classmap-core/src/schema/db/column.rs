use super::{ColumnType, TableId};

use std::{fmt, ops};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Uniquely identifies the column in the schema.
    pub id: ColumnId,

    /// The name of the column in the database.
    pub name: String,

    pub ty: ColumnType,

    pub kind: ColumnKind,

    pub persistence: Persistence,

    pub not_null: bool,

    pub unique: bool,

    pub collation: Option<String>,

    pub default: Option<String>,

    pub check: Option<String>,

    /// Row id in the system catalog, once persisted.
    pub catalog_id: Option<i64>,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct ColumnId {
    pub table: TableId,
    pub index: usize,
}

/// What the column is used for. Several kinds may be combined.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ColumnKind(u16);

/// Virtual columns carry mapping metadata only and have no storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persistence {
    Physical,
    Virtual,
}

impl Column {
    pub fn new(id: ColumnId, name: impl Into<String>, ty: ColumnType) -> Column {
        Column {
            id,
            name: name.into(),
            ty,
            kind: ColumnKind::DEFAULT,
            persistence: Persistence::Physical,
            not_null: false,
            unique: false,
            collation: None,
            default: None,
            check: None,
            catalog_id: None,
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.persistence == Persistence::Virtual
    }

    pub fn is_physical(&self) -> bool {
        self.persistence == Persistence::Physical
    }

    pub fn is_shared(&self) -> bool {
        self.kind.contains(ColumnKind::SHARED_DATA)
    }
}

impl ColumnId {
    pub fn placeholder() -> Self {
        Self {
            table: TableId::placeholder(),
            index: usize::MAX,
        }
    }
}

impl From<&Column> for ColumnId {
    fn from(value: &Column) -> Self {
        value.id
    }
}

impl fmt::Debug for ColumnId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ColumnId({}/{})", self.table.0, self.index)
    }
}

impl ColumnKind {
    pub const DEFAULT: ColumnKind = ColumnKind(0);
    pub const INSTANCE_ID: ColumnKind = ColumnKind(1);
    pub const CLASS_ID: ColumnKind = ColumnKind(1 << 1);
    pub const SHARED_DATA: ColumnKind = ColumnKind(1 << 2);
    pub const SOURCE_INSTANCE_ID: ColumnKind = ColumnKind(1 << 3);
    pub const SOURCE_CLASS_ID: ColumnKind = ColumnKind(1 << 4);
    pub const TARGET_INSTANCE_ID: ColumnKind = ColumnKind(1 << 5);
    pub const TARGET_CLASS_ID: ColumnKind = ColumnKind(1 << 6);
    pub const RELATIONSHIP_CLASS_ID: ColumnKind = ColumnKind(1 << 7);

    pub fn contains(self, other: ColumnKind) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn from_bits(bits: u16) -> ColumnKind {
        ColumnKind(bits)
    }
}

impl ops::BitOr for ColumnKind {
    type Output = ColumnKind;

    fn bitor(self, rhs: ColumnKind) -> ColumnKind {
        ColumnKind(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for ColumnKind {
    fn bitor_assign(&mut self, rhs: ColumnKind) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ColumnKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(ColumnKind, &str); 8] = [
            (ColumnKind::INSTANCE_ID, "InstanceId"),
            (ColumnKind::CLASS_ID, "ClassId"),
            (ColumnKind::SHARED_DATA, "SharedData"),
            (ColumnKind::SOURCE_INSTANCE_ID, "SourceInstanceId"),
            (ColumnKind::SOURCE_CLASS_ID, "SourceClassId"),
            (ColumnKind::TARGET_INSTANCE_ID, "TargetInstanceId"),
            (ColumnKind::TARGET_CLASS_ID, "TargetClassId"),
            (ColumnKind::RELATIONSHIP_CLASS_ID, "RelClassId"),
        ];

        if self.0 == 0 {
            return fmt.write_str("Default");
        }

        let mut sep = "";
        for (kind, name) in NAMES {
            if self.contains(kind) {
                write!(fmt, "{sep}{name}")?;
                sep = "|";
            }
        }
        Ok(())
    }
}
