use super::{Column, ColumnId, ColumnKind, ColumnType, ForeignKey, Index, Persistence};
use crate::schema::app::ClassId;

use std::fmt;

/// A database table
#[derive(Debug, Clone)]
pub struct Table {
    /// Uniquely identifies a table
    pub id: TableId,

    /// Name of the table
    pub name: String,

    pub ty: TableType,

    /// The table's columns
    pub columns: Vec<Column>,

    /// The single integer primary key column, always the instance-id column
    pub primary_key: Option<ColumnId>,

    pub foreign_keys: Vec<ForeignKey>,

    pub indices: Vec<Index>,

    /// Joined and overflow tables hang off the table holding the rest of
    /// the row.
    pub parent: Option<TableId>,

    /// When set, only this class (and the classes mapped through it) may
    /// store rows in the table.
    pub exclusive_root_class: Option<ClassId>,

    /// Row id in the system catalog, once persisted.
    pub catalog_id: Option<i64>,

    /// Set once the table has been dropped by the orphan purge. Ids stay
    /// stable, so the slot is kept.
    pub dropped: bool,
}

/// Uniquely identifies a table
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct TableId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableType {
    Primary,
    Joined,
    Overflow,

    /// A table the engine maps onto but does not own.
    Existing,

    /// Never created in storage.
    Virtual,
}

impl Table {
    pub fn new(id: TableId, name: impl Into<String>, ty: TableType) -> Self {
        Self {
            id,
            name: name.into(),
            ty,
            columns: vec![],
            primary_key: None,
            foreign_keys: vec![],
            indices: vec![],
            parent: None,
            exclusive_root_class: None,
            catalog_id: None,
            dropped: false,
        }
    }

    pub fn column(&self, id: impl Into<ColumnId>) -> &Column {
        &self.columns[id.into().index]
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(name))
    }

    /// Appends a column and returns its id.
    pub fn add_column(&mut self, name: impl Into<String>, ty: ColumnType) -> ColumnId {
        let id = ColumnId {
            table: self.id,
            index: self.columns.len(),
        };
        let mut column = Column::new(id, name, ty);
        if self.is_virtual() {
            column.persistence = Persistence::Virtual;
        }
        self.columns.push(column);
        id
    }

    pub fn columns_of_kind(&self, kind: ColumnKind) -> impl Iterator<Item = &Column> + '_ {
        self.columns
            .iter()
            .filter(move |column| column.kind.contains(kind))
    }

    pub fn instance_id_column(&self) -> Option<&Column> {
        self.columns_of_kind(ColumnKind::INSTANCE_ID).next()
    }

    pub fn class_id_column(&self) -> Option<&Column> {
        self.columns_of_kind(ColumnKind::CLASS_ID).next()
    }

    pub fn physical_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(|column| column.is_physical())
    }

    pub fn shared_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns_of_kind(ColumnKind::SHARED_DATA)
    }

    pub fn is_virtual(&self) -> bool {
        self.ty == TableType::Virtual
    }

    pub fn is_existing(&self) -> bool {
        self.ty == TableType::Existing
    }

    /// Tables whose DDL is owned by the engine.
    pub fn is_managed(&self) -> bool {
        !matches!(self.ty, TableType::Virtual | TableType::Existing)
    }

    /// Whether the rows of several classes are told apart by a physical
    /// class id column.
    pub fn has_physical_class_id(&self) -> bool {
        self.class_id_column()
            .map(|column| column.is_physical())
            .unwrap_or(false)
    }
}

impl TableId {
    pub fn placeholder() -> Self {
        Self(usize::MAX)
    }
}

impl fmt::Debug for TableId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "TableId({})", self.0)
    }
}

impl TableType {
    pub fn as_str(self) -> &'static str {
        match self {
            TableType::Primary => "Primary",
            TableType::Joined => "Joined",
            TableType::Overflow => "Overflow",
            TableType::Existing => "Existing",
            TableType::Virtual => "Virtual",
        }
    }

    pub fn parse(name: &str) -> Option<TableType> {
        Some(match name {
            "Primary" => TableType::Primary,
            "Joined" => TableType::Joined,
            "Overflow" => TableType::Overflow,
            "Existing" => TableType::Existing,
            "Virtual" => TableType::Virtual,
            _ => return None,
        })
    }
}
