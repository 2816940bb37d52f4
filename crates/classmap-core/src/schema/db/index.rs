use super::{ColumnId, TableId};
use crate::schema::app::ClassId;

use std::fmt;

#[derive(Debug, Clone)]
pub struct Index {
    /// Uniquely identifies the index within the schema
    pub id: IndexId,

    /// Index name is unique within the schema
    pub name: String,

    /// The table being indexed
    pub on: TableId,

    pub columns: Vec<ColumnId>,

    /// When `true`, indexed entries are unique
    pub unique: bool,

    /// Adds `WHERE col IS NOT NULL` for every indexed column.
    pub where_not_null: bool,

    /// Restricts the index to rows of these classes when the table also
    /// holds rows of classes the index does not apply to.
    pub class_filter: Option<Vec<ClassId>>,

    /// The class that declared the index, if any
    pub class: Option<ClassId>,

    /// `true` for indexes the engine adds on its own (class id, foreign key
    /// and link table indexes).
    pub auto_generated: bool,

    pub catalog_id: Option<i64>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct IndexId {
    pub table: TableId,
    pub index: usize,
}

impl IndexId {
    pub fn placeholder() -> Self {
        Self {
            table: TableId::placeholder(),
            index: usize::MAX,
        }
    }
}

impl fmt::Debug for IndexId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "IndexId({}/{})", self.table.0, self.index)
    }
}
