mod column;
pub use column::{Column, ColumnId, ColumnKind, Persistence};

mod foreign_key;
pub use foreign_key::{ForeignKey, OnDelete};

mod index;
pub use index::{Index, IndexId};

mod schema;
pub use schema::Schema;

mod table;
pub use table::{Table, TableId, TableType};

mod ty;
pub use ty::ColumnType;

/// Name of the instance-id column unless a class declares another one.
pub const DEFAULT_INSTANCE_ID_COLUMN: &str = "Id";

/// Name of the class-id column of every mapped table.
pub const CLASS_ID_COLUMN: &str = "ECClassId";
