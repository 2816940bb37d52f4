/// A column as reported by the storage engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,

    /// Declared type, as written in the table definition. Empty when the
    /// column was declared without a type.
    pub declared_type: String,

    pub not_null: bool,

    pub default: Option<String>,

    /// 1-based position in the primary key, 0 when the column is not part
    /// of it.
    pub primary_key_ordinal: u32,
}
