#[derive(Debug)]
pub struct Capability {
    /// Name of the SQL dialect, used in diagnostics.
    pub name: &'static str,

    /// Supports `CREATE INDEX ... WHERE ...`.
    pub partial_indexes: bool,

    /// `ALTER TABLE ... ADD COLUMN` may carry a `REFERENCES` clause.
    pub add_column_with_foreign_key: bool,

    /// Maximum number of columns in a single table.
    pub max_columns: usize,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        name: "sqlite",
        partial_indexes: true,
        add_column_with_foreign_key: true,
        max_columns: 2000,
    };

    /// PostgreSQL capabilities.
    pub const POSTGRESQL: Self = Self {
        name: "postgresql",
        max_columns: 1600,
        ..Self::SQLITE
    };
}
