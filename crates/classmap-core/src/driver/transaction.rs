#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    /// Start a transaction
    Begin,

    /// Commit a transaction
    Commit,

    /// Rollback a transaction
    Rollback,
}

impl Transaction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Transaction::Begin => "BEGIN",
            Transaction::Commit => "COMMIT",
            Transaction::Rollback => "ROLLBACK",
        }
    }
}
