use super::{Ident, Select, Statement};

/// `INSERT INTO table (columns) SELECT ...`
#[derive(Debug, Clone, PartialEq)]
pub struct InsertSelect {
    pub table: Ident,
    pub columns: Vec<Ident>,
    pub source: Select,
}

impl From<InsertSelect> for Statement {
    fn from(value: InsertSelect) -> Self {
        Self::InsertSelect(value)
    }
}
