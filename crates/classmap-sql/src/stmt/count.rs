use super::{Ident, Predicate, Statement};

/// `SELECT COUNT(*) FROM table WHERE ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Count {
    pub table: Ident,
    pub filter: Option<Predicate>,
}

impl Statement {
    pub fn count(table: impl Into<Ident>, filter: Option<Predicate>) -> Self {
        Count {
            table: table.into(),
            filter,
        }
        .into()
    }
}

impl From<Count> for Statement {
    fn from(value: Count) -> Self {
        Self::Count(value)
    }
}
