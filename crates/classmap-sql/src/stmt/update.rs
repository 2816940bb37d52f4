use super::{Expr, Ident, Predicate, Statement};

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: Ident,
    pub assignments: Vec<Assignment>,
    pub filter: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: Ident,
    pub value: Expr,
}

impl Update {
    pub fn new(table: impl Into<Ident>) -> Update {
        Update {
            table: table.into(),
            assignments: vec![],
            filter: None,
        }
    }

    pub fn set(mut self, column: impl Into<Ident>, value: Expr) -> Update {
        self.assignments.push(Assignment {
            column: column.into(),
            value,
        });
        self
    }

    pub fn filter(mut self, filter: Predicate) -> Update {
        self.filter = Some(filter);
        self
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Self::Update(value)
    }
}
