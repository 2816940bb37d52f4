use super::{Ident, Predicate};

/// A plain column projection over a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub columns: Vec<Ident>,
    pub from: Ident,
    pub filter: Option<Predicate>,
}

impl Select {
    pub fn new(columns: Vec<Ident>, from: impl Into<Ident>) -> Select {
        Select {
            columns,
            from: from.into(),
            filter: None,
        }
    }

    pub fn column(column: impl Into<Ident>, from: impl Into<Ident>) -> Select {
        Select::new(vec![column.into()], from)
    }

    pub fn filter(mut self, filter: Predicate) -> Select {
        self.filter = Some(filter);
        self
    }
}
