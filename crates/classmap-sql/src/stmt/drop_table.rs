use super::{Ident, Statement};

/// Drops a table the engine no longer maps anything to.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTable {
    pub name: Ident,
}

impl Statement {
    pub fn drop_table(name: &str) -> Self {
        DropTable {
            name: Ident::from(name),
        }
        .into()
    }
}

impl From<DropTable> for Statement {
    fn from(value: DropTable) -> Self {
        Self::DropTable(value)
    }
}
