mod add_column;
pub use add_column::AddColumn;

mod column_def;
pub use column_def::{ColumnDef, References};

mod count;
pub use count::Count;

mod create_index;
pub use create_index::CreateIndex;

mod create_table;
pub use create_table::{CreateTable, ForeignKeyDef};

mod drop_table;
pub use drop_table::DropTable;

mod expr;
pub use expr::{Expr, Predicate};

mod ident;
pub use ident::Ident;

mod insert_select;
pub use insert_select::InsertSelect;

mod select;
pub use select::Select;

mod update;
pub use update::{Assignment, Update};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    AddColumn(AddColumn),
    Count(Count),
    CreateIndex(CreateIndex),
    CreateTable(CreateTable),
    DropTable(DropTable),
    InsertSelect(InsertSelect),
    Update(Update),
}

impl Statement {
    /// Returns `true` for statements that change the database schema.
    pub fn is_ddl(&self) -> bool {
        matches!(
            self,
            Statement::AddColumn(_)
                | Statement::CreateIndex(_)
                | Statement::CreateTable(_)
                | Statement::DropTable(_)
        )
    }
}
