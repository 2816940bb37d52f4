use super::{ident::Qualified, Comma, Formatter, ToSql};

use crate::stmt::{Expr, Predicate, Select};

impl ToSql for &Expr {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            Expr::Column(column) => fmt!(f, column),
            Expr::Null => fmt!(f, "NULL"),
            Expr::Subquery(select) => {
                let select: &Select = select;
                fmt!(f, "(" select ")")
            }
        }
    }
}

impl ToSql for &Predicate {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            Predicate::And(operands) => {
                let mut s = "";
                for operand in operands {
                    // Nested conjunctions are flattened, anything else binds
                    // tighter than AND.
                    fmt!(f, s operand);
                    s = " AND ";
                }
            }
            Predicate::Eq(column, value) => fmt!(f, column " = " value),
            Predicate::In(column, values) => fmt!(f, column " IN (" Comma(values) ")"),
            Predicate::IsNotNull(column) => fmt!(f, column " IS NOT NULL"),
            Predicate::ColumnsEq((lhs_table, lhs), (rhs_table, rhs)) => {
                fmt!(f, Qualified(lhs_table, lhs) " = " Qualified(rhs_table, rhs))
            }
            Predicate::InSelect(column, select) => {
                let select: &Select = select;
                fmt!(f, column " IN (" select ")")
            }
            Predicate::NotInSelect(column, select) => {
                let select: &Select = select;
                fmt!(f, column " NOT IN (" select ")")
            }
        }
    }
}

impl ToSql for &Select {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let from = &self.from;

        fmt!(f, "SELECT " Comma(&self.columns) " FROM " from);

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}
