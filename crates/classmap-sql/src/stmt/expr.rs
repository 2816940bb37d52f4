use super::{Ident, Select};

/// Right-hand side of an `UPDATE` assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Another column of the updated row
    Column(Ident),

    Null,

    /// A scalar subquery, usually correlated with the updated row through
    /// [`Predicate::ColumnsEq`].
    Subquery(Box<Select>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),

    /// `column = value`
    Eq(Ident, i64),

    /// `column IN (values...)`
    In(Ident, Vec<i64>),

    IsNotNull(Ident),

    /// `"lhs_table"."lhs" = "rhs_table"."rhs"`
    ColumnsEq((Ident, Ident), (Ident, Ident)),

    /// `column IN (SELECT ...)`
    InSelect(Ident, Box<Select>),

    /// `column NOT IN (SELECT ...)`
    NotInSelect(Ident, Box<Select>),
}

impl Predicate {
    /// Combines two predicates, flattening nested conjunctions.
    pub fn and(self, other: Predicate) -> Predicate {
        match self {
            Predicate::And(mut operands) => {
                operands.push(other);
                Predicate::And(operands)
            }
            lhs => Predicate::And(vec![lhs, other]),
        }
    }
}
