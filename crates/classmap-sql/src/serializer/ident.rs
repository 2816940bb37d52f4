use super::{Formatter, ToSql};

use crate::stmt::Ident;

impl ToSql for &Ident {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push('"');
        for ch in self.0.chars() {
            if ch == '"' {
                f.dst.push('"');
            }
            f.dst.push(ch);
        }
        f.dst.push('"');
    }
}

/// `"table"."column"`
pub(super) struct Qualified<'a>(pub(super) &'a Ident, pub(super) &'a Ident);

impl ToSql for Qualified<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, self.0 "." self.1);
    }
}
