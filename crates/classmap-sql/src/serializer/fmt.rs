use super::Formatter;

macro_rules! fmt {
    ($f:expr, $( $fragments:expr )*) => {{
        $(
            $fragments.to_sql($f);
        )*
    }};
}

pub(super) trait ToSql {
    fn to_sql(self, f: &mut Formatter<'_>);
}

impl ToSql for &str {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push_str(self);
    }
}

impl ToSql for i64 {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push_str(&self.to_string());
    }
}

impl ToSql for &i64 {
    fn to_sql(self, f: &mut Formatter<'_>) {
        (*self).to_sql(f);
    }
}

impl<T: ToSql> ToSql for Option<T> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        if let Some(inner) = self {
            inner.to_sql(f);
        }
    }
}
