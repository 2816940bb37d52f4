#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::Comma;

mod flavor;
use flavor::Flavor;

mod ident;

// Fragment serializers
mod column_def;
mod expr;
mod statement;
mod ty;

use crate::stmt::Statement;

use classmap_core::driver::Capability;

/// Serialize a statement to a SQL string
#[derive(Debug)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,
}

struct Formatter<'a> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,
}

impl Serializer {
    /// Picks the dialect matching a storage backend.
    pub fn for_capability(capability: &Capability) -> Serializer {
        match capability.name {
            "postgresql" => Serializer::postgresql(),
            _ => Serializer::sqlite(),
        }
    }

    pub fn serialize(&self, stmt: &Statement) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
        };

        stmt.to_sql(&mut fmt);

        ret.push(';');
        ret
    }
}
