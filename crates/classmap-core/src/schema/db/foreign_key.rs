use super::ColumnId;

use serde::{Deserialize, Serialize};

/// Single-column foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Referencing column, in the table that owns the constraint
    pub column: ColumnId,

    /// Referenced column, always an instance-id column
    pub references: ColumnId,

    pub on_delete: OnDelete,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OnDelete {
    Cascade,
    SetNull,
    #[default]
    NoAction,
}

impl OnDelete {
    pub fn as_sql(self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::SetNull => "SET NULL",
            OnDelete::NoAction => "NO ACTION",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OnDelete::Cascade => "Cascade",
            OnDelete::SetNull => "SetNull",
            OnDelete::NoAction => "NoAction",
        }
    }

    pub fn parse(name: &str) -> Option<OnDelete> {
        Some(match name {
            "Cascade" => OnDelete::Cascade,
            "SetNull" => OnDelete::SetNull,
            "NoAction" => OnDelete::NoAction,
            _ => return None,
        })
    }
}
