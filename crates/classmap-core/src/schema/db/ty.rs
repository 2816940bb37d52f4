use serde::{Deserialize, Serialize};

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Text,
    Real,
    Blob,
    Boolean,
    TimeStamp,

    /// No declared type. Shared columns hold values of any property type.
    Any,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Integer => "Integer",
            ColumnType::Text => "Text",
            ColumnType::Real => "Real",
            ColumnType::Blob => "Blob",
            ColumnType::Boolean => "Boolean",
            ColumnType::TimeStamp => "TimeStamp",
            ColumnType::Any => "Any",
        }
    }

    pub fn parse(name: &str) -> Option<ColumnType> {
        Some(match name {
            "Integer" => ColumnType::Integer,
            "Text" => ColumnType::Text,
            "Real" => ColumnType::Real,
            "Blob" => ColumnType::Blob,
            "Boolean" => ColumnType::Boolean,
            "TimeStamp" => ColumnType::TimeStamp,
            "Any" => ColumnType::Any,
            _ => return None,
        })
    }

    /// Maps a declared SQL type, as reported by the storage engine, onto a
    /// column type using SQLite's type affinity rules.
    pub fn from_declared(declared: &str) -> ColumnType {
        let upper = declared.to_ascii_uppercase();

        if upper.is_empty() {
            ColumnType::Any
        } else if upper.contains("INT") {
            ColumnType::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            ColumnType::Text
        } else if upper.contains("BLOB") {
            ColumnType::Blob
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            ColumnType::Real
        } else if upper.contains("BOOL") {
            ColumnType::Boolean
        } else if upper.contains("TIME") || upper.contains("DATE") {
            ColumnType::TimeStamp
        } else {
            ColumnType::Any
        }
    }

    /// Whether a value of type `self` may be stored in a column of type `other`.
    pub fn is_compatible(self, other: ColumnType) -> bool {
        self == other || other == ColumnType::Any
    }
}
