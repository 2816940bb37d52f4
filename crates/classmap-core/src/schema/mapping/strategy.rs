use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    NotMapped,
    OwnTable,
    SharedTable,
    ExistingTable,
    ForeignKeyInSource,
    ForeignKeyInTarget,
}

/// The resolved strategy of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapStrategy {
    pub strategy: Strategy,

    /// Whether subclasses inherit the strategy
    pub applies_to_subclasses: bool,

    /// Shared-table options, only for `SharedTable` with `applies_to_subclasses`.
    pub tph: Option<TphInfo>,
}

/// Options of a table-per-hierarchy class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TphInfo {
    pub share_columns: ShareColumnsMode,
    pub max_shared_columns_before_overflow: Option<u32>,
    pub joined_table: JoinedTableInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShareColumnsMode {
    No,

    /// This class and its subclasses store properties in shared columns.
    Yes,

    /// Only subclasses store properties in shared columns.
    ApplyToSubclassesOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinedTableInfo {
    None,

    /// Direct subclasses of this class get a joined table.
    ParentOfJoinedTable,

    /// Properties introduced by this class live in a joined table.
    JoinedTable,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::NotMapped => "NotMapped",
            Strategy::OwnTable => "OwnTable",
            Strategy::SharedTable => "SharedTable",
            Strategy::ExistingTable => "ExistingTable",
            Strategy::ForeignKeyInSource => "ForeignKeyRelationshipInSourceTable",
            Strategy::ForeignKeyInTarget => "ForeignKeyRelationshipInTargetTable",
        }
    }

    pub fn parse(name: &str) -> Option<Strategy> {
        Some(match name {
            "NotMapped" => Strategy::NotMapped,
            "OwnTable" => Strategy::OwnTable,
            "SharedTable" => Strategy::SharedTable,
            "ExistingTable" => Strategy::ExistingTable,
            "ForeignKeyRelationshipInSourceTable" => Strategy::ForeignKeyInSource,
            "ForeignKeyRelationshipInTargetTable" => Strategy::ForeignKeyInTarget,
            _ => return None,
        })
    }

    pub fn is_foreign_key(self) -> bool {
        matches!(self, Strategy::ForeignKeyInSource | Strategy::ForeignKeyInTarget)
    }
}

impl MapStrategy {
    pub fn new(strategy: Strategy, applies_to_subclasses: bool) -> MapStrategy {
        MapStrategy {
            strategy,
            applies_to_subclasses,
            tph: None,
        }
    }

    pub fn not_mapped() -> MapStrategy {
        MapStrategy::new(Strategy::NotMapped, false)
    }

    pub fn is_not_mapped(&self) -> bool {
        self.strategy == Strategy::NotMapped
    }

    /// `SharedTable` with `AppliesToSubclasses`.
    pub fn is_tph(&self) -> bool {
        self.strategy == Strategy::SharedTable && self.applies_to_subclasses
    }

    /// Shared columns are used for the properties of this very class.
    pub fn uses_shared_columns(&self) -> bool {
        matches!(
            self.tph,
            Some(TphInfo {
                share_columns: ShareColumnsMode::Yes,
                ..
            })
        )
    }

    pub fn joined_table(&self) -> JoinedTableInfo {
        self.tph
            .map(|tph| tph.joined_table)
            .unwrap_or(JoinedTableInfo::None)
    }

    /// Whether a change from `self` to `other` is a strategy change.
    /// Shared-table options may evolve, the strategy itself may not.
    pub fn is_same_strategy(&self, other: &MapStrategy) -> bool {
        self.strategy == other.strategy
            && self.applies_to_subclasses == other.applies_to_subclasses
    }
}

impl std::fmt::Display for MapStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.strategy.as_str())?;
        if self.applies_to_subclasses {
            f.write_str(" (AppliesToSubclasses)")?;
        }
        Ok(())
    }
}

impl ShareColumnsMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ShareColumnsMode::No => "No",
            ShareColumnsMode::Yes => "Yes",
            ShareColumnsMode::ApplyToSubclassesOnly => "ApplyToSubclassesOnly",
        }
    }

    pub fn parse(name: &str) -> Option<ShareColumnsMode> {
        Some(match name {
            "No" => ShareColumnsMode::No,
            "Yes" => ShareColumnsMode::Yes,
            "ApplyToSubclassesOnly" => ShareColumnsMode::ApplyToSubclassesOnly,
            _ => return None,
        })
    }
}

impl JoinedTableInfo {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinedTableInfo::None => "None",
            JoinedTableInfo::ParentOfJoinedTable => "ParentOfJoinedTable",
            JoinedTableInfo::JoinedTable => "JoinedTable",
        }
    }

    pub fn parse(name: &str) -> Option<JoinedTableInfo> {
        Some(match name {
            "None" => JoinedTableInfo::None,
            "ParentOfJoinedTable" => JoinedTableInfo::ParentOfJoinedTable,
            "JoinedTable" => JoinedTableInfo::JoinedTable,
            _ => return None,
        })
    }
}
