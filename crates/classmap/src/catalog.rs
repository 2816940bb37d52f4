//! The system catalog: the tables describing imported schemas, the
//! physical model and the class maps.

mod load;
pub(crate) use load::{load, read, Persisted};

mod save;
pub(crate) use save::{delete_property_maps, delete_table, save};

use crate::{Result, Storage};

const TABLES: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS "ec_Schema" (
    "Id" INTEGER PRIMARY KEY,
    "Name" TEXT NOT NULL UNIQUE COLLATE NOCASE,
    "Alias" TEXT NOT NULL,
    "VersionMajor" INTEGER NOT NULL,
    "VersionWrite" INTEGER NOT NULL,
    "VersionMinor" INTEGER NOT NULL,
    "IsSystem" BOOLEAN NOT NULL DEFAULT 0
)"#,
    r#"CREATE TABLE IF NOT EXISTS "ec_Class" (
    "Id" INTEGER PRIMARY KEY,
    "SchemaId" INTEGER NOT NULL REFERENCES "ec_Schema" ("Id") ON DELETE CASCADE,
    "Name" TEXT NOT NULL,
    "Definition" TEXT NOT NULL
)"#,
    r#"CREATE TABLE IF NOT EXISTS "ec_ClassHasBaseClasses" (
    "ClassId" INTEGER NOT NULL REFERENCES "ec_Class" ("Id") ON DELETE CASCADE,
    "BaseClassId" INTEGER NOT NULL REFERENCES "ec_Class" ("Id") ON DELETE CASCADE,
    "Ordinal" INTEGER NOT NULL
)"#,
    r#"CREATE TABLE IF NOT EXISTS "ec_Property" (
    "Id" INTEGER PRIMARY KEY,
    "ClassId" INTEGER NOT NULL REFERENCES "ec_Class" ("Id") ON DELETE CASCADE,
    "Name" TEXT NOT NULL,
    "Ordinal" INTEGER NOT NULL,
    "Definition" TEXT NOT NULL
)"#,
    r#"CREATE TABLE IF NOT EXISTS "ec_ClassMap" (
    "ClassId" INTEGER PRIMARY KEY REFERENCES "ec_Class" ("Id") ON DELETE CASCADE,
    "MapStrategy" TEXT NOT NULL,
    "AppliesToSubclasses" BOOLEAN NOT NULL,
    "ShareColumnsMode" TEXT,
    "MaxSharedColumnsBeforeOverflow" INTEGER,
    "JoinedTableInfo" TEXT
)"#,
    r#"CREATE TABLE IF NOT EXISTS "ec_Table" (
    "Id" INTEGER PRIMARY KEY,
    "Name" TEXT NOT NULL UNIQUE COLLATE NOCASE,
    "Type" TEXT NOT NULL,
    "ExclusiveRootClassId" INTEGER,
    "ParentTableId" INTEGER REFERENCES "ec_Table" ("Id") ON DELETE CASCADE
)"#,
    r#"CREATE TABLE IF NOT EXISTS "ec_Column" (
    "Id" INTEGER PRIMARY KEY,
    "TableId" INTEGER NOT NULL REFERENCES "ec_Table" ("Id") ON DELETE CASCADE,
    "Name" TEXT NOT NULL,
    "Type" TEXT NOT NULL,
    "IsVirtual" BOOLEAN NOT NULL,
    "Ordinal" INTEGER NOT NULL,
    "NotNull" BOOLEAN NOT NULL,
    "IsUnique" BOOLEAN NOT NULL,
    "CollationConstraint" TEXT,
    "DefaultConstraint" TEXT,
    "CheckConstraint" TEXT,
    "OrdinalInPrimaryKey" INTEGER,
    "ColumnKind" INTEGER NOT NULL
)"#,
    r#"CREATE TABLE IF NOT EXISTS "ec_ForeignKey" (
    "Id" INTEGER PRIMARY KEY,
    "TableId" INTEGER NOT NULL REFERENCES "ec_Table" ("Id") ON DELETE CASCADE,
    "ColumnId" INTEGER NOT NULL REFERENCES "ec_Column" ("Id") ON DELETE CASCADE,
    "ReferencedColumnId" INTEGER NOT NULL REFERENCES "ec_Column" ("Id") ON DELETE CASCADE,
    "OnDelete" TEXT NOT NULL
)"#,
    r#"CREATE TABLE IF NOT EXISTS "ec_Index" (
    "Id" INTEGER PRIMARY KEY,
    "Name" TEXT NOT NULL UNIQUE COLLATE NOCASE,
    "TableId" INTEGER NOT NULL REFERENCES "ec_Table" ("Id") ON DELETE CASCADE,
    "ClassId" INTEGER,
    "IsUnique" BOOLEAN NOT NULL,
    "AddNotNullWhereExp" BOOLEAN NOT NULL,
    "IsAutoGenerated" BOOLEAN NOT NULL,
    "AppliesToSubclassesIfPartial" BOOLEAN NOT NULL,
    "ClassFilter" TEXT
)"#,
    r#"CREATE TABLE IF NOT EXISTS "ec_IndexColumn" (
    "IndexId" INTEGER NOT NULL REFERENCES "ec_Index" ("Id") ON DELETE CASCADE,
    "ColumnId" INTEGER NOT NULL REFERENCES "ec_Column" ("Id") ON DELETE CASCADE,
    "Ordinal" INTEGER NOT NULL
)"#,
    r#"CREATE TABLE IF NOT EXISTS "ec_PropertyMap" (
    "Id" INTEGER PRIMARY KEY,
    "ClassId" INTEGER NOT NULL REFERENCES "ec_Class" ("Id") ON DELETE CASCADE,
    "AccessString" TEXT NOT NULL,
    "ColumnId" INTEGER NOT NULL REFERENCES "ec_Column" ("Id") ON DELETE CASCADE
)"#,
];

/// Names of the catalog tables. They are never part of the mapped model.
pub(crate) const TABLE_NAMES: &[&str] = &[
    "ec_Schema",
    "ec_Class",
    "ec_ClassHasBaseClasses",
    "ec_Property",
    "ec_ClassMap",
    "ec_Table",
    "ec_Column",
    "ec_ForeignKey",
    "ec_Index",
    "ec_IndexColumn",
    "ec_PropertyMap",
];

pub(crate) fn exists(storage: &mut dyn Storage) -> Result<bool> {
    storage.table_exists("ec_Schema")
}

/// Creates the catalog tables on first use. A database that already has a
/// catalog sees no DDL at all.
pub(crate) fn ensure(storage: &mut dyn Storage) -> Result<()> {
    if exists(storage)? {
        return Ok(());
    }

    log::info!("creating system catalog");

    for ddl in TABLES {
        storage.execute_ddl(ddl)?;
    }

    Ok(())
}

/// `true` for the names of catalog tables.
pub(crate) fn is_catalog_table(name: &str) -> bool {
    TABLE_NAMES.iter().any(|table| table.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_table_is_created() {
        assert_eq!(TABLES.len(), TABLE_NAMES.len());

        for (ddl, name) in TABLES.iter().zip(TABLE_NAMES) {
            assert!(ddl.contains(&format!("\"{name}\" (")), "{name}");
        }

        assert!(is_catalog_table("EC_PROPERTYMAP"));
        assert!(!is_catalog_table("ts_Animal"));
    }
}
