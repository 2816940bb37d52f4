//! Merges the schemas of an import with the classes already persisted in
//! the catalog.

use crate::{catalog::Persisted, Error, Result, Storage};

use classmap_core::{
    schema::app::{self, ClassDef, ClassEntry, ClassId, ClassRef, PropertyId, SchemaDef, SchemaId, SchemaInfo},
    stmt::Value,
};

use std::collections::HashSet;

pub(super) struct Imported {
    pub(super) app: app::Schema,

    /// Properties added to classes that were already persisted
    pub(super) added_properties: Vec<(ClassId, String)>,

    /// `(class, base)` pairs added to classes that were already persisted
    pub(super) added_bases: Vec<(ClassId, ClassId)>,
}

/// Writes the schemas, classes and properties of the import to the catalog
/// and resolves every known class.
pub(super) fn import(storage: &mut dyn Storage, persisted: &Persisted, schemas: &[SchemaDef]) -> Result<Imported> {
    let mut schema_infos = persisted.schemas.clone();
    let mut entries = persisted.classes.clone();
    let mut added_properties = vec![];
    let mut added_base_refs: Vec<(ClassId, ClassRef, String)> = vec![];
    let mut seen = HashSet::new();

    for schema in schemas {
        if schema.supplemental {
            log::debug!("skipping supplemental schema; name={}", schema.name);
            continue;
        }

        if !seen.insert(schema.name.to_ascii_lowercase()) {
            return Err(Error::invalid_schema(format!(
                "schema `{}` is supplied more than once",
                schema.name
            )));
        }

        let schema_id = import_schema(storage, &mut schema_infos, schema)?;

        let mut names = HashSet::new();
        for def in &schema.classes {
            if !names.insert(def.name.as_str()) {
                return Err(Error::invalid_schema(format!(
                    "class `{}:{}` is defined more than once",
                    schema.name, def.name
                )));
            }
        }

        // Classes may be added but never removed.
        for entry in entries.iter().filter(|entry| entry.schema == schema_id) {
            if !names.contains(entry.def.name.as_str()) {
                return Err(Error::structural_conflict(format!(
                    "class `{}:{}` cannot be deleted",
                    schema.name, entry.def.name
                )));
            }
        }

        for def in &schema.classes {
            let existing = entries
                .iter_mut()
                .find(|entry| entry.schema == schema_id && entry.def.name == def.name);

            match existing {
                Some(entry) => {
                    let changes = update_class(storage, &schema.name, entry, def)?;
                    added_properties.extend(changes.properties.into_iter().map(|name| (entry.id, name)));
                    added_base_refs.extend(
                        changes
                            .bases
                            .into_iter()
                            .map(|base| (entry.id, base, schema.name.clone())),
                    );
                }
                None => entries.push(insert_class(storage, schema_id, def)?),
            }
        }
    }

    let mut builder = app::Builder::new();
    for schema in &schema_infos {
        builder.schema(schema.clone());
    }
    for entry in &entries {
        builder.class(entry.clone());
    }
    let app = builder.build()?;

    let mut added_bases = vec![];
    for (class, base, schema) in &added_base_refs {
        let Some(base) = app.resolve(base, schema) else {
            return Err(Error::invalid_schema(format!(
                "base class `{base}` of `{}` does not exist",
                app.qualified_name(*class)
            )));
        };
        added_bases.push((*class, base.id));
    }

    save_base_classes(storage, &app)?;

    Ok(Imported {
        app,
        added_properties,
        added_bases,
    })
}

fn import_schema(storage: &mut dyn Storage, infos: &mut Vec<SchemaInfo>, schema: &SchemaDef) -> Result<SchemaId> {
    if let Some(info) = infos
        .iter_mut()
        .find(|info| info.name.eq_ignore_ascii_case(&schema.name))
    {
        if schema.version < info.version {
            return Err(Error::structural_conflict(format!(
                "schema `{}` cannot be downgraded from version {} to {}",
                schema.name, info.version, schema.version
            )));
        }

        if !schema.alias.eq_ignore_ascii_case(&info.alias) {
            return Err(Error::structural_conflict(format!(
                "the alias of schema `{}` cannot change from `{}` to `{}`",
                schema.name, info.alias, schema.alias
            )));
        }

        if schema.version > info.version {
            log::info!(
                "upgrading schema; name={} from={} to={}",
                schema.name,
                info.version,
                schema.version
            );

            storage.execute(
                r#"UPDATE "ec_Schema" SET "VersionMajor" = ?1, "VersionWrite" = ?2, "VersionMinor" = ?3 WHERE "Id" = ?4"#,
                &[
                    Value::from(i64::from(schema.version.read)),
                    Value::from(i64::from(schema.version.write)),
                    Value::from(i64::from(schema.version.minor)),
                    Value::from(info.id.0),
                ],
            )?;
            info.version = schema.version;
        }

        return Ok(info.id);
    }

    let id = storage.insert(
        r#"INSERT INTO "ec_Schema" ("Name", "Alias", "VersionMajor", "VersionWrite", "VersionMinor", "IsSystem") VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        &[
            Value::from(schema.name.as_str()),
            Value::from(schema.alias.as_str()),
            Value::from(i64::from(schema.version.read)),
            Value::from(i64::from(schema.version.write)),
            Value::from(i64::from(schema.version.minor)),
            Value::from(schema.system),
        ],
    )?;

    log::info!("importing schema; name={} version={}", schema.name, schema.version);

    let info = SchemaInfo {
        id: SchemaId(id),
        name: schema.name.clone(),
        alias: schema.alias.clone(),
        version: schema.version,
        system: schema.system,
    };
    infos.push(info);

    Ok(SchemaId(id))
}

fn insert_class(storage: &mut dyn Storage, schema: SchemaId, def: &ClassDef) -> Result<ClassEntry> {
    let id = storage.insert(
        r#"INSERT INTO "ec_Class" ("SchemaId", "Name", "Definition") VALUES (?1, ?2, ?3)"#,
        &[
            Value::from(schema.0),
            Value::from(def.name.as_str()),
            Value::from(class_definition(def)?),
        ],
    )?;

    let mut property_ids = vec![];
    for (ordinal, property) in def.properties.iter().enumerate() {
        property_ids.push(insert_property(storage, ClassId(id), ordinal, property)?);
    }

    Ok(ClassEntry {
        id: ClassId(id),
        schema,
        def: def.clone(),
        property_ids,
    })
}

/// What an upgrade added to a persisted class.
#[derive(Default)]
struct ClassChanges {
    properties: Vec<String>,
    bases: Vec<ClassRef>,
}

fn update_class(
    storage: &mut dyn Storage,
    schema: &str,
    entry: &mut ClassEntry,
    def: &ClassDef,
) -> Result<ClassChanges> {
    let name = format!("{schema}:{}", def.name);
    let mut changes = ClassChanges::default();

    if std::mem::discriminant(&entry.def.kind) != std::mem::discriminant(&def.kind) {
        return Err(Error::structural_conflict(format!(
            "the kind of class `{name}` cannot change"
        )));
    }

    let qualify = |base: &ClassRef| match &base.schema {
        Some(_) => base.to_string(),
        None => format!("{schema}:{}", base.name),
    };

    let old_bases: Vec<String> = entry.def.bases.iter().map(qualify).collect();
    let new_bases: Vec<String> = def.bases.iter().map(qualify).collect();

    if let Some(removed) = old_bases.iter().find(|base| !new_bases.contains(base)) {
        return Err(Error::structural_conflict(format!(
            "base class `{removed}` cannot be removed from class `{name}`"
        )));
    }

    for (base, qualified) in def.bases.iter().zip(&new_bases) {
        if !old_bases.contains(qualified) {
            changes.bases.push(base.clone());
        }
    }

    let mut property_ids = vec![];
    for (ordinal, property) in def.properties.iter().enumerate() {
        let existing = entry
            .def
            .properties
            .iter()
            .position(|old| old.name == property.name);

        match existing {
            Some(pos) => {
                let old = &entry.def.properties[pos];
                if !old.kind.same_shape(&property.kind) {
                    return Err(Error::structural_conflict(format!(
                        "property `{name}.{}` cannot change from {} to {}",
                        property.name,
                        old.kind.name(),
                        property.kind.name()
                    )));
                }

                let id = entry.property_ids[pos];
                storage.execute(
                    r#"UPDATE "ec_Property" SET "Ordinal" = ?1, "Definition" = ?2 WHERE "Id" = ?3"#,
                    &[
                        Value::from(i64::try_from(ordinal)?),
                        Value::from(serde_json::to_string(property)?),
                        Value::from(id.0),
                    ],
                )?;
                property_ids.push(id);
            }
            None => {
                log::debug!("adding property; class={name} property={}", property.name);
                property_ids.push(insert_property(storage, entry.id, ordinal, property)?);
                changes.properties.push(property.name.clone());
            }
        }
    }

    for (old, id) in entry.def.properties.iter().zip(&entry.property_ids) {
        if !def.properties.iter().any(|property| property.name == old.name) {
            log::debug!("deleting property; class={name} property={}", old.name);
            storage.execute(
                r#"DELETE FROM "ec_Property" WHERE "Id" = ?1"#,
                &[Value::from(id.0)],
            )?;
        }
    }

    storage.execute(
        r#"UPDATE "ec_Class" SET "Definition" = ?1 WHERE "Id" = ?2"#,
        &[Value::from(class_definition(def)?), Value::from(entry.id.0)],
    )?;

    entry.def = def.clone();
    entry.property_ids = property_ids;

    Ok(changes)
}

fn insert_property(
    storage: &mut dyn Storage,
    class: ClassId,
    ordinal: usize,
    property: &app::PropertyDef,
) -> Result<PropertyId> {
    let id = storage.insert(
        r#"INSERT INTO "ec_Property" ("ClassId", "Name", "Ordinal", "Definition") VALUES (?1, ?2, ?3, ?4)"#,
        &[
            Value::from(class.0),
            Value::from(property.name.as_str()),
            Value::from(i64::try_from(ordinal)?),
            Value::from(serde_json::to_string(property)?),
        ],
    )?;

    Ok(PropertyId(id))
}

/// Properties live in `ec_Property`; the class row holds everything else.
fn class_definition(def: &ClassDef) -> Result<String> {
    let mut def = def.clone();
    def.properties.clear();
    Ok(serde_json::to_string(&def)?)
}

fn save_base_classes(storage: &mut dyn Storage, app: &app::Schema) -> Result<()> {
    storage.execute(r#"DELETE FROM "ec_ClassHasBaseClasses""#, &[])?;

    for class in app.classes() {
        for (ordinal, base) in class.bases.iter().enumerate() {
            storage.execute(
                r#"INSERT INTO "ec_ClassHasBaseClasses" ("ClassId", "BaseClassId", "Ordinal") VALUES (?1, ?2, ?3)"#,
                &[
                    Value::from(class.id.0),
                    Value::from(base.0),
                    Value::from(i64::try_from(ordinal)?),
                ],
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use classmap_core::schema::app::{PrimitiveType, PropertyDef};

    #[test]
    fn class_rows_do_not_repeat_properties() {
        let def = ClassDef::entity("Pet").property(PropertyDef::primitive("Name", PrimitiveType::String));
        let json = class_definition(&def).unwrap();

        let stored: ClassDef = serde_json::from_str(&json).unwrap();
        assert_eq!(stored.name, "Pet");
        assert!(stored.properties.is_empty());
    }
}
