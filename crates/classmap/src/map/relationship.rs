use super::{resolve::Resolution, ClassMapInfo, Mapper};
use crate::{Error, Result};

use classmap_core::schema::{
    app::{Cardinality, ClassId, Direction, End, Relationship, Strength},
    db::{ColumnId, ColumnKind, ColumnType, ForeignKey, OnDelete, TableId},
    mapping::{ClassMapKind, MapStrategy, Strategy, SystemProperty, SystemPropertyMap},
};

/// Physical tables holding the instances admitted by each end.
#[derive(Default)]
struct EndTables {
    source: Vec<TableId>,
    target: Vec<TableId>,
}

/// Columns of the foreign key end that carry a relationship.
struct FkColumns {
    instance_id: ColumnId,
    relationship_class_id: ColumnId,
}

impl EndTables {
    fn get(&self, end: End) -> &[TableId] {
        match end {
            End::Source => &self.source,
            End::Target => &self.target,
        }
    }
}

impl Mapper<'_> {
    /// Maps a relationship class. Returns `false` while a base class or a
    /// class of either end still waits to be mapped.
    pub(super) fn map_relationship(&mut self, class: ClassId) -> Result<bool> {
        let app = &self.session.app;

        let mut base_map = None;
        for base in &app.class(class).bases {
            if app.class(*base).is_mixin() {
                continue;
            }
            if !self.visited.contains(base) {
                return Ok(false);
            }
            base_map = self.session.mapping.get(*base).cloned();
        }

        let Some(ends) = self.end_tables(class) else {
            return Ok(false);
        };

        match base_map.map(|base_map| base_map.kind) {
            Some(ClassMapKind::RelationshipEndTable { .. }) => {
                self.map_derived_foreign_key(class)?;
            }
            Some(ClassMapKind::NotMapped) => {
                self.apply(class, ClassMapInfo::not_mapped(), ClassMapKind::NotMapped)?;
            }
            Some(_) => {
                if self.session.app.class(class).attrs.link_table.is_some() {
                    return Err(Error::structural_conflict(format!(
                        "relationship `{}` declares a link table mapping which is only allowed on root relationship classes",
                        self.session.app.qualified_name(class)
                    )));
                }
                self.map_link_table(class)?;
            }
            None => self.map_root_relationship(class, &ends)?,
        }

        Ok(true)
    }

    fn map_root_relationship(&mut self, class: ClassId, ends: &EndTables) -> Result<()> {
        let app = &self.session.app;
        let name = app.qualified_name(class);
        let def = app.class(class);
        let relationship = relationship_of(def.as_relationship(), &name)?;

        let declared = def.attrs.class_map.as_ref().map(|attr| attr.strategy);

        if declared == Some(Strategy::NotMapped) {
            return self.apply(class, ClassMapInfo::not_mapped(), ClassMapKind::NotMapped);
        }

        let has_properties = !app.properties(class).is_empty();
        let many_to_many = relationship.cardinality() == Cardinality::ManyToMany;
        let declares_link_table = def.attrs.link_table.is_some()
            || matches!(declared, Some(strategy) if !strategy.is_foreign_key());

        if has_properties || many_to_many || declares_link_table {
            let declares_foreign_key =
                def.attrs.foreign_key.is_some() || matches!(declared, Some(strategy) if strategy.is_foreign_key());

            if declares_foreign_key {
                let reason = if has_properties {
                    "it has properties"
                } else if many_to_many {
                    "it is many to many"
                } else {
                    "it declares a link table mapping"
                };

                return Err(Error::structural_conflict(format!(
                    "relationship `{name}` declares a foreign key mapping but must be mapped to a link table because {reason}"
                )));
            }

            if relationship.strength == Strength::Embedding {
                return Err(Error::structural_conflict(format!(
                    "relationship `{name}` has strength Embedding which is not supported for link table relationships"
                )));
            }

            return self.map_link_table(class);
        }

        let forced = match declared {
            Some(Strategy::ForeignKeyInSource) => Some(End::Source),
            Some(Strategy::ForeignKeyInTarget) => Some(End::Target),
            _ => None,
        };

        self.map_foreign_key(class, ends, forced)
    }

    fn map_link_table(&mut self, class: ClassId) -> Result<()> {
        let info = match self.resolve(class)? {
            Resolution::Resolved(info) => info,
            Resolution::BaseClassesNotMapped => {
                return Err(classmap_core::err!(
                    "base classes of `{}` are not mapped",
                    self.session.app.qualified_name(class)
                ))
            }
        };

        self.apply(class, info, ClassMapKind::RelationshipLinkTable)
    }

    /// Places the relationship in a foreign key column of one end.
    fn map_foreign_key(&mut self, class: ClassId, ends: &EndTables, forced: Option<End>) -> Result<()> {
        let app = &self.session.app;
        let name = app.qualified_name(class);
        let relationship = relationship_of(app.class(class).as_relationship(), &name)?.clone();
        let cardinality = relationship.cardinality();

        let mut fk_end = match (cardinality, forced) {
            (Cardinality::OneToMany, Some(End::Source)) | (Cardinality::ManyToOne, Some(End::Target)) => {
                return Err(Error::structural_conflict(format!(
                    "relationship `{name}` declares the foreign key in the {} table but its cardinality requires the {} table",
                    forced.map(End::as_str).unwrap_or_default(),
                    forced.map(End::opposite).map(End::as_str).unwrap_or_default()
                )));
            }
            (Cardinality::OneToMany, _) => End::Target,
            (Cardinality::ManyToOne, _) => End::Source,
            (_, Some(end)) => end,
            (_, None) => match relationship.strength_direction {
                Direction::Forward => End::Target,
                Direction::Backward => End::Source,
            },
        };

        if ends.get(fk_end).len() > 1 {
            let other = fk_end.opposite();
            if cardinality == Cardinality::OneToOne && forced.is_none() && ends.get(other).len() == 1 {
                fk_end = other;
            } else {
                self.issues.warning(format!(
                    "relationship `{name}` is not mapped: its {} end spans {} tables and cannot hold the foreign key",
                    fk_end.as_str(),
                    ends.get(fk_end).len()
                ));
                return self.apply(class, ClassMapInfo::not_mapped(), ClassMapKind::NotMapped);
            }
        }

        let Some(&end_table) = ends.get(fk_end).first() else {
            self.issues.warning(format!(
                "relationship `{name}` is not mapped: its {} end has no table",
                fk_end.as_str()
            ));
            return self.apply(class, ClassMapInfo::not_mapped(), ClassMapKind::NotMapped);
        };

        if relationship.strength == Strength::Embedding {
            let embedded = match relationship.strength_direction {
                Direction::Forward => End::Target,
                Direction::Backward => End::Source,
            };
            if embedded != fk_end {
                return Err(Error::structural_conflict(format!(
                    "relationship `{name}` has strength Embedding towards its {} end but the foreign key must be in the {} table",
                    embedded.as_str(),
                    fk_end.as_str()
                )));
            }
        }

        let strategy = MapStrategy::new(
            match fk_end {
                End::Source => Strategy::ForeignKeyInSource,
                End::Target => Strategy::ForeignKeyInTarget,
            },
            true,
        );
        let kind = ClassMapKind::RelationshipEndTable { fk_end };
        let class_map = self.start_class_map(class, &strategy, kind)?;

        let columns = self.foreign_key_columns(class, fk_end, &relationship, end_table);
        let fk_table = columns.instance_id.table;

        let other = fk_end.opposite();
        let alias = self.session.app.alias(class).to_string();
        let rel_name = self.session.app.class(class).name.clone();

        let (other_id_kind, other_class_kind) = end_kinds(other);
        let other_class_id = self.ensure_virtual_column(
            fk_table,
            &format!("{alias}_{rel_name}_{}ECClassId", capitalize(other.as_str())),
            ColumnType::Integer,
        );
        self.add_column_kind(other_class_id, other_class_kind);
        self.add_column_kind(columns.instance_id, other_id_kind);
        self.add_column_kind(columns.relationship_class_id, ColumnKind::RELATIONSHIP_CLASS_ID);

        let referenced = match ends.get(other) {
            [table] => Some(*table),
            _ => None,
        };

        let on_delete = self
            .session
            .app
            .class(class)
            .attrs
            .foreign_key
            .as_ref()
            .and_then(|attr| attr.on_delete)
            .unwrap_or(match relationship.strength {
                Strength::Embedding => OnDelete::Cascade,
                _ => OnDelete::SetNull,
            });

        if let Some(referenced) = referenced {
            self.add_foreign_key(columns.instance_id, referenced, on_delete);
        }

        let fk_column = self.session.db.column(columns.instance_id);
        if fk_column.is_physical() && self.session.db.table(fk_table).is_managed() {
            let index = format!(
                "ix_{}_fk_{alias}_{rel_name}_{}",
                self.session.db.table(fk_table).name,
                fk_end.as_str()
            );
            let unique = cardinality == Cardinality::OneToOne;
            self.add_auto_index(&index, fk_table, vec![columns.instance_id], unique, false);
        }

        let table = self.session.db.table(fk_table);
        let Some(end_instance_id) = table.instance_id_column().map(|column| column.id) else {
            return Err(classmap_core::err!("table `{}` has no instance id column", table.name));
        };
        let Some(end_class_id) = table.class_id_column().map(|column| column.id) else {
            return Err(classmap_core::err!("table `{}` has no class id column", table.name));
        };

        let (source, target) = match fk_end {
            End::Target => ((columns.instance_id, other_class_id), (end_instance_id, end_class_id)),
            End::Source => ((end_instance_id, end_class_id), (columns.instance_id, other_class_id)),
        };

        let system = vec![
            system_map(SystemProperty::InstanceId, end_instance_id),
            system_map(SystemProperty::ClassId, columns.relationship_class_id),
            system_map(SystemProperty::SourceInstanceId, source.0),
            system_map(SystemProperty::SourceClassId, source.1),
            system_map(SystemProperty::TargetInstanceId, target.0),
            system_map(SystemProperty::TargetClassId, target.1),
        ];

        log::debug!(
            "mapped foreign key relationship; class={name} table={} end={}",
            self.session.db.table(fk_table).name,
            fk_end.as_str()
        );

        self.finish_class_map(class_map, vec![fk_table], system);
        Ok(())
    }

    /// The navigation property pointing at the relationship provides the
    /// foreign key columns when one is declared on the foreign key end.
    fn foreign_key_columns(
        &mut self,
        class: ClassId,
        fk_end: End,
        relationship: &Relationship<ClassId>,
        end_table: TableId,
    ) -> FkColumns {
        let end_classes = self
            .session
            .app
            .constraint_classes(relationship.constraint(fk_end));

        for end_class in end_classes {
            let Some(class_map) = self.session.mapping.get(end_class) else {
                continue;
            };

            for inherited in self.session.app.properties(end_class) {
                let property = inherited.property;
                if !matches!(property.as_navigation(), Some((relationship, _)) if relationship == class) {
                    continue;
                }

                let id = class_map
                    .find(&format!("{}.Id", property.name))
                    .and_then(|map| map.column());
                let rel_class_id = class_map
                    .find(&format!("{}.RelECClassId", property.name))
                    .and_then(|map| map.column());

                if let (Some(instance_id), Some(relationship_class_id)) = (id, rel_class_id) {
                    return FkColumns {
                        instance_id,
                        relationship_class_id,
                    };
                }
            }
        }

        let rel_name = self.session.app.class(class).name.clone();
        let instance_id = self.ensure_column(
            end_table,
            &format!("ForeignECInstanceId_{rel_name}"),
            ColumnType::Integer,
        );
        let relationship_class_id = self.ensure_virtual_column(
            end_table,
            &format!("ForeignECClassId_{rel_name}"),
            ColumnType::Integer,
        );

        FkColumns {
            instance_id,
            relationship_class_id,
        }
    }

    /// A relationship deriving from a foreign key relationship lives in the
    /// same columns as its base.
    fn map_derived_foreign_key(&mut self, class: ClassId) -> Result<()> {
        let app = &self.session.app;

        if !app.class(class).properties.is_empty() {
            return Err(Error::structural_conflict(format!(
                "relationship `{}` derives from a foreign key relationship and cannot declare properties",
                app.qualified_name(class)
            )));
        }

        let Some(base) = app
            .class(class)
            .bases
            .iter()
            .copied()
            .find(|base| !app.class(*base).is_mixin())
        else {
            return Err(classmap_core::err!(
                "relationship `{}` has no base relationship",
                app.qualified_name(class)
            ));
        };

        let base_map = self.session.mapping.class(base).clone();
        let class_map = self.start_class_map(class, &base_map.strategy, base_map.kind)?;
        self.finish_class_map(class_map, base_map.tables, base_map.system);
        Ok(())
    }

    /// Adds the end columns, constraints and indexes of a link table.
    pub(super) fn map_link_columns(&mut self, class: ClassId, primary: TableId) -> Result<Vec<SystemPropertyMap>> {
        let app = &self.session.app;
        let name = app.qualified_name(class);
        let relationship = relationship_of(app.class(class).as_relationship(), &name)?.clone();

        let attr = std::iter::once(class)
            .chain(app.ancestors(class))
            .find_map(|class| app.class(class).attrs.link_table.clone())
            .unwrap_or_default();

        let ends = self.end_tables(class).unwrap_or_default();

        let is_new = self.session.db.table(primary).catalog_id.is_none();
        let mut system = vec![];
        let mut id_columns = vec![];

        for end in [End::Source, End::Target] {
            let constraint = relationship.constraint(end);
            let (id_kind, class_kind) = end_kinds(end);
            let (id_property, class_property) = end_system_properties(end);
            let prefix = capitalize(end.as_str());

            let id_name = match end {
                End::Source => attr.source_column.clone(),
                End::Target => attr.target_column.clone(),
            }
            .unwrap_or_else(|| format!("{prefix}Id"));

            let id = self.ensure_column(primary, &id_name, ColumnType::Integer);
            self.add_column_kind(id, id_kind);
            if is_new {
                self.session.db.column_mut(id).not_null = true;
            }

            let class_id_name = format!("{prefix}ECClassId");
            let class_id = if constraint.polymorphic || constraint.classes.len() > 1 {
                self.ensure_column(primary, &class_id_name, ColumnType::Integer)
            } else {
                self.ensure_virtual_column(primary, &class_id_name, ColumnType::Integer)
            };
            self.add_column_kind(class_id, class_kind);

            if let ([referenced], true) = (ends.get(end), attr.create_foreign_key_constraints) {
                self.add_foreign_key(id, *referenced, OnDelete::Cascade);
            }

            system.push(system_map(id_property, id));
            system.push(system_map(class_property, class_id));
            id_columns.push(id);
        }

        if self.session.db.table(primary).is_managed() {
            let table = self.session.db.table(primary).name.clone();
            self.add_auto_index(&format!("ix_{table}_source"), primary, vec![id_columns[0]], false, false);
            self.add_auto_index(&format!("ix_{table}_target"), primary, vec![id_columns[1]], false, false);

            if !attr.allow_duplicate_relationships {
                self.add_auto_index(
                    &format!("uix_{table}_sourcetarget"),
                    primary,
                    id_columns.clone(),
                    true,
                    false,
                );
            }
        }

        Ok(system)
    }

    /// Tables of both ends, or `None` while a class of either end is not
    /// mapped yet. Virtual tables hold no rows and are left out.
    fn end_tables(&self, class: ClassId) -> Option<EndTables> {
        let app = &self.session.app;
        let relationship = app.class(class).as_relationship()?;

        let tables = |end: End| -> Option<Vec<TableId>> {
            let mut tables = vec![];
            for end_class in app.constraint_classes(relationship.constraint(end)) {
                if !self.visited.contains(&end_class) {
                    return None;
                }

                let Some(class_map) = self.session.mapping.get(end_class) else {
                    continue;
                };

                if let Some(table) = class_map.primary_table() {
                    if !self.session.db.table(table).is_virtual() && !tables.contains(&table) {
                        tables.push(table);
                    }
                }
            }
            Some(tables)
        };

        Some(EndTables {
            source: tables(End::Source)?,
            target: tables(End::Target)?,
        })
    }

    fn add_column_kind(&mut self, column: ColumnId, kind: ColumnKind) {
        let column = self.session.db.column_mut(column);
        if !column.is_shared() {
            column.kind |= kind;
        }
    }

    fn add_foreign_key(&mut self, column: ColumnId, referenced: TableId, on_delete: OnDelete) {
        let db = &self.session.db;

        if db.column(column).is_virtual() || !db.table(column.table).is_managed() {
            return;
        }

        let Some(references) = db.table(referenced).instance_id_column().map(|column| column.id) else {
            return;
        };

        let table = self.session.db.table_mut(column.table);
        if table.foreign_keys.iter().any(|fk| fk.column == column) {
            return;
        }

        table.foreign_keys.push(ForeignKey {
            column,
            references,
            on_delete,
        });
    }
}

fn relationship_of<'a>(
    relationship: Option<&'a Relationship<ClassId>>,
    name: &str,
) -> Result<&'a Relationship<ClassId>> {
    relationship.ok_or_else(|| classmap_core::err!("class `{name}` is not a relationship"))
}

fn end_kinds(end: End) -> (ColumnKind, ColumnKind) {
    match end {
        End::Source => (ColumnKind::SOURCE_INSTANCE_ID, ColumnKind::SOURCE_CLASS_ID),
        End::Target => (ColumnKind::TARGET_INSTANCE_ID, ColumnKind::TARGET_CLASS_ID),
    }
}

fn end_system_properties(end: End) -> (SystemProperty, SystemProperty) {
    match end {
        End::Source => (SystemProperty::SourceInstanceId, SystemProperty::SourceClassId),
        End::Target => (SystemProperty::TargetInstanceId, SystemProperty::TargetClassId),
    }
}

fn system_map(kind: SystemProperty, column: ColumnId) -> SystemPropertyMap {
    SystemPropertyMap {
        kind,
        columns: vec![column],
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
