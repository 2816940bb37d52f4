use super::Mapper;
use crate::{Error, Result};

use classmap_core::schema::{
    app::{ClassId, ClassMapAttrs},
    db::{TableId, TableType},
    mapping::{JoinedTableInfo, MapStrategy, ShareColumnsMode, Strategy, TphInfo},
};

/// Outcome of resolving the strategy of one class.
#[derive(Debug)]
pub(super) enum Resolution {
    Resolved(ClassMapInfo),

    /// A base class has not been mapped yet. Not an error: the class is
    /// retried once its bases are mapped.
    BaseClassesNotMapped,
}

/// The resolved strategy of a class and the table it maps to.
#[derive(Debug, Clone)]
pub(super) struct ClassMapInfo {
    pub(super) strategy: MapStrategy,

    /// `None` for classes that own no table at all.
    pub(super) table: Option<TableInfo>,

    /// The base whose shared table the class joins.
    pub(super) tph_base: Option<ClassId>,

    /// Joined table receiving the properties the class introduces. It is
    /// only created once such a property is mapped.
    pub(super) joined_table: Option<String>,
}

#[derive(Debug, Clone)]
pub(super) struct TableInfo {
    pub(super) name: String,
    pub(super) ty: TableType,
    pub(super) instance_id_column: String,
    pub(super) exclusive_root: Option<ClassId>,

    /// Rows of several classes share the table.
    pub(super) physical_class_id: bool,
}

impl ClassMapInfo {
    pub(super) fn not_mapped() -> ClassMapInfo {
        ClassMapInfo {
            strategy: MapStrategy::not_mapped(),
            table: None,
            tph_base: None,
            joined_table: None,
        }
    }

    fn new(strategy: MapStrategy, table: TableInfo) -> ClassMapInfo {
        ClassMapInfo {
            strategy,
            table: Some(table),
            tph_base: None,
            joined_table: None,
        }
    }
}

impl Mapper<'_> {
    pub(super) fn resolve(&self, class_id: ClassId) -> Result<Resolution> {
        let app = &self.session.app;
        let class = app.class(class_id);

        if class.is_custom_attribute() || class.is_struct() || app.is_any_class(class_id) {
            return Ok(Resolution::Resolved(ClassMapInfo::not_mapped()));
        }

        if class.is_mixin() {
            let table = self.own_table_info(class_id, TableType::Virtual, None);
            return Ok(Resolution::Resolved(ClassMapInfo::new(
                MapStrategy::new(Strategy::OwnTable, false),
                table,
            )));
        }

        let mut shared: Vec<(ClassId, TableId)> = vec![];
        let mut own = vec![];
        let mut not_mapped = vec![];

        for base in &class.bases {
            if app.class(*base).is_mixin() {
                continue;
            }

            if !self.visited.contains(base) {
                return Ok(Resolution::BaseClassesNotMapped);
            }

            let base_map = self.session.mapping.class(*base);
            if !base_map.strategy.applies_to_subclasses {
                continue;
            }

            match base_map.strategy.strategy {
                Strategy::SharedTable => {
                    if let Some(table) = base_map.primary_table() {
                        if !shared.iter().any(|(_, t)| *t == table) {
                            shared.push((*base, table));
                        }
                    }
                }
                Strategy::OwnTable => own.push(*base),
                Strategy::NotMapped => not_mapped.push(*base),
                _ => {}
            }
        }

        if shared.len() > 1 {
            let bases: Vec<_> = shared
                .iter()
                .map(|(base, _)| format!("`{}`", app.qualified_name(*base)))
                .collect();

            return Err(Error::structural_conflict(format!(
                "class `{}` has more than one base class mapped with SharedTable (AppliesToSubclasses): {}",
                app.qualified_name(class_id),
                bases.join(", ")
            )));
        }

        let info = if let Some((base, table)) = shared.first() {
            self.resolve_tph_child(class_id, *base, *table)?
        } else if let Some(base) = own.first() {
            self.resolve_polymorphic(class_id, *base, Strategy::OwnTable)?
        } else if let Some(base) = not_mapped.first() {
            self.resolve_polymorphic(class_id, *base, Strategy::NotMapped)?
        } else {
            self.resolve_declared(class_id)?
        };

        Ok(Resolution::Resolved(info))
    }

    fn resolve_tph_child(&self, class_id: ClassId, base: ClassId, table: TableId) -> Result<ClassMapInfo> {
        let app = &self.session.app;
        let attrs = &app.class(class_id).attrs;
        let name = app.qualified_name(class_id);

        if attrs.class_map.is_some() {
            return Err(Error::structural_conflict(format!(
                "class `{name}` must not declare a ClassMap custom attribute because its base class `{}` maps all subclasses to a shared table",
                app.qualified_name(base)
            )));
        }

        let base_map = self.session.mapping.class(base);
        let base_tph = base_map.strategy.tph.ok_or_else(|| {
            classmap_core::err!(
                "shared table class `{}` has no shared table options",
                app.qualified_name(base)
            )
        })?;

        let base_shares = matches!(
            base_tph.share_columns,
            ShareColumnsMode::Yes | ShareColumnsMode::ApplyToSubclassesOnly
        );

        let share_columns = if attrs.disable_share_columns {
            if base_shares {
                ShareColumnsMode::ApplyToSubclassesOnly
            } else {
                ShareColumnsMode::No
            }
        } else if base_shares {
            ShareColumnsMode::Yes
        } else {
            share_columns_mode(attrs)
        };

        let joined_table = if attrs.joined_table_per_direct_subclass {
            if base_tph.joined_table != JoinedTableInfo::None {
                return Err(Error::structural_conflict(format!(
                    "class `{name}` declares JoinedTablePerDirectSubclass but base class `{}` already uses a joined table",
                    app.qualified_name(base)
                )));
            }
            JoinedTableInfo::ParentOfJoinedTable
        } else if base_tph.joined_table == JoinedTableInfo::None {
            JoinedTableInfo::None
        } else {
            JoinedTableInfo::JoinedTable
        };

        let tph = TphInfo {
            share_columns,
            max_shared_columns_before_overflow: attrs
                .share_columns
                .as_ref()
                .and_then(|share_columns| share_columns.max_shared_columns_before_overflow)
                .or(base_tph.max_shared_columns_before_overflow),
            joined_table,
        };

        let db_table = self.session.db.table(table);
        let instance_id_column = db_table
            .instance_id_column()
            .map(|column| column.name.clone())
            .unwrap_or_else(|| self.options.default_instance_id_column.clone());

        let mut strategy = MapStrategy::new(Strategy::SharedTable, true);
        strategy.tph = Some(tph);

        Ok(ClassMapInfo {
            strategy,
            table: Some(TableInfo {
                name: db_table.name.clone(),
                ty: db_table.ty,
                instance_id_column,
                exclusive_root: db_table.exclusive_root_class,
                physical_class_id: true,
            }),
            tph_base: Some(base),
            joined_table: match joined_table {
                JoinedTableInfo::JoinedTable => Some(self.joined_table_name(class_id, base)),
                _ => None,
            },
        })
    }

    /// The joined table of a class is named after the direct subclass of
    /// the class that declared JoinedTablePerDirectSubclass.
    fn joined_table_name(&self, class_id: ClassId, base: ClassId) -> String {
        let mut current = class_id;
        let mut parent = Some(base);

        while let Some(base) = parent {
            let base_map = self.session.mapping.class(base);
            if base_map.strategy.joined_table() == JoinedTableInfo::ParentOfJoinedTable {
                break;
            }
            current = base;
            parent = self.tph_base_of(base);
        }

        self.default_table_name(current)
    }

    /// The base a shared-table class inherits its table from.
    pub(super) fn tph_base_of(&self, class_id: ClassId) -> Option<ClassId> {
        let app = &self.session.app;
        app.class(class_id).bases.iter().copied().find(|base| {
            !app.class(*base).is_mixin()
                && self
                    .session
                    .mapping
                    .get(*base)
                    .map(|base_map| base_map.strategy.is_tph())
                    .unwrap_or(false)
        })
    }

    fn resolve_polymorphic(&self, class_id: ClassId, base: ClassId, strategy: Strategy) -> Result<ClassMapInfo> {
        let app = &self.session.app;
        let class = app.class(class_id);

        if let Some(declared) = &class.attrs.class_map {
            if declared.strategy != strategy {
                return Err(Error::structural_conflict(format!(
                    "class `{}` declares {} but its base class `{}` maps all subclasses with {}",
                    app.qualified_name(class_id),
                    declared.strategy.as_str(),
                    app.qualified_name(base),
                    strategy.as_str()
                )));
            }
        }

        check_tph_only_attrs(app.qualified_name(class_id), &class.attrs)?;

        let ty = if strategy == Strategy::NotMapped || class.is_abstract() {
            TableType::Virtual
        } else {
            TableType::Primary
        };

        let instance_id_column = self
            .session
            .mapping
            .class(base)
            .primary_table()
            .and_then(|table| self.session.db.table(table).instance_id_column())
            .map(|column| column.name.clone());

        let table = self.own_table_info(class_id, ty, instance_id_column);
        Ok(ClassMapInfo::new(MapStrategy::new(strategy, true), table))
    }

    /// Resolves a class no polymorphic base strategy applies to.
    fn resolve_declared(&self, class_id: ClassId) -> Result<ClassMapInfo> {
        let app = &self.session.app;
        let class = app.class(class_id);
        let name = app.qualified_name(class_id);

        let Some(declared) = &class.attrs.class_map else {
            check_tph_only_attrs(name, &class.attrs)?;

            let ty = if class.is_abstract() {
                TableType::Virtual
            } else {
                TableType::Primary
            };
            let table = self.own_table_info(class_id, ty, None);
            return Ok(ClassMapInfo::new(MapStrategy::new(Strategy::OwnTable, false), table));
        };

        let instance_id_column = declared.instance_id_column.clone();
        let strategy = MapStrategy::new(declared.strategy, declared.applies_to_subclasses);

        match declared.strategy {
            Strategy::ForeignKeyInSource | Strategy::ForeignKeyInTarget => {
                Err(Error::structural_conflict(format!(
                    "class `{name}` declares {} which only applies to relationships",
                    declared.strategy.as_str()
                )))
            }
            Strategy::ExistingTable => {
                check_tph_only_attrs(name.clone(), &class.attrs)?;

                let Some(table_name) = &declared.table_name else {
                    return Err(Error::structural_conflict(format!(
                        "class `{name}` maps to an existing table but declares no table name"
                    )));
                };

                let mut table = self.own_table_info(class_id, TableType::Existing, instance_id_column);
                table.name = table_name.clone();
                table.exclusive_root = None;
                Ok(ClassMapInfo::new(strategy, table))
            }
            Strategy::SharedTable if declared.applies_to_subclasses => {
                if declared.table_name.is_some() {
                    return Err(Error::structural_conflict(format!(
                        "class `{name}` declares a table name which is only allowed for ExistingTable and non-polymorphic SharedTable"
                    )));
                }

                let mut table = self.own_table_info(class_id, TableType::Primary, instance_id_column);
                table.physical_class_id = true;

                let mut strategy = strategy;
                strategy.tph = Some(TphInfo {
                    share_columns: share_columns_mode(&class.attrs),
                    max_shared_columns_before_overflow: class
                        .attrs
                        .share_columns
                        .as_ref()
                        .and_then(|share_columns| share_columns.max_shared_columns_before_overflow),
                    joined_table: if class.attrs.joined_table_per_direct_subclass {
                        JoinedTableInfo::ParentOfJoinedTable
                    } else {
                        JoinedTableInfo::None
                    },
                });

                Ok(ClassMapInfo::new(strategy, table))
            }
            Strategy::SharedTable => {
                check_tph_only_attrs(name.clone(), &class.attrs)?;

                let Some(table_name) = &declared.table_name else {
                    return Err(Error::structural_conflict(format!(
                        "class `{name}` maps to a shared table but declares no table name"
                    )));
                };

                let mut table = self.own_table_info(class_id, TableType::Primary, instance_id_column);
                table.name = table_name.clone();
                table.exclusive_root = None;
                table.physical_class_id = true;
                Ok(ClassMapInfo::new(strategy, table))
            }
            Strategy::OwnTable | Strategy::NotMapped => {
                check_tph_only_attrs(name.clone(), &class.attrs)?;

                if declared.table_name.is_some() {
                    return Err(Error::structural_conflict(format!(
                        "class `{name}` declares a table name which is only allowed for ExistingTable and non-polymorphic SharedTable"
                    )));
                }

                let ty = if declared.strategy == Strategy::NotMapped || class.is_abstract() {
                    TableType::Virtual
                } else {
                    TableType::Primary
                };

                let table = self.own_table_info(class_id, ty, instance_id_column);
                Ok(ClassMapInfo::new(strategy, table))
            }
        }
    }

    fn own_table_info(&self, class_id: ClassId, ty: TableType, instance_id_column: Option<String>) -> TableInfo {
        TableInfo {
            name: self.default_table_name(class_id),
            ty,
            instance_id_column: instance_id_column
                .unwrap_or_else(|| self.options.default_instance_id_column.clone()),
            exclusive_root: match ty {
                TableType::Virtual | TableType::Existing => None,
                _ => Some(class_id),
            },
            physical_class_id: false,
        }
    }

    /// `{alias}_{ClassName}`, falling back to the schema name.
    pub(super) fn default_table_name(&self, class_id: ClassId) -> String {
        let app = &self.session.app;
        let class = app.class(class_id);
        let schema = app.schema(class.schema);

        let prefix = if schema.alias.is_empty() {
            &schema.name
        } else {
            &schema.alias
        };

        format!("{prefix}_{}", class.name)
    }
}

fn share_columns_mode(attrs: &ClassMapAttrs) -> ShareColumnsMode {
    match &attrs.share_columns {
        Some(share_columns) if share_columns.applies_to_subclasses_only => {
            ShareColumnsMode::ApplyToSubclassesOnly
        }
        Some(_) => ShareColumnsMode::Yes,
        None => ShareColumnsMode::No,
    }
}

/// Shared column and joined table options only make sense inside a
/// table-per-hierarchy.
fn check_tph_only_attrs(name: String, attrs: &ClassMapAttrs) -> Result<()> {
    let attr = if attrs.share_columns.is_some() {
        "ShareColumns"
    } else if attrs.disable_share_columns {
        "DisableShareColumns"
    } else if attrs.joined_table_per_direct_subclass {
        "JoinedTablePerDirectSubclass"
    } else {
        return Ok(());
    };

    Err(Error::structural_conflict(format!(
        "class `{name}` declares {attr} but is not mapped to a shared table with AppliesToSubclasses"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_columns_attribute_picks_mode() {
        let mut attrs = ClassMapAttrs::default();
        assert_eq!(share_columns_mode(&attrs), ShareColumnsMode::No);

        attrs.share_columns(Some(4));
        assert_eq!(share_columns_mode(&attrs), ShareColumnsMode::Yes);

        if let Some(share_columns) = &mut attrs.share_columns {
            share_columns.applies_to_subclasses_only = true;
        }
        assert_eq!(
            share_columns_mode(&attrs),
            ShareColumnsMode::ApplyToSubclassesOnly
        );
    }

    #[test]
    fn tph_options_outside_a_hierarchy_are_rejected() {
        let mut attrs = ClassMapAttrs::default();
        assert!(check_tph_only_attrs("ts:Pet".to_string(), &attrs).is_ok());

        attrs.joined_table_per_direct_subclass = true;
        let err = check_tph_only_attrs("ts:Pet".to_string(), &attrs).unwrap_err();
        assert!(err.is_structural_conflict());
        assert!(err.to_string().contains("JoinedTablePerDirectSubclass"), "{err}");
    }
}
