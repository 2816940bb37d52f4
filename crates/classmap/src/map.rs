mod columns;

mod import;

mod index;

mod properties;

mod relationship;

mod resolve;
use resolve::{ClassMapInfo, Resolution};

mod tables;

use crate::{
    catalog, db_map::Options, persistence, purge, remap::RemapInfo, session::MappingSession,
    verify, Error, Result, Storage,
};

use classmap_core::{
    schema::{
        app::{ClassId, SchemaDef},
        db::TableId,
        mapping::{ClassMap, ClassMapKind, MapStrategy, SystemProperty, SystemPropertyMap},
    },
    Issues,
};
use classmap_sql::Serializer;

use std::collections::HashSet;

/// Maps every class of an import onto the physical model, then brings the
/// catalog and storage in line with it.
pub(crate) struct Mapper<'a> {
    session: &'a mut MappingSession,
    storage: &'a mut dyn Storage,
    options: &'a Options,
    issues: &'a Issues,
    serializer: Serializer,
    remap: RemapInfo,

    /// Classes mapped during this import
    visited: HashSet<ClassId>,

    /// Classes waiting for one of their bases to be mapped
    deferred: Vec<ClassId>,
}

impl<'a> Mapper<'a> {
    pub(crate) fn new(
        session: &'a mut MappingSession,
        storage: &'a mut dyn Storage,
        options: &'a Options,
        issues: &'a Issues,
    ) -> Mapper<'a> {
        let serializer = Serializer::for_capability(storage.capability());

        Mapper {
            session,
            storage,
            options,
            issues,
            serializer,
            remap: RemapInfo::default(),
            visited: HashSet::new(),
            deferred: vec![],
        }
    }

    pub(crate) fn run(&mut self, schemas: &[SchemaDef]) -> Result<()> {
        let persisted = catalog::read(self.storage, &mut self.session.db)?;

        let imported = import::import(self.storage, &persisted, schemas)?;
        self.session.app = imported.app;
        self.remap.added_properties = imported.added_properties;
        self.remap.added_bases = imported.added_bases;

        self.session
            .load_class_maps(&persisted.class_maps, &persisted.property_maps)?;

        self.remap.clean(self.storage, self.session)?;

        self.map_classes()?;
        self.build_indexes()?;

        catalog::save(self.storage, self.session)?;

        let ddl = persistence::sync_tables(self.storage, &self.session.db, &self.serializer)?;
        log::debug!("synchronized tables; statements={ddl}");

        let moves = self.remap.moves(self.session);
        crate::remap::migrate(self.storage, &self.session.db, &self.serializer, moves)?;

        persistence::create_indexes(self.storage, &self.session.db, &self.serializer)?;

        purge::purge(
            self.storage,
            self.session,
            &self.serializer,
            self.options.allow_changeset_incompatible_drops,
        )?;

        verify::verify(self.storage, self.session, self.options.validation, self.issues)
    }

    /// Walks every class hierarchy from its roots. Mixins go first because
    /// they never drive the physical layout, relationships last because
    /// they need the classes they connect.
    fn map_classes(&mut self) -> Result<()> {
        let mut mixins = vec![];
        let mut classes = vec![];
        let mut relationships = vec![];

        for class in self.session.app.classes() {
            if !class.bases.is_empty() {
                continue;
            }

            if class.is_mixin() {
                mixins.push(class.id);
            } else if class.is_relationship() {
                relationships.push(class.id);
            } else {
                classes.push(class.id);
            }
        }

        for root in mixins.into_iter().chain(classes).chain(relationships) {
            self.map_tree(root)?;
        }

        // Retry until a pass makes no progress. Classes no walk reached
        // are tried as well.
        loop {
            let mut pending = std::mem::take(&mut self.deferred);
            for class in self.session.app.classes.keys() {
                if !self.visited.contains(class) && !pending.contains(class) {
                    pending.push(*class);
                }
            }

            // A class deferred by one base may have been mapped through another.
            pending.retain(|class| !self.visited.contains(class));

            if pending.is_empty() {
                return Ok(());
            }

            let before = self.visited.len();
            for class in &pending {
                self.map_tree(*class)?;
            }

            if self.visited.len() == before {
                let names: Vec<_> = pending
                    .iter()
                    .filter(|class| !self.visited.contains(class))
                    .map(|class| format!("`{}`", self.session.app.qualified_name(*class)))
                    .collect();

                return Err(Error::invalid_schema(format!(
                    "the base classes of {} could not be mapped",
                    names.join(", ")
                )));
            }
        }
    }

    fn map_tree(&mut self, class: ClassId) -> Result<()> {
        if self.visited.contains(&class) {
            return Ok(());
        }

        if !self.map_class(class)? {
            if !self.deferred.contains(&class) {
                log::debug!(
                    "deferring class until its bases are mapped; class={}",
                    self.session.app.qualified_name(class)
                );
                self.deferred.push(class);
            }
            return Ok(());
        }

        self.visited.insert(class);
        self.deferred.retain(|deferred| *deferred != class);

        let is_mixin = self.session.app.class(class).is_mixin();

        for derived in self.session.app.derived_classes(class) {
            if self.session.app.class(derived).is_mixin() && !is_mixin {
                continue;
            }

            self.map_tree(derived)?;
        }

        Ok(())
    }

    /// Returns `false` when the class has to wait for its bases.
    fn map_class(&mut self, class: ClassId) -> Result<bool> {
        if self.session.app.class(class).is_relationship() {
            return self
                .map_relationship(class)
                .map_err(|err| err.context(self.mapping_context(class)));
        }

        let info = match self.resolve(class) {
            Ok(Resolution::Resolved(info)) => info,
            Ok(Resolution::BaseClassesNotMapped) => return Ok(false),
            Err(err) => return Err(err.context(self.mapping_context(class))),
        };

        self.apply(class, info, ClassMapKind::Class)
            .map_err(|err| err.context(self.mapping_context(class)))?;

        Ok(true)
    }

    fn mapping_context(&self, class: ClassId) -> Error {
        classmap_core::err!("mapping class `{}`", self.session.app.qualified_name(class))
    }

    /// Builds, or updates, the class map of `class` from its resolution.
    fn apply(&mut self, class: ClassId, info: ClassMapInfo, kind: ClassMapKind) -> Result<()> {
        let kind = if info.strategy.is_not_mapped() {
            ClassMapKind::NotMapped
        } else {
            kind
        };

        log::debug!(
            "mapping class; class={} strategy={}",
            self.session.app.qualified_name(class),
            info.strategy
        );

        let mut class_map = self.start_class_map(class, &info.strategy, kind)?;

        let primary = match &info.table {
            Some(table) => Some(self.find_or_create_table(table)?),
            None => None,
        };

        let mut extra_system = vec![];
        if let (ClassMapKind::RelationshipLinkTable, Some(primary)) = (kind, primary) {
            extra_system = self.map_link_columns(class, primary)?;
        }

        self.map_properties(&mut class_map, &info, primary)?;

        let tables = self.class_tables(&class_map, primary);
        let mut system = self.class_system_maps(&tables);
        system.extend(extra_system);

        self.finish_class_map(class_map, tables, system);
        Ok(())
    }

    /// Starts from the persisted map of the class when there is one. A
    /// persisted class may not change its strategy.
    fn start_class_map(
        &self,
        class: ClassId,
        strategy: &MapStrategy,
        kind: ClassMapKind,
    ) -> Result<ClassMap> {
        let Some(existing) = self.session.mapping.get(class) else {
            return Ok(ClassMap::new(class, strategy.clone(), kind));
        };

        if !existing.strategy.is_same_strategy(strategy) {
            return Err(Error::structural_conflict(format!(
                "class `{}` is mapped with {} and cannot change to {}",
                self.session.app.qualified_name(class),
                existing.strategy,
                strategy
            )));
        }

        let mut class_map = existing.clone();
        class_map.kind = kind;

        if class_map.strategy != *strategy {
            class_map.strategy = strategy.clone();
            class_map.touch();
        }

        Ok(class_map)
    }

    fn finish_class_map(
        &mut self,
        mut class_map: ClassMap,
        tables: Vec<TableId>,
        system: Vec<SystemPropertyMap>,
    ) {
        if class_map.tables != tables || class_map.system != system {
            class_map.tables = tables;
            class_map.system = system;
            class_map.touch();
        }

        if self.session.mapping.contains(class_map.class) {
            self.session.mapping.replace(class_map);
        } else {
            self.session.mapping.insert(class_map);
        }
    }

    /// The primary table followed by every other table holding data of
    /// the class.
    fn class_tables(&self, class_map: &ClassMap, primary: Option<TableId>) -> Vec<TableId> {
        let Some(primary) = primary else {
            return vec![];
        };

        let mut tables = vec![primary];
        for column in class_map.data_columns() {
            if !tables.contains(&column.table) {
                tables.push(column.table);
            }
        }
        tables
    }

    fn class_system_maps(&self, tables: &[TableId]) -> Vec<SystemPropertyMap> {
        if tables.is_empty() {
            return vec![];
        }

        let db = &self.session.db;

        vec![
            SystemPropertyMap {
                kind: SystemProperty::InstanceId,
                columns: tables
                    .iter()
                    .filter_map(|table| db.table(*table).instance_id_column())
                    .map(|column| column.id)
                    .collect(),
            },
            SystemPropertyMap {
                kind: SystemProperty::ClassId,
                columns: tables
                    .iter()
                    .filter_map(|table| db.table(*table).class_id_column())
                    .map(|column| column.id)
                    .collect(),
            },
        ]
    }
}
