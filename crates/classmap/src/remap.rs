//! Moves existing row data when an upgrade changes the column a property
//! is stored in.
//!
//! A property added to a persisted class, or a base class added to one,
//! can take over columns that subclasses already use for properties of
//! the same name. A dedicated column freed this way may be reused by the
//! base class as is. Those property maps are removed before
//! the classes are mapped again; once mapping is done, the old and new
//! column of every removed map are compared and the data is moved.

mod migrate;
pub(crate) use migrate::migrate;

mod sort;

use crate::{catalog, session::MappingSession, Result, Storage};

use classmap_core::schema::{app::ClassId, db::ColumnId};

use std::collections::HashSet;

#[derive(Debug, Default)]
pub(crate) struct RemapInfo {
    /// Properties added to persisted classes
    pub(crate) added_properties: Vec<(ClassId, String)>,

    /// `(class, base)` pairs added to persisted classes
    pub(crate) added_bases: Vec<(ClassId, ClassId)>,

    /// Removed property map leaves and the column each one used
    cleaned: Vec<Cleaned>,
}

#[derive(Debug, Clone, PartialEq)]
struct Cleaned {
    class: ClassId,
    access: String,
    column: ColumnId,
}

/// Data of `class` moves from one column to another.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Move {
    pub(crate) class: ClassId,
    pub(crate) access: String,
    pub(crate) from: ColumnId,
    pub(crate) to: ColumnId,
}

impl RemapInfo {
    /// Removes the persisted property maps that the added properties and
    /// base classes invalidate.
    pub(crate) fn clean(&mut self, storage: &mut dyn Storage, session: &mut MappingSession) -> Result<()> {
        let mut targets: Vec<(ClassId, String)> = vec![];

        for (class, name) in &self.added_properties {
            for affected in session.app.descendants(*class) {
                targets.push((affected, name.clone()));
            }
        }

        for (class, base) in &self.added_bases {
            let mut hierarchy = vec![*class];
            hierarchy.extend(session.app.descendants(*class));

            // Properties the new base brings in override or collide with
            // same-named ones mapped further down.
            for inherited in session.app.properties(*base) {
                for affected in &hierarchy {
                    targets.push((*affected, inherited.property.name.clone()));
                }
            }

            // Shared columns the base already claims.
            let mut claimed: HashSet<ColumnId> = HashSet::new();
            for ancestor in std::iter::once(*base).chain(session.app.ancestors(*base)) {
                if let Some(class_map) = session.mapping.get(ancestor) {
                    claimed.extend(class_map.data_columns());
                }
            }

            for affected in &hierarchy {
                let Some(class_map) = session.mapping.get(*affected) else {
                    continue;
                };

                for map in &class_map.properties {
                    if map.columns().iter().any(|column| claimed.contains(column)) {
                        targets.push((*affected, map.access.clone()));
                    }
                }
            }
        }

        for (class, name) in targets {
            self.clean_property(storage, session, class, &name)?;
        }

        Ok(())
    }

    fn clean_property(
        &mut self,
        storage: &mut dyn Storage,
        session: &mut MappingSession,
        class: ClassId,
        name: &str,
    ) -> Result<()> {
        let mapping = &mut session.mapping;

        if !mapping.contains(class) {
            return Ok(());
        }

        let class_map = mapping.class_mut(class);
        let Some(pos) = class_map.properties.iter().position(|map| map.access == name) else {
            return Ok(());
        };

        let map = &class_map.properties[pos];
        for leaf in map.leaves() {
            if let Some(column) = leaf.column() {
                self.cleaned.push(Cleaned {
                    class,
                    access: leaf.access.clone(),
                    column,
                });
            }
        }

        let deleted = catalog::delete_property_maps(storage, class, name)?;
        log::debug!("cleaned property map; class={class:?} property={name} rows={deleted}");

        class_map.properties.remove(pos);
        class_map.touch();
        Ok(())
    }

    /// Compares every cleaned map with the map the class has now.
    pub(crate) fn moves(&self, session: &MappingSession) -> Vec<Move> {
        let mut moves = vec![];

        for cleaned in &self.cleaned {
            let Some(class_map) = session.mapping.get(cleaned.class) else {
                continue;
            };

            let Some(column) = class_map.find(&cleaned.access).and_then(|map| map.column()) else {
                log::warn!(
                    "property is no longer mapped, its data is not moved; class={} property={}",
                    session.app.qualified_name(cleaned.class),
                    cleaned.access
                );
                continue;
            };

            if column != cleaned.column {
                moves.push(Move {
                    class: cleaned.class,
                    access: cleaned.access.clone(),
                    from: cleaned.column,
                    to: column,
                });
            }
        }

        moves
    }
}
