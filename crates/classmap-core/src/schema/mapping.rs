mod class_map;
pub use class_map::{ClassMap, ClassMapKind, MapState};

mod property_map;
pub use property_map::{PropertyMap, PropertyMapKind, SystemProperty, SystemPropertyMap};

mod strategy;
pub use strategy::{JoinedTableInfo, MapStrategy, ShareColumnsMode, Strategy, TphInfo};

use super::app::ClassId;

use indexmap::IndexMap;

/// Class maps of every known class, keyed by class.
#[derive(Debug, Default, Clone)]
pub struct Mapping {
    pub classes: IndexMap<ClassId, ClassMap>,
}

impl Mapping {
    pub fn class(&self, id: ClassId) -> &ClassMap {
        self.classes.get(&id).expect("invalid class ID")
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassMap {
        self.classes.get_mut(&id).expect("invalid class ID")
    }

    pub fn get(&self, id: ClassId) -> Option<&ClassMap> {
        self.classes.get(&id)
    }

    pub fn contains(&self, id: ClassId) -> bool {
        self.classes.contains_key(&id)
    }

    /// Registers the class map of a class that has none yet.
    ///
    /// # Panics
    ///
    /// Registering a second map for the same class is a bug in the caller.
    pub fn insert(&mut self, class_map: ClassMap) {
        let class = class_map.class;
        let prev = self.classes.insert(class, class_map);
        assert!(prev.is_none(), "class map for {class:?} registered twice");
    }

    /// Replaces the map of a class that already has one.
    pub fn replace(&mut self, class_map: ClassMap) {
        let slot = self.class_mut(class_map.class);
        *slot = class_map;
    }
}
