//! Object lookups used to turn references into recipient addresses.
use crate::rpsl::{CIString, ObjectType, RpslObject};
use std::collections::{HashMap, HashSet};

pub trait ObjectStore: Send + Sync {
    /// Objects of `object_type` with the given primary keys. Unknown keys are
    /// skipped; each object is returned once.
    fn get_by_keys(&self, object_type: ObjectType, keys: &[CIString]) -> Vec<RpslObject>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryObjectStore {
    objects: HashMap<(ObjectType, CIString), RpslObject>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: impl IntoIterator<Item = RpslObject>) -> Self {
        let mut store = Self::new();
        for object in objects {
            store.insert(object);
        }
        store
    }

    /// Insert or replace by (type, key).
    pub fn insert(&mut self, object: RpslObject) {
        self.objects
            .insert((object.object_type(), object.key().clone()), object);
    }

    pub fn get(&self, object_type: ObjectType, key: &CIString) -> Option<&RpslObject> {
        self.objects.get(&(object_type, key.clone()))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn get_by_keys(&self, object_type: ObjectType, keys: &[CIString]) -> Vec<RpslObject> {
        let mut seen = HashSet::new();
        keys.iter()
            .filter(|k| seen.insert(*k))
            .filter_map(|k| self.get(object_type, k).cloned())
            .collect()
    }
}
