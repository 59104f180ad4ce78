//! # Entity Synchronization
//!
//! Mirrors staged ledger records into UI-owned entities.
//!
//! Every sync is a full resync: all tracked entities are removed, then one
//! entity is created per staged record, in order. If the store refuses a
//! creation at index `i`, the visible collection stops at `i` records.

use std::collections::HashMap;
use std::marker::PhantomData;

use thiserror::Error;

/// Opaque reference to an entity in an [`EntityStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Entity store is full ({capacity} entities)")]
    Full { capacity: usize },
}

/// Storage backing the entities the UI renders.
pub trait EntityStore<V> {
    fn create_entity(&mut self, value: V) -> Result<EntityRef, StoreError>;
    fn read_entity(&self, entity: EntityRef) -> Option<&V>;
    /// Returns whether the entity existed.
    fn remove(&mut self, entity: EntityRef) -> bool;
}

#[derive(Debug)]
pub struct MemoryEntityStore<V> {
    entities: HashMap<EntityRef, V>,
    next_id: u64,
    capacity: Option<usize>,
}

impl<V> MemoryEntityStore<V> {
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            next_id: 1,
            capacity: None,
        }
    }

    /// A store that refuses creations beyond `capacity` live entities.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<V> Default for MemoryEntityStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> EntityStore<V> for MemoryEntityStore<V> {
    fn create_entity(&mut self, value: V) -> Result<EntityRef, StoreError> {
        if let Some(capacity) = self.capacity {
            if self.entities.len() >= capacity {
                return Err(StoreError::Full { capacity });
            }
        }
        let entity = EntityRef(self.next_id);
        self.next_id += 1;
        self.entities.insert(entity, value);
        Ok(entity)
    }

    fn read_entity(&self, entity: EntityRef) -> Option<&V> {
        self.entities.get(&entity)
    }

    fn remove(&mut self, entity: EntityRef) -> bool {
        self.entities.remove(&entity).is_some()
    }
}

/// Outcome of one [`EntityCollection::sync`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub removed: usize,
    pub created: usize,
    /// Index of the first record the store refused.
    pub truncated_at: Option<usize>,
}

/// The ordered entities the UI shows for one record type.
#[derive(Debug)]
pub struct EntityCollection<V, S = MemoryEntityStore<V>> {
    store: S,
    tracked: Vec<EntityRef>,
    _values: PhantomData<V>,
}

impl<V: Clone> EntityCollection<V> {
    pub fn in_memory() -> Self {
        Self::new(MemoryEntityStore::new())
    }
}

impl<V: Clone, S: EntityStore<V>> EntityCollection<V, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            tracked: Vec::new(),
            _values: PhantomData,
        }
    }

    /// Replace every tracked entity with one per record in `staged`.
    pub fn sync(&mut self, staged: &[V]) -> SyncReport {
        let removed = self.clear();
        let mut report = SyncReport {
            removed,
            ..SyncReport::default()
        };

        for (index, value) in staged.iter().enumerate() {
            match self.store.create_entity(value.clone()) {
                Ok(entity) => {
                    self.tracked.push(entity);
                    report.created += 1;
                }
                Err(err) => {
                    tracing::warn!(index, staged = staged.len(), error = %err, "Entity sync truncated");
                    report.truncated_at = Some(index);
                    break;
                }
            }
        }
        report
    }

    /// Replace, in place, each tracked entity that `same` matches against a
    /// record in `fresh`. Untracked records are ignored.
    pub fn refresh<F>(&mut self, fresh: &[V], same: F) -> usize
    where
        F: Fn(&V, &V) -> bool,
    {
        let mut refreshed = 0;
        for position in 0..self.tracked.len() {
            let entity = self.tracked[position];
            let Some(replacement) = self
                .store
                .read_entity(entity)
                .and_then(|current| fresh.iter().find(|candidate| same(current, candidate)))
                .cloned()
            else {
                continue;
            };
            self.store.remove(entity);
            match self.store.create_entity(replacement) {
                Ok(new_entity) => {
                    self.tracked[position] = new_entity;
                    refreshed += 1;
                }
                Err(err) => {
                    tracing::warn!(position, error = %err, "Entity refresh truncated");
                    self.truncate(position);
                    break;
                }
            }
        }
        refreshed
    }

    /// Remove every tracked entity, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.tracked.len();
        for entity in self.tracked.drain(..) {
            self.store.remove(entity);
        }
        removed
    }

    fn truncate(&mut self, len: usize) {
        for entity in self.tracked.drain(len..) {
            self.store.remove(entity);
        }
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&V> {
        self.tracked
            .get(index)
            .and_then(|entity| self.store.read_entity(*entity))
    }

    /// Tracked values in display order.
    pub fn iter(&self) -> impl Iterator<Item = &V> + '_ {
        self.tracked
            .iter()
            .filter_map(|entity| self.store.read_entity(*entity))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<V: Clone> Default for EntityCollection<V> {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_replaces_previous_entities() {
        let mut collection = EntityCollection::<u32>::in_memory();
        let first = collection.sync(&[1, 2, 3]);
        assert_eq!(first, SyncReport { removed: 0, created: 3, truncated_at: None });

        let second = collection.sync(&[9]);
        assert_eq!(second.removed, 3);
        assert_eq!(collection.iter().copied().collect::<Vec<_>>(), vec![9]);
        assert_eq!(collection.store().len(), 1);
    }

    #[test]
    fn test_sync_empty_clears() {
        let mut collection = EntityCollection::<u32>::in_memory();
        collection.sync(&[1, 2]);
        let report = collection.sync(&[]);
        assert_eq!(report.removed, 2);
        assert!(collection.is_empty());
        assert!(collection.store().is_empty());
    }

    #[test]
    fn test_store_failure_truncates() {
        let mut collection = EntityCollection::new(MemoryEntityStore::with_capacity_limit(2));
        let report = collection.sync(&[10u32, 20, 30, 40]);
        assert_eq!(report.created, 2);
        assert_eq!(report.truncated_at, Some(2));
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(1), Some(&20));
        assert_eq!(collection.get(2), None);
    }

    #[test]
    fn test_refresh_matches_in_place() {
        let mut collection = EntityCollection::<(u32, &str)>::in_memory();
        collection.sync(&[(1, "a"), (2, "b"), (3, "c")]);
        let refreshed = collection.refresh(&[(2, "B"), (7, "x")], |current, fresh| current.0 == fresh.0);
        assert_eq!(refreshed, 1);
        assert_eq!(
            collection.iter().map(|(_, label)| *label).collect::<Vec<_>>(),
            vec!["a", "B", "c"]
        );
    }
}
