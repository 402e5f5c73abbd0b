//! Catalog id to slot membership index.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use super::SlotId;
use crate::item::CatalogId;

/// Maps each catalog id to the ascending set of live slots holding it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogIndex {
    slots: FxHashMap<CatalogId, BTreeSet<SlotId>>,
}

impl CatalogIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slots holding `catalog_id`, in ascending order.
    pub fn slots_of(&self, catalog_id: CatalogId) -> impl Iterator<Item = SlotId> + '_ {
        self.slots
            .get(&catalog_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Returns whether `slot` is recorded under `catalog_id`.
    #[must_use]
    pub fn contains(&self, catalog_id: CatalogId, slot: SlotId) -> bool {
        self.slots
            .get(&catalog_id)
            .is_some_and(|set| set.contains(&slot))
    }

    /// Returns the number of recorded slots across all catalog ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.values().map(BTreeSet::len).sum()
    }

    /// Returns whether no slot is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn insert(&mut self, catalog_id: CatalogId, slot: SlotId) {
        self.slots.entry(catalog_id).or_default().insert(slot);
    }

    pub(crate) fn remove(&mut self, catalog_id: CatalogId, slot: SlotId) {
        if let Some(set) = self.slots.get_mut(&catalog_id) {
            set.remove(&slot);
            if set.is_empty() {
                self.slots.remove(&catalog_id);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_ascending() {
        let mut index = CatalogIndex::new();
        index.insert(4, 9);
        index.insert(4, 2);
        index.insert(4, 5);
        index.insert(7, 1);

        assert_eq!(index.slots_of(4).collect::<Vec<_>>(), vec![2, 5, 9]);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_remove_keeps_other_ids() {
        let mut index = CatalogIndex::new();
        index.insert(1, 0);
        index.insert(2, 1);

        index.remove(1, 0);
        index.remove(3, 0);

        assert!(!index.contains(1, 0));
        assert!(index.contains(2, 1));
        assert_eq!(index.slots_of(1).count(), 0);
        assert!(!index.is_empty());

        index.remove(2, 1);
        assert_eq!(index, CatalogIndex::new());
    }
}
