//! Item handles placed into package slots.

use std::fmt;

/// Type identifier shared by every instance of the same item definition.
pub type CatalogId = u32;

/// An immutable handle to an item instance.
///
/// Packages never mutate a handle. Filling an empty slot installs a clone of
/// the handle passed in, so every slot owns an independent value that still
/// carries the source's `instance_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemHandle {
    instance_id: u64,
    catalog_id: CatalogId,
    max_stack: u32,
}

impl ItemHandle {
    /// Creates a new handle. A `max_stack` of zero is raised to one.
    #[must_use]
    pub fn new(instance_id: u64, catalog_id: CatalogId, max_stack: u32) -> Self {
        Self {
            instance_id,
            catalog_id,
            max_stack: max_stack.max(1),
        }
    }

    /// Returns the per-instance identity.
    #[must_use]
    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    /// Returns the catalog id.
    #[must_use]
    pub fn catalog_id(&self) -> CatalogId {
        self.catalog_id
    }

    /// Returns how many of this item fit in one slot.
    #[must_use]
    pub fn max_stack(&self) -> u32 {
        self.max_stack
    }

    /// Returns whether both handles share a catalog id.
    #[must_use]
    pub fn is_same_item(&self, other: &ItemHandle) -> bool {
        self.catalog_id == other.catalog_id
    }
}

impl fmt::Display for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.catalog_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_max_stack_is_raised() {
        let item = ItemHandle::new(7, 1, 0);
        assert_eq!(item.max_stack(), 1);
    }

    #[test]
    fn test_clone_keeps_identity() {
        let item = ItemHandle::new(100_001, 1, 99);
        let copy = item.clone();
        assert_eq!(copy.instance_id(), 100_001);
        assert_eq!(copy, item);
    }
}
