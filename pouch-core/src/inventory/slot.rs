//! A single package cell.

use std::fmt;

use crate::item::{CatalogId, ItemHandle};

/// Index of a slot within a package.
pub type SlotId = u32;

/// One cell of a package: an optional item handle plus a quantity.
///
/// A quantity of zero is the only definition of "empty", even if a handle is
/// still present. All arithmetic saturates at the stack limit and at zero;
/// callers use the returned amounts to know how much is left to move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    item: Option<ItemHandle>,
    count: u32,
}

impl Slot {
    /// Creates an empty slot.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            item: None,
            count: 0,
        }
    }

    /// Returns the item handle, if one is installed.
    #[must_use]
    pub fn item(&self) -> Option<&ItemHandle> {
        self.item.as_ref()
    }

    /// Returns the quantity held.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns the catalog id of a non-empty slot.
    #[must_use]
    pub fn catalog_id(&self) -> Option<CatalogId> {
        if self.is_empty() {
            return None;
        }
        self.item.as_ref().map(ItemHandle::catalog_id)
    }

    /// Returns whether a handle is installed, regardless of quantity.
    #[must_use]
    pub fn has_item(&self) -> bool {
        self.item.is_some()
    }

    /// Returns whether the slot holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns whether the stack has reached its item's limit.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.item
            .as_ref()
            .is_some_and(|item| item.max_stack() == self.count)
    }

    /// Returns whether this non-empty slot holds the given catalog id.
    #[must_use]
    pub fn matches(&self, catalog_id: CatalogId) -> bool {
        self.catalog_id() == Some(catalog_id)
    }

    /// Returns whether this non-empty slot holds the same item as `item`.
    #[must_use]
    pub fn matches_item(&self, item: &ItemHandle) -> bool {
        self.matches(item.catalog_id())
    }

    /// Returns whether `item` can be placed here.
    ///
    /// Empty slots accept anything. Occupied slots accept only when merging is
    /// allowed, the item matches and the stack is not full.
    #[must_use]
    pub fn can_accept(&self, item: &ItemHandle, allow_merge: bool) -> bool {
        if self.is_empty() {
            return true;
        }
        allow_merge && self.matches_item(item) && !self.is_full()
    }

    /// Adds up to `count` to the stack and returns how many were added.
    pub fn add(&mut self, count: u32) -> u32 {
        let Some(item) = &self.item else {
            return 0;
        };
        let room = item.max_stack().saturating_sub(self.count);
        let added = room.min(count);
        self.count += added;
        added
    }

    /// Removes up to `count` from the stack and returns how many were removed.
    ///
    /// The slot is reset to empty once its quantity reaches zero.
    pub fn sub(&mut self, count: u32) -> u32 {
        if self.count > count {
            self.count -= count;
            return count;
        }
        let removed = self.count;
        self.clear();
        removed
    }

    /// Installs `item` and adds up to `count` of it.
    pub fn replace(&mut self, item: ItemHandle, count: u32) -> u32 {
        self.item = Some(item);
        self.add(count)
    }

    /// Resets the slot to empty.
    pub fn clear(&mut self) {
        self.item = None;
        self.count = 0;
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.item {
            Some(item) => write!(f, "{item}:{}", self.count),
            None => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stone() -> ItemHandle {
        ItemHandle::new(1, 1, 99)
    }

    #[test]
    fn test_empty_slot_accepts_anything() {
        let slot = Slot::empty();
        assert!(slot.is_empty());
        assert!(!slot.is_full());
        assert!(slot.can_accept(&stone(), false));
        assert!(slot.can_accept(&ItemHandle::new(2, 2, 1), true));
    }

    #[test]
    fn test_add_caps_at_max_stack() {
        let mut slot = Slot::empty();
        assert_eq!(slot.replace(stone(), 250), 99);
        assert!(slot.is_full());
        assert_eq!(slot.add(1), 0);
    }

    #[test]
    fn test_add_without_item_adds_nothing() {
        let mut slot = Slot::empty();
        assert_eq!(slot.add(5), 0);
        assert!(slot.is_empty());
    }

    #[test]
    fn test_sub_resets_when_drained() {
        let mut slot = Slot::empty();
        slot.replace(stone(), 30);

        assert_eq!(slot.sub(10), 10);
        assert_eq!(slot.count(), 20);

        assert_eq!(slot.sub(50), 20);
        assert!(slot.is_empty());
        assert!(!slot.has_item());
    }

    #[test]
    fn test_merge_rules() {
        let mut slot = Slot::empty();
        slot.replace(stone(), 40);

        assert!(slot.can_accept(&stone(), true));
        assert!(!slot.can_accept(&stone(), false));
        assert!(!slot.can_accept(&ItemHandle::new(3, 3, 99), true));

        slot.add(59);
        assert!(!slot.can_accept(&stone(), true));
    }

    #[test]
    fn test_zero_count_handle_is_empty() {
        let mut slot = Slot::empty();
        slot.replace(stone(), 0);

        assert!(slot.has_item());
        assert!(slot.is_empty());
        assert!(!slot.matches(1));
        assert_eq!(slot.catalog_id(), None);
    }

    #[test]
    fn test_display() {
        let mut slot = Slot::empty();
        assert_eq!(slot.to_string(), "null");
        slot.replace(stone(), 12);
        assert_eq!(slot.to_string(), "1:12");
    }
}
