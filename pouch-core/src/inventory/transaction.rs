//! Scoped single-writer mutation with commit and rollback.

use std::mem;

use rustc_hash::FxHashMap;
use uuid::Uuid;

use super::package::Snapshot;
use super::{Operation, OperationKind, OperationListener, Package, Slot, SlotId};
use crate::error::PackageError;
use crate::item::{CatalogId, ItemHandle};

/// Where the most recent commit or rollback left a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Freshly opened, or mutated since the last commit or rollback.
    Open,
    /// The last action was a commit.
    Committed,
    /// The last action was a rollback.
    RolledBack,
}

/// Target options for [`Transaction::put_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Slot to start searching from. `None` searches the whole package.
    pub slot: Option<SlotId>,
    /// Whether the item may be stacked onto matching, non-full slots.
    pub allow_merge: bool,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            slot: None,
            allow_merge: true,
        }
    }
}

impl Placement {
    /// Starts the search at `slot`, merging allowed.
    #[must_use]
    pub fn at(slot: SlotId) -> Self {
        Self {
            slot: Some(slot),
            allow_merge: true,
        }
    }

    /// Only fills empty slots.
    #[must_use]
    pub fn unmerged() -> Self {
        Self {
            slot: None,
            allow_merge: false,
        }
    }

    /// Sets whether merging onto existing stacks is allowed.
    #[must_use]
    pub fn with_merge(mut self, allow_merge: bool) -> Self {
        self.allow_merge = allow_merge;
        self
    }
}

/// Exclusive mutation context over one [`Package`].
///
/// Opening a transaction sets the package's single-writer mark and snapshots
/// its index metadata. Each slot is copied into the undo journal the first
/// time it is touched, so [`rollback`](Self::rollback) can restore the
/// package exactly, while [`commit`](Self::commit) keeps the in-place changes
/// and takes a new baseline.
///
/// Dropping the transaction releases it: uncommitted changes are rolled back
/// and the mark is cleared.
#[derive(Debug)]
pub struct Transaction<'a> {
    id: Uuid,
    package: &'a mut Package,
    state: TransactionState,
    dirty: bool,
    operations: Vec<Operation>,
    backup: FxHashMap<SlotId, Slot>,
    baseline: Snapshot,
}

impl<'a> Transaction<'a> {
    /// Opens a transaction, failing if the package is already held.
    pub fn open(package: &'a mut Package) -> Result<Self, PackageError> {
        package.lock()?;

        let id = Uuid::new_v4();
        let baseline = package.snapshot();
        log::debug!(
            "Opened transaction {id} on {} package of {}",
            package.kind(),
            package.owner()
        );

        Ok(Self {
            id,
            package,
            state: TransactionState::Open,
            dirty: false,
            operations: Vec::new(),
            backup: FxHashMap::default(),
            baseline,
        })
    }

    /// Returns the transaction id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Returns whether there are changes that are neither committed nor rolled back.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns read access to the package being mutated.
    #[must_use]
    pub fn package(&self) -> &Package {
        self.package
    }

    /// Places up to `count` of `item` anywhere, merging onto existing stacks.
    ///
    /// Returns how many were placed. Less than `count` means the package ran
    /// out of room.
    pub fn put(&mut self, item: &ItemHandle, count: u32) -> u32 {
        self.place(item, count, 0, true)
    }

    /// Places up to `count` of `item` according to `placement`.
    ///
    /// Without a slot and without merging, the search starts at an empty slot
    /// and nothing is placed if there is none.
    pub fn put_with(
        &mut self,
        item: &ItemHandle,
        count: u32,
        placement: Placement,
    ) -> Result<u32, PackageError> {
        if let Some(slot) = placement.slot {
            self.check_slot(slot)?;
        }
        if count == 0 {
            return Ok(0);
        }

        let start = match placement.slot {
            Some(slot) => slot,
            None if !placement.allow_merge => match self.package.find_empty_slot() {
                Some(slot) => slot,
                None => return Ok(0),
            },
            None => 0,
        };
        Ok(self.place(item, count, start, placement.allow_merge))
    }

    /// Removes up to `count` of `catalog_id`, walking its slots in ascending order.
    ///
    /// Stops early, returning what was removed so far, if the index refers to
    /// a slot outside the live range.
    pub fn remove(&mut self, catalog_id: CatalogId, count: u32) -> u32 {
        if count == 0 {
            return 0;
        }

        // The index is modified while draining, walk a copy.
        let slots: Vec<SlotId> = self.package.catalog_slots(catalog_id).collect();

        let mut remaining = count;
        let mut removed = 0;
        for slot in slots {
            if self.package.get_slot(slot).is_none() {
                log::warn!(
                    "Catalog index of {} package lists missing slot {slot} for item {catalog_id}",
                    self.package.kind()
                );
                return removed;
            }

            let taken = self.remove_in_slot(catalog_id, remaining, slot);
            remaining -= taken;
            removed += taken;
            if remaining == 0 {
                break;
            }
        }
        removed
    }

    /// Removes up to `count` of `catalog_id` from `slot` only.
    pub fn remove_from(
        &mut self,
        catalog_id: CatalogId,
        count: u32,
        slot: SlotId,
    ) -> Result<u32, PackageError> {
        self.check_slot(slot)?;
        if count == 0 {
            return Ok(0);
        }
        Ok(self.remove_in_slot(catalog_id, count, slot))
    }

    /// Swaps the contents of two slots.
    ///
    /// When both hold the same item and `a` has room, `b` is merged into `a`
    /// instead. Returns `false` for identical or out-of-range slots.
    pub fn swap(&mut self, a: SlotId, b: SlotId) -> bool {
        self.swap_slots(a, b, true)
    }

    /// Unlocks `increment` more slots.
    ///
    /// Fails when the package is at its maximum or when the new capacity would
    /// reach it. An increment of zero changes nothing.
    pub fn grow(&mut self, increment: u32) -> bool {
        let current = self.package.capacity_cur();
        let max = self.package.capacity_max();
        let Some(target) = current.checked_add(increment) else {
            return false;
        };
        if current == max || target >= max {
            return false;
        }
        if increment == 0 {
            return true;
        }

        self.package.set_capacity_cur(target);
        self.package.add_empty(increment);
        self.package.set_hint(target - 1);
        self.touch();
        true
    }

    /// Merges partial stacks and sorts the live slots.
    ///
    /// Must be the only pending change of the transaction. Partial stacks are
    /// merged forward into the earliest one, then the slots are stably sorted
    /// by catalog id and quantity with empty slots last, and the indices are
    /// rebuilt. No operations are recorded.
    pub fn compact(&mut self) -> Result<(), PackageError> {
        if self.dirty {
            return Err(PackageError::PendingOperations);
        }

        let capacity = self.package.capacity_cur();
        for slot in 0..capacity {
            self.backup_slot(slot);
        }
        self.touch();

        for slot in 0..capacity {
            let Some(catalog_id) = self
                .package
                .get_slot(slot)
                .filter(|current| !current.is_full())
                .and_then(Slot::catalog_id)
            else {
                continue;
            };

            for next in slot + 1..capacity {
                let Some(candidate) = self.package.get_slot(next) else {
                    break;
                };
                if candidate.is_full() || !candidate.matches(catalog_id) {
                    continue;
                }
                self.swap_slots(slot, next, false);
                if self.package.get_slot(slot).is_some_and(Slot::is_full) {
                    break;
                }
            }
        }

        self.package
            .live_slots_mut()
            .sort_by_key(|slot| (slot.is_empty(), slot.catalog_id(), slot.count()));
        self.package.rebuild_index();

        log::debug!(
            "Compacted {} package of {} in transaction {}",
            self.package.kind(),
            self.package.owner(),
            self.id
        );
        Ok(())
    }

    /// Keeps the changes made so far and takes a new rollback baseline.
    pub fn commit(&mut self) -> &mut Self {
        self.backup.clear();
        self.baseline = self.package.snapshot();
        self.dirty = false;
        self.state = TransactionState::Committed;
        log::debug!("Committed transaction {}", self.id);
        self
    }

    /// Restores every touched slot and the index metadata to the baseline.
    ///
    /// Calling it again without new changes does nothing.
    pub fn rollback(&mut self) -> &mut Self {
        for (slot, pre_image) in self.backup.drain() {
            self.package.overwrite_slot(slot, pre_image);
        }
        self.package.restore(&self.baseline);
        self.operations.clear();

        if self.dirty {
            log::debug!("Rolled back transaction {}", self.id);
        }
        self.dirty = false;
        self.state = TransactionState::RolledBack;
        self
    }

    /// Drains the operation log.
    pub fn take_operations(&mut self) -> Vec<Operation> {
        mem::take(&mut self.operations)
    }

    /// Drains the operation log into `listener`.
    pub fn notify(&mut self, listener: &mut impl OperationListener) {
        let operations = self.take_operations();
        if operations.is_empty() {
            return;
        }
        log::trace!(
            "Transaction {} notifying {} operations",
            self.id,
            operations.len()
        );
        listener.on_operations(self.package.owner(), self.package.kind(), operations);
    }

    /// Rolls back uncommitted changes and frees the package.
    pub fn release(self) {
        drop(self);
    }

    fn place(&mut self, item: &ItemHandle, count: u32, start: SlotId, allow_merge: bool) -> u32 {
        let mut remaining = count;
        let mut placed = 0;
        let mut cursor = start;

        while remaining > 0 {
            let Some(slot) = self.package.find_slot(item, cursor, allow_merge) else {
                break;
            };
            self.backup_slot(slot);

            let was_empty = self.package.get_slot(slot).is_some_and(Slot::is_empty);
            let filled = match self.package.slot_mut(slot) {
                Some(target) if was_empty => target.replace(item.clone(), remaining),
                Some(target) => target.add(remaining),
                None => 0,
            };
            if filled == 0 {
                break;
            }

            if was_empty {
                self.package.sub_empty();
                self.package.reset_hint(slot);
                self.package.index_insert(item.catalog_id(), slot);
            }

            self.touch();
            self.record(slot, OperationKind::Add, filled, item.clone());
            remaining -= filled;
            placed += filled;
            cursor = slot + 1;
        }
        placed
    }

    fn remove_in_slot(&mut self, catalog_id: CatalogId, count: u32, slot: SlotId) -> u32 {
        let Some(item) = self
            .package
            .get_slot(slot)
            .filter(|current| current.matches(catalog_id))
            .and_then(Slot::item)
            .cloned()
        else {
            return 0;
        };

        self.backup_slot(slot);
        let Some(target) = self.package.slot_mut(slot) else {
            return 0;
        };
        let removed = target.sub(count);
        let drained = target.is_empty();
        if removed == 0 {
            return 0;
        }

        if drained {
            self.package.add_empty(1);
            self.package.set_hint(slot);
            self.package.index_remove(catalog_id, slot);
        }
        self.touch();
        self.record(slot, OperationKind::Sub, removed, item);
        removed
    }

    fn swap_slots(&mut self, a: SlotId, b: SlotId, journaled: bool) -> bool {
        let capacity = self.package.capacity_cur();
        if a == b || a >= capacity || b >= capacity {
            return false;
        }
        let (Some(first), Some(second)) = (self.package.get_slot(a), self.package.get_slot(b))
        else {
            return false;
        };
        if first.is_empty() && second.is_empty() {
            return true;
        }
        let mergeable = !first.is_empty()
            && !second.is_empty()
            && second.item().is_some_and(|item| first.can_accept(item, true));

        if journaled {
            self.backup_slot(a);
            self.backup_slot(b);
            self.touch();
        }

        if mergeable {
            self.merge_slots(a, b, journaled)
        } else {
            self.exchange_slots(a, b, journaled)
        }
    }

    fn merge_slots(&mut self, into: SlotId, from: SlotId, journaled: bool) -> bool {
        let Some((item, available)) = self
            .package
            .get_slot(from)
            .and_then(|source| source.item().cloned().map(|item| (item, source.count())))
        else {
            return false;
        };

        let moved = self
            .package
            .slot_mut(into)
            .map_or(0, |target| target.add(available));
        let Some(source) = self.package.slot_mut(from) else {
            return false;
        };
        source.sub(moved);
        let drained = source.is_empty();

        if journaled {
            if drained {
                self.package.add_empty(1);
                self.package.set_hint(from);
                self.package.index_remove(item.catalog_id(), from);
            }
            self.record(into, OperationKind::Add, moved, item.clone());
            self.record(from, OperationKind::Sub, moved, item);
        }
        true
    }

    fn exchange_slots(&mut self, a: SlotId, b: SlotId, journaled: bool) -> bool {
        let before = [
            (a, self.package.get_slot(a).cloned().unwrap_or_default()),
            (b, self.package.get_slot(b).cloned().unwrap_or_default()),
        ];

        if journaled {
            for (slot, contents) in &before {
                if let Some(catalog_id) = contents.catalog_id() {
                    self.package.index_remove(catalog_id, *slot);
                }
            }
        }

        if !self.package.swap_raw(a, b) {
            if journaled {
                for (slot, contents) in &before {
                    if let Some(catalog_id) = contents.catalog_id() {
                        self.package.index_insert(catalog_id, *slot);
                    }
                }
            }
            return false;
        }

        if journaled {
            for (slot, old) in before {
                let new = self.package.get_slot(slot).cloned().unwrap_or_default();
                match new.catalog_id() {
                    Some(catalog_id) => self.package.index_insert(catalog_id, slot),
                    None => self.package.set_hint(slot),
                }

                if let Some(item) = old.item().filter(|_| !old.is_empty()) {
                    self.operations.push(Operation {
                        slot,
                        kind: OperationKind::Sub,
                        amount: old.count(),
                        item: item.clone(),
                        count_after: 0,
                    });
                }
                if let Some(item) = new.item().filter(|_| !new.is_empty()) {
                    self.operations.push(Operation {
                        slot,
                        kind: OperationKind::Add,
                        amount: new.count(),
                        item: item.clone(),
                        count_after: new.count(),
                    });
                }
            }
        }
        true
    }

    /// Copies the slot into the journal unless it was already saved.
    fn backup_slot(&mut self, slot: SlotId) {
        let Some(current) = self.package.get_slot(slot) else {
            return;
        };
        if !self.backup.contains_key(&slot) {
            self.backup.insert(slot, current.clone());
        }
    }

    /// Logs a change to `slot` with the handle the slot now holds.
    ///
    /// `previous` is the handle the slot held before the change, used when the
    /// change left the slot empty.
    fn record(&mut self, slot: SlotId, kind: OperationKind, amount: u32, previous: ItemHandle) {
        if amount == 0 {
            return;
        }
        let (item, count_after) = match self.package.get_slot(slot) {
            Some(current) if !current.is_empty() => (
                current.item().cloned().unwrap_or(previous),
                current.count(),
            ),
            _ => (previous, 0),
        };
        self.operations.push(Operation {
            slot,
            kind,
            amount,
            item,
            count_after,
        });
    }

    fn check_slot(&self, slot: SlotId) -> Result<(), PackageError> {
        let capacity = self.package.capacity_cur();
        if slot >= capacity {
            return Err(PackageError::SlotOutOfRange { slot, capacity });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.state = TransactionState::Open;
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.dirty {
            log::debug!(
                "Transaction {} released with uncommitted changes, rolling back",
                self.id
            );
        }
        self.rollback();
        self.package.unlock();
        log::debug!("Released transaction {}", self.id);
    }
}
