//! The slot container and its derived indices.

use std::fmt;
use std::ops::ControlFlow;

use super::{CatalogIndex, Slot, SlotId, Transaction};
use crate::config::PouchConfig;
use crate::error::PackageError;
use crate::item::{CatalogId, ItemHandle};
use crate::owner::OwnerId;

/// The largest capacity a package may be created with.
pub const MAX_CAPACITY: u32 = 0xFFFF;

/// How many slots the hint refresh probes before giving up.
const HINT_PROBE_LIMIT: u32 = 10;

/// What a package is used for. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    /// The owner's main bag.
    Normal,
    /// Long-term storage.
    Store,
    /// Worn equipment.
    Equip,
    /// Pet companions.
    Pet,
}

impl PackageKind {
    /// Every kind, in declaration order.
    pub const ALL: [PackageKind; 4] = [Self::Normal, Self::Store, Self::Equip, Self::Pet];

    /// Returns the lower-case name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Store => "store",
            Self::Equip => "equip",
            Self::Pet => "pet",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metadata captured by a transaction so it can be restored on rollback.
#[derive(Debug, Clone)]
pub(super) struct Snapshot {
    catalog_index: CatalogIndex,
    capacity_cur: u32,
    empty_count: u32,
    empty_hint: Option<SlotId>,
}

/// A fixed-capacity sequence of slots plus derived lookup indices.
///
/// Only slots in `0..capacity_cur` are live. The rest exist from creation
/// but are never iterated or indexed until [`Transaction::grow`] unlocks them.
///
/// # Invariants
///
/// While no transaction is mid-call:
/// - `empty_count` equals the number of live slots with quantity zero
/// - the catalog index holds exactly the live non-empty slots
/// - `capacity_cur <= capacity_max`
///
/// The empty-slot hint is only a guess and every reader re-validates it.
#[derive(Debug)]
pub struct Package {
    owner: OwnerId,
    kind: PackageKind,
    capacity_max: u32,
    capacity_cur: u32,
    slots: Vec<Slot>,
    empty_count: u32,
    empty_hint: Option<SlotId>,
    catalog_index: CatalogIndex,
    /// Set while a transaction holds the package.
    operator_mark: bool,
}

impl Package {
    /// Creates a package with `capacity_cur` live slots out of `capacity_max`.
    pub fn new(
        owner: OwnerId,
        kind: PackageKind,
        capacity_max: u32,
        capacity_cur: u32,
    ) -> Result<Self, PackageError> {
        if capacity_max > MAX_CAPACITY || capacity_cur > capacity_max {
            return Err(PackageError::InvalidCapacity {
                current: capacity_cur,
                max: capacity_max,
            });
        }

        let mut package = Self {
            owner,
            kind,
            capacity_max,
            capacity_cur,
            slots: vec![Slot::empty(); capacity_max as usize],
            empty_count: 0,
            empty_hint: None,
            catalog_index: CatalogIndex::new(),
            operator_mark: false,
        };
        package.rebuild_index();
        Ok(package)
    }

    /// Creates a package sized by the configured capacities for `kind`.
    pub fn from_config(
        owner: OwnerId,
        kind: PackageKind,
        config: &PouchConfig,
    ) -> Result<Self, PackageError> {
        let capacity = config.capacity(kind);
        Self::new(owner, kind, capacity.max, capacity.initial)
    }

    /// Returns the owner this package belongs to.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Returns the package kind.
    #[must_use]
    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    /// Returns the number of live slots.
    #[must_use]
    pub fn capacity_cur(&self) -> u32 {
        self.capacity_cur
    }

    /// Returns the capacity fixed at creation.
    #[must_use]
    pub fn capacity_max(&self) -> u32 {
        self.capacity_max
    }

    /// Returns the number of live empty slots.
    #[must_use]
    pub fn empty_count(&self) -> u32 {
        self.empty_count
    }

    /// Returns the cached guess at an empty slot. Not guaranteed to be empty.
    #[must_use]
    pub fn empty_hint(&self) -> Option<SlotId> {
        self.empty_hint
    }

    /// Returns the catalog index.
    #[must_use]
    pub fn catalog_index(&self) -> &CatalogIndex {
        &self.catalog_index
    }

    /// Returns whether a transaction currently holds this package.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.operator_mark
    }

    /// Returns the live slot at `slot`.
    #[must_use]
    pub fn get_slot(&self, slot: SlotId) -> Option<&Slot> {
        if slot >= self.capacity_cur {
            return None;
        }
        self.slots.get(slot as usize)
    }

    /// Iterates over every live slot.
    pub fn slots(&self) -> impl Iterator<Item = (SlotId, &Slot)> + '_ {
        self.iter_from(0)
    }

    /// Iterates over the live slots in `start..capacity_cur`.
    pub fn iter_from(&self, start: SlotId) -> impl Iterator<Item = (SlotId, &Slot)> + '_ {
        let start = start.min(self.capacity_cur);
        self.slots[start as usize..self.capacity_cur as usize]
            .iter()
            .zip(start..)
            .map(|(slot, id)| (id, slot))
    }

    /// Visits the live slots from `from` onwards until the visitor breaks.
    pub fn for_each_slot<B>(
        &self,
        from: SlotId,
        mut visitor: impl FnMut(SlotId, &Slot) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        for (id, slot) in self.iter_from(from) {
            if let ControlFlow::Break(value) = visitor(id, slot) {
                return ControlFlow::Break(value);
            }
        }
        ControlFlow::Continue(())
    }

    /// Returns the slots holding `catalog_id`, in ascending order.
    pub fn catalog_slots(&self, catalog_id: CatalogId) -> impl Iterator<Item = SlotId> + '_ {
        self.catalog_index.slots_of(catalog_id)
    }

    /// Returns the total quantity of `catalog_id` held by the package.
    ///
    /// Widened to `u64` since a few full stacks can exceed `u32::MAX`.
    #[must_use]
    pub fn count_of(&self, catalog_id: CatalogId) -> u64 {
        self.catalog_slots(catalog_id)
            .filter_map(|slot| self.get_slot(slot))
            .map(|slot| u64::from(slot.count()))
            .sum()
    }

    /// Returns an empty live slot, trying the hint before scanning.
    #[must_use]
    pub fn find_empty_slot(&self) -> Option<SlotId> {
        if let Some(hint) = self.empty_hint
            && self.get_slot(hint).is_some_and(Slot::is_empty)
        {
            return Some(hint);
        }
        self.slots().find(|(_, slot)| slot.is_empty()).map(|(id, _)| id)
    }

    /// Finds the first slot at or after `start` that can accept `item`.
    ///
    /// The hint is returned directly when it lies in range and accepts the
    /// item, even if an earlier slot would also do.
    #[must_use]
    pub fn find_slot(&self, item: &ItemHandle, start: SlotId, allow_merge: bool) -> Option<SlotId> {
        if let Some(hint) = self.empty_hint
            && start <= hint
            && self
                .get_slot(hint)
                .is_some_and(|slot| slot.can_accept(item, allow_merge))
        {
            return Some(hint);
        }
        self.iter_from(start)
            .find(|(_, slot)| slot.can_accept(item, allow_merge))
            .map(|(id, _)| id)
    }

    /// Finds the first indexed stack of `item` that still has room.
    #[must_use]
    pub fn find_slot_existing(&self, item: &ItemHandle, allow_merge: bool) -> Option<SlotId> {
        self.catalog_slots(item.catalog_id()).find(|&slot| {
            self.get_slot(slot)
                .is_some_and(|slot| slot.can_accept(item, allow_merge))
        })
    }

    /// Recomputes the empty count, hint and catalog index from the live slots.
    pub fn rebuild_index(&mut self) {
        self.catalog_index.clear();
        self.empty_count = 0;
        self.empty_hint = None;

        for (slot, id) in self.slots[..self.capacity_cur as usize].iter().zip(0..) {
            match slot.catalog_id() {
                Some(catalog_id) => self.catalog_index.insert(catalog_id, id),
                None => {
                    self.empty_count += 1;
                    if self.empty_hint.is_none() {
                        self.empty_hint = Some(id);
                    }
                }
            }
        }
    }

    /// Opens a transaction over this package.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, PackageError> {
        Transaction::open(self)
    }

    /// Merges partial stacks and sorts the live slots in a dedicated transaction.
    pub fn compact(&mut self) -> Result<(), PackageError> {
        let mut transaction = self.transaction()?;
        transaction.compact()?;
        transaction.commit();
        Ok(())
    }

    pub(super) fn lock(&mut self) -> Result<(), PackageError> {
        if self.operator_mark {
            return Err(PackageError::TransactionOpen {
                owner: self.owner,
                kind: self.kind,
            });
        }
        self.operator_mark = true;
        Ok(())
    }

    pub(super) fn unlock(&mut self) {
        self.operator_mark = false;
    }

    pub(super) fn snapshot(&self) -> Snapshot {
        Snapshot {
            catalog_index: self.catalog_index.clone(),
            capacity_cur: self.capacity_cur,
            empty_count: self.empty_count,
            empty_hint: self.empty_hint,
        }
    }

    pub(super) fn restore(&mut self, snapshot: &Snapshot) {
        self.catalog_index.clone_from(&snapshot.catalog_index);
        self.capacity_cur = snapshot.capacity_cur;
        self.empty_count = snapshot.empty_count;
        self.empty_hint = snapshot.empty_hint;
    }

    pub(super) fn slot_mut(&mut self, slot: SlotId) -> Option<&mut Slot> {
        if slot >= self.capacity_cur {
            return None;
        }
        self.slots.get_mut(slot as usize)
    }

    pub(super) fn live_slots_mut(&mut self) -> &mut [Slot] {
        &mut self.slots[..self.capacity_cur as usize]
    }

    pub(super) fn swap_raw(&mut self, a: SlotId, b: SlotId) -> bool {
        if a >= self.capacity_cur || b >= self.capacity_cur {
            return false;
        }
        self.slots.swap(a as usize, b as usize);
        true
    }

    pub(super) fn overwrite_slot(&mut self, index: SlotId, slot: Slot) {
        if let Some(target) = self.slots.get_mut(index as usize) {
            *target = slot;
        }
    }

    pub(super) fn set_capacity_cur(&mut self, capacity: u32) {
        self.capacity_cur = capacity.min(self.capacity_max);
    }

    pub(super) fn add_empty(&mut self, count: u32) {
        self.empty_count = self
            .empty_count
            .saturating_add(count)
            .min(self.capacity_cur);
    }

    pub(super) fn sub_empty(&mut self) {
        self.empty_count = self.empty_count.saturating_sub(1);
    }

    /// Lowers the hint to `slot` if that is smaller than the current one.
    pub(super) fn set_hint(&mut self, slot: SlotId) {
        self.empty_hint = Some(self.empty_hint.map_or(slot, |hint| hint.min(slot)));
    }

    /// Refreshes the hint after `vacated` stops being empty.
    ///
    /// Probes a few slots after `vacated`, then a few from the start once the
    /// end of the live range is passed. Leaves the hint unset when nothing is
    /// found so the next lookup falls back to a full scan.
    pub(super) fn reset_hint(&mut self, vacated: SlotId) {
        if self.empty_hint == Some(vacated) {
            self.empty_hint = None;
        }

        let mut wrapped = 0;
        for step in 1..=HINT_PROBE_LIMIT {
            let mut next = vacated.saturating_add(step);
            if next >= self.capacity_cur {
                next = wrapped;
                wrapped += 1;
            }
            if next >= self.capacity_cur {
                break;
            }
            if self.slots[next as usize].is_empty() {
                self.empty_hint = Some(next);
                break;
            }
        }
    }

    pub(super) fn index_insert(&mut self, catalog_id: CatalogId, slot: SlotId) {
        self.catalog_index.insert(catalog_id, slot);
    }

    pub(super) fn index_remove(&mut self, catalog_id: CatalogId, slot: SlotId) {
        self.catalog_index.remove(catalog_id, slot);
    }
}
