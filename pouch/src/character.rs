//! A package owner with a main bag and a storage package.

use pouch_core::inventory::{Package, PackageKind, Placement, SlotId};
use pouch_core::{OwnerId, PackageError, PouchConfig};

/// A named owner holding a normal and a store package.
#[derive(Debug)]
pub struct Character {
    id: OwnerId,
    name: String,
    normal: Package,
    store: Package,
}

impl Character {
    /// Creates a character whose packages are sized by `config`.
    pub fn new(name: impl Into<String>, config: &PouchConfig) -> Result<Self, PackageError> {
        let id = OwnerId::random();
        Ok(Self {
            id,
            name: name.into(),
            normal: Package::from_config(id, PackageKind::Normal, config)?,
            store: Package::from_config(id, PackageKind::Store, config)?,
        })
    }

    /// Returns the owner id shared by both packages.
    #[must_use]
    pub fn id(&self) -> OwnerId {
        self.id
    }

    /// Returns the character's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the main bag.
    #[must_use]
    pub fn normal(&self) -> &Package {
        &self.normal
    }

    /// Returns the storage package.
    #[must_use]
    pub fn store(&self) -> &Package {
        &self.store
    }

    /// Returns the main bag for mutation.
    pub fn normal_mut(&mut self) -> &mut Package {
        &mut self.normal
    }

    /// Returns the storage package for mutation.
    pub fn store_mut(&mut self) -> &mut Package {
        &mut self.store
    }

    /// Returns both packages at once, main bag first.
    pub fn packages_mut(&mut self) -> (&mut Package, &mut Package) {
        (&mut self.normal, &mut self.store)
    }

    /// Moves the whole stack in `slot` of the main bag into storage.
    pub fn deposit(&mut self, slot: SlotId, placement: Placement) -> Result<u32, PackageError> {
        transfer(&mut self.normal, slot, &mut self.store, placement)
    }

    /// Moves the whole stack in `slot` of storage into the main bag.
    pub fn withdraw(&mut self, slot: SlotId, placement: Placement) -> Result<u32, PackageError> {
        transfer(&mut self.store, slot, &mut self.normal, placement)
    }
}

/// Moves the stack in `slot` of `source` into `target`, all or nothing.
///
/// Both packages get their own transaction. If `target` cannot take the whole
/// stack, both are rolled back and zero is returned. An empty source slot
/// moves nothing.
pub fn transfer(
    source: &mut Package,
    slot: SlotId,
    target: &mut Package,
    placement: Placement,
) -> Result<u32, PackageError> {
    let capacity = source.capacity_cur();
    let stack = source
        .get_slot(slot)
        .ok_or(PackageError::SlotOutOfRange { slot, capacity })?;
    let Some(item) = stack.item().filter(|_| !stack.is_empty()).cloned() else {
        return Ok(0);
    };
    let count = stack.count();

    let mut take = source.transaction()?;
    let mut give = target.transaction()?;

    let removed = take.remove_from(item.catalog_id(), count, slot)?;
    let placed = give.put_with(&item, removed, placement)?;
    if placed < removed {
        tracing::debug!(
            catalog_id = item.catalog_id(),
            removed,
            placed,
            "Target package is full, cancelling transfer"
        );
        return Ok(0);
    }

    give.commit();
    take.commit();
    Ok(placed)
}
