//! A scripted session exercising every transaction operation.

use pouch_core::inventory::{Package, Placement};
use pouch_core::{CatalogId, ItemHandle, PackageError, PouchConfig};

use crate::character::Character;
use crate::render::render;

/// Builds the sample catalog: ids 1 to 9, all stacking to 99 except id 2.
#[must_use]
pub fn catalog() -> Vec<ItemHandle> {
    (1..=9)
        .map(|catalog_id: CatalogId| {
            let max_stack = if catalog_id == 2 { 1 } else { 99 };
            ItemHandle::new(100_000 + u64::from(catalog_id), catalog_id, max_stack)
        })
        .collect()
}

fn log_package(stage: &str, package: &Package) {
    tracing::info!("{stage} ({} package)\n{}", package.kind(), render(package));
}

fn check(stage: &str, expected: u32, actual: u32) {
    if expected != actual {
        tracing::warn!(expected, actual, "{stage} moved an unexpected amount");
    }
}

/// Runs the session on a fresh character and returns it.
pub fn run(config: &PouchConfig) -> Result<Character, PackageError> {
    let items = catalog();
    let (stone, single) = (&items[0], &items[1]);

    let mut character = Character::new("user-1001", config)?;
    let span = tracing::info_span!("session", owner = %character.id(), name = character.name());
    let _enter = span.enter();

    log_package("initial", character.normal());
    log_package("initial", character.store());

    let mut transaction = character.normal_mut().transaction()?;
    check("put stone", 100, transaction.put(stone, 100));
    check(
        "put stone at 2",
        50,
        transaction.put_with(stone, 50, Placement::at(2))?,
    );
    log_package("after put", transaction.package());

    check(
        "put singles at 5",
        5,
        transaction.put_with(single, 90, Placement::at(5))?,
    );
    check(
        "put stone at 3",
        1,
        transaction.put_with(stone, 1, Placement::at(3))?,
    );
    log_package("after singles", transaction.package());

    check("remove stone", 99, transaction.remove(stone.catalog_id(), 99));
    log_package("after remove", transaction.package());

    check("put stone again", 100, transaction.put(stone, 100));
    if !transaction.swap(0, 1) {
        tracing::warn!("swap of slots 0 and 1 was rejected");
    }
    transaction.commit();
    transaction.release();
    log_package("after commit", character.normal());

    character.normal_mut().compact()?;
    log_package("after compact", character.normal());

    let moved = character.deposit(0, Placement::at(1))?;
    tracing::info!(moved, "Deposited slot 0 into storage");
    log_package("after deposit", character.normal());
    log_package("after deposit", character.store());

    Ok(character)
}
