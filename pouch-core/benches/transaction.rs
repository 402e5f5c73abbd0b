#![allow(missing_docs)]
//! Benchmarks for package transactions.

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use pouch_core::inventory::{Package, PackageKind, Placement};
use pouch_core::{ItemHandle, OwnerId};

const CAPACITIES: [u32; 3] = [10, 100, 1000];
const CATALOG_IDS: u32 = 8;

fn item(catalog_id: u32) -> ItemHandle {
    ItemHandle::new(100_000 + u64::from(catalog_id), catalog_id, 99)
}

fn empty_package(capacity: u32) -> Package {
    Package::new(OwnerId::random(), PackageKind::Normal, capacity, capacity)
        .expect("bench capacities are valid")
}

/// Creates a package where every slot holds a small stack of a rotating item.
fn fragmented_package(capacity: u32) -> Package {
    let mut package = empty_package(capacity);
    let mut transaction = package.transaction().expect("package is free");
    for slot in 0..capacity {
        let catalog_id = slot % CATALOG_IDS + 1;
        transaction
            .put_with(&item(catalog_id), 7, Placement::at(slot).with_merge(false))
            .expect("slot is live");
    }
    transaction.commit();
    drop(transaction);
    package
}

fn bench_put_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_remove");

    for capacity in CAPACITIES {
        let stock = capacity * 99 / 2;
        group.bench_with_input(
            BenchmarkId::new("capacity", capacity),
            &capacity,
            |b, &capacity| {
                let mut package = empty_package(capacity);
                let stone = item(1);
                b.iter(|| {
                    let mut transaction = package.transaction().expect("package is free");
                    let placed = transaction.put(&stone, black_box(stock));
                    let removed = transaction.remove(1, black_box(placed));
                    transaction.commit();
                    black_box(removed);
                });
            },
        );
    }

    group.finish();
}

fn bench_rollback(c: &mut Criterion) {
    let mut group = c.benchmark_group("rollback");

    for capacity in CAPACITIES {
        group.bench_with_input(
            BenchmarkId::new("capacity", capacity),
            &capacity,
            |b, &capacity| {
                let mut package = fragmented_package(capacity);
                b.iter(|| {
                    let mut transaction = package.transaction().expect("package is free");
                    for catalog_id in 1..=CATALOG_IDS {
                        black_box(transaction.remove(catalog_id, black_box(50)));
                    }
                    transaction.rollback();
                });
            },
        );
    }

    group.finish();
}

fn bench_compact(c: &mut Criterion) {
    let mut group = c.benchmark_group("compact");

    for capacity in CAPACITIES {
        group.bench_with_input(
            BenchmarkId::new("capacity", capacity),
            &capacity,
            |b, &capacity| {
                b.iter_batched(
                    || fragmented_package(capacity),
                    |mut package| {
                        package.compact().expect("package is free");
                        black_box(package);
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_put_remove, bench_rollback, bench_compact);
criterion_main!(benches);
