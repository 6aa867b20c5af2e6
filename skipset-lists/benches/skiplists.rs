//! Single-threaded throughput comparison of the skip-list variants
//!
//! The multi-threaded scaling story lives in the skipset-bench binary; these
//! benchmarks isolate the per-operation overhead each variant adds on top of
//! the sequential baseline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use skipset_core::OrderedSet;
use skipset_lists::{ConcurrentSkipList, LazySkipList, LockFreeSkipList, SequentialSkipList};

fn bench_sequential_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_insert");

    for size in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut list = SequentialSkipList::<16>::new();
                for key in 0..size {
                    list.insert(key);
                }
            });
        });
    }

    group.finish();
}

fn bench_concurrent_variants_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded_insert");
    let size = 10_000i64;

    group.bench_function("coarse", |b| {
        b.iter(|| {
            let list = ConcurrentSkipList::<16>::new();
            for key in 0..size {
                list.insert(key);
            }
        });
    });
    group.bench_function("lazy", |b| {
        b.iter(|| {
            let list = LazySkipList::<16>::new();
            for key in 0..size {
                list.insert(key);
            }
        });
    });
    group.bench_function("lock_free", |b| {
        b.iter(|| {
            let list = LockFreeSkipList::<16>::new();
            for key in 0..size {
                list.insert(key);
            }
        });
    });

    group.finish();
}

fn bench_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains");
    let size = 10_000i64;

    let lazy = LazySkipList::<16>::new();
    let lock_free = LockFreeSkipList::<16>::new();
    for key in 0..size {
        lazy.insert(key);
        lock_free.insert(key);
    }

    group.bench_function("lazy_hit", |b| {
        b.iter(|| black_box(lazy.contains(size / 2)));
    });
    group.bench_function("lazy_miss", |b| {
        b.iter(|| black_box(lazy.contains(size + 1)));
    });
    group.bench_function("lock_free_hit", |b| {
        b.iter(|| black_box(lock_free.contains(size / 2)));
    });
    group.bench_function("lock_free_miss", |b| {
        b.iter(|| black_box(lock_free.contains(size + 1)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_insert,
    bench_concurrent_variants_insert,
    bench_contains
);
criterion_main!(benches);
