//! Benchmark suite definitions, one per list variant
//!
//! Every suite sweeps the list heights 8, 16, and 64 (the heights are const
//! generics, so each gets its own factory) and, for the concurrent variants,
//! doubles the thread count from 1 up to the available parallelism.

use std::sync::Arc;
use std::thread;

use skipset_core::OrderedSet;
use skipset_lists::{ConcurrentSkipList, LazySkipList, LockFreeSkipList};

use crate::config::{BenchmarkConfig, ListFactory, Scaling};
use crate::workload::Workload;

const REPETITIONS: u16 = 3;
const NUMBER_OF_ITEMS: usize = 250_000;
const INITIAL_NUMBER_OF_ITEMS: usize = 10_000;

fn thread_counts() -> Vec<usize> {
    let maximum = thread::available_parallelism().map_or(1, usize::from);

    let mut counts = Vec::new();
    let mut threads = 1;
    while threads <= maximum {
        counts.push(threads);
        threads *= 2;
    }
    counts
}

fn workload_set() -> Vec<(&'static str, Workload)> {
    vec![
        (
            "ascending insert - no failed inserts",
            Workload::ascending_insert(),
        ),
        (
            "descending insert - no failed inserts",
            Workload::descending_insert(),
        ),
        (
            "interleaving insert - no failed inserts",
            Workload::interleaving_insert(),
        ),
        (
            "ascending remove - no failed removes",
            Workload::ascending_remove(),
        ),
        (
            "descending remove - no failed removes",
            Workload::descending_remove(),
        ),
        (
            "interleaving remove - no failed removes",
            Workload::interleaving_remove(),
        ),
        ("mixed - 20% inserting, 10% removing", Workload::mixed(0.2, 0.1)),
    ]
}

fn push_configs(
    benchmarks: &mut Vec<BenchmarkConfig>,
    list_height: u16,
    factory: &ListFactory,
    number_of_threads: usize,
) {
    for (description, workload) in workload_set() {
        benchmarks.push(BenchmarkConfig {
            description: description.to_string(),
            repetitions: REPETITIONS,
            list_height,
            number_of_threads,
            number_of_items: NUMBER_OF_ITEMS,
            initial_number_of_items: INITIAL_NUMBER_OF_ITEMS,
            scaling: Scaling::Weak,
            list_factory: Arc::clone(factory),
            workload,
        });
    }
}

fn coarse_factories() -> Vec<(u16, ListFactory)> {
    vec![
        (
            8,
            Arc::new(|| Arc::new(ConcurrentSkipList::<8>::new()) as Arc<dyn OrderedSet>),
        ),
        (
            16,
            Arc::new(|| Arc::new(ConcurrentSkipList::<16>::new()) as Arc<dyn OrderedSet>),
        ),
        (
            64,
            Arc::new(|| Arc::new(ConcurrentSkipList::<64>::new()) as Arc<dyn OrderedSet>),
        ),
    ]
}

fn lazy_factories() -> Vec<(u16, ListFactory)> {
    vec![
        (
            8,
            Arc::new(|| Arc::new(LazySkipList::<8>::new()) as Arc<dyn OrderedSet>),
        ),
        (
            16,
            Arc::new(|| Arc::new(LazySkipList::<16>::new()) as Arc<dyn OrderedSet>),
        ),
        (
            64,
            Arc::new(|| Arc::new(LazySkipList::<64>::new()) as Arc<dyn OrderedSet>),
        ),
    ]
}

fn lock_free_factories() -> Vec<(u16, ListFactory)> {
    vec![
        (
            8,
            Arc::new(|| Arc::new(LockFreeSkipList::<8>::new()) as Arc<dyn OrderedSet>),
        ),
        (
            16,
            Arc::new(|| Arc::new(LockFreeSkipList::<16>::new()) as Arc<dyn OrderedSet>),
        ),
        (
            64,
            Arc::new(|| Arc::new(LockFreeSkipList::<64>::new()) as Arc<dyn OrderedSet>),
        ),
    ]
}

fn concurrent_suite_for(factories: Vec<(u16, ListFactory)>) -> Vec<BenchmarkConfig> {
    let mut benchmarks = Vec::new();
    for (list_height, factory) in factories {
        for number_of_threads in thread_counts() {
            push_configs(&mut benchmarks, list_height, &factory, number_of_threads);
        }
    }
    benchmarks
}

/// Single-threaded baseline over the sequential list
pub fn sequential_suite() -> Vec<BenchmarkConfig> {
    let mut benchmarks = Vec::new();
    for (list_height, factory) in coarse_factories() {
        push_configs(&mut benchmarks, list_height, &factory, 1);
    }
    benchmarks
}

/// The sequential list behind one coarse mutex, swept over thread counts
pub fn concurrent_suite() -> Vec<BenchmarkConfig> {
    concurrent_suite_for(coarse_factories())
}

/// The optimistic fine-grained locking list
pub fn lazy_suite() -> Vec<BenchmarkConfig> {
    concurrent_suite_for(lazy_factories())
}

/// The lock-free list
pub fn lock_free_suite() -> Vec<BenchmarkConfig> {
    concurrent_suite_for(lock_free_factories())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_counts_double_from_one() {
        let counts = thread_counts();

        assert_eq!(counts[0], 1);
        for pair in counts.windows(2) {
            assert_eq!(pair[1], pair[0] * 2);
        }
    }

    #[test]
    fn test_sequential_suite_is_single_threaded() {
        let benchmarks = sequential_suite();

        assert!(!benchmarks.is_empty());
        assert!(benchmarks.iter().all(|config| config.number_of_threads == 1));
    }

    #[test]
    fn test_suites_cover_all_heights_and_workloads() {
        for suite in [concurrent_suite(), lazy_suite(), lock_free_suite()] {
            let heights: Vec<u16> = suite.iter().map(|config| config.list_height).collect();
            assert!(heights.contains(&8));
            assert!(heights.contains(&16));
            assert!(heights.contains(&64));

            let per_height_and_threads = workload_set().len();
            assert_eq!(suite.len() % per_height_and_threads, 0);
        }
    }

    #[test]
    fn test_factories_build_empty_lists() {
        for (_, factory) in lazy_factories()
            .into_iter()
            .chain(lock_free_factories())
            .chain(coarse_factories())
        {
            let list = factory();
            assert!(list.is_empty());
            assert!(list.insert(1));
            assert!(list.contains(1));
        }
    }
}
