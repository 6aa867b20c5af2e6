//! Concurrent behavior tests shared by the thread-safe variants
//!
//! Each scenario runs against the coarse, lazy, and lock-free lists through
//! the `OrderedSet` trait, so the three implementations face identical
//! schedules and assertions.

use std::sync::{Arc, Barrier};
use std::thread;

use skipset_core::{Key, OrderedSet};
use skipset_lists::{ConcurrentSkipList, LazySkipList, LockFreeSkipList};

fn parallel_disjoint_inserts(list: Arc<dyn OrderedSet>) {
    const THREADS: i64 = 50;
    const KEYS_PER_THREAD: i64 = 200;

    let mut handles = Vec::new();
    for thread_id in 0..THREADS {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            let start = thread_id * KEYS_PER_THREAD;
            for key in start..start + KEYS_PER_THREAD {
                assert!(list.insert(key));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(list.len(), (THREADS * KEYS_PER_THREAD) as usize);
    for key in 0..THREADS * KEYS_PER_THREAD {
        assert!(list.contains(key), "key {key} missing after parallel insert");
    }
}

fn racing_inserts_have_exactly_one_winner(list: Arc<dyn OrderedSet>) {
    const THREADS: usize = 4;

    let barrier = Arc::new(Barrier::new(THREADS));
    let mut handles = Vec::new();
    for _ in 0..THREADS {
        let list = Arc::clone(&list);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            usize::from(list.insert(7))
        }));
    }

    let winners: usize = handles.into_iter().map(|handle| handle.join().unwrap()).sum();
    assert_eq!(winners, 1);
    assert!(list.contains(7));
    assert_eq!(list.len(), 1);
}

fn overlapping_inserts_count_each_key_once(list: Arc<dyn OrderedSet>) {
    const THREADS: usize = 8;
    const KEYS: i64 = 500;

    let barrier = Arc::new(Barrier::new(THREADS));
    let mut handles = Vec::new();
    for _ in 0..THREADS {
        let list = Arc::clone(&list);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            (0..KEYS).filter(|&key| list.insert(key)).count()
        }));
    }

    let successes: usize = handles.into_iter().map(|handle| handle.join().unwrap()).sum();
    assert_eq!(successes, KEYS as usize);
    assert_eq!(list.len(), KEYS as usize);
    for key in 0..KEYS {
        assert!(list.contains(key));
    }
}

fn parallel_disjoint_removes(list: Arc<dyn OrderedSet>) {
    const THREADS: i64 = 8;
    const KEYS_PER_THREAD: i64 = 400;

    for key in 0..THREADS * KEYS_PER_THREAD {
        assert!(list.insert(key));
    }

    let mut handles = Vec::new();
    for thread_id in 0..THREADS {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            let start = thread_id * KEYS_PER_THREAD;
            for key in start..start + KEYS_PER_THREAD {
                assert!(list.remove(key));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(list.is_empty());
    assert_eq!(list.len(), 0);
}

/// Inserters, removers, and searchers run at once over disjoint key ranges,
/// so the quiescent size is exactly predictable.
fn mixed_stress_keeps_size_accounts(list: Arc<dyn OrderedSet>) {
    const INITIAL: i64 = 1_000;
    const INSERTERS: i64 = 4;
    const REMOVERS: i64 = 2;
    const KEYS_PER_THREAD: i64 = 500;

    for key in 0..INITIAL {
        assert!(list.insert(key));
    }

    let mut handles = Vec::new();
    for thread_id in 0..INSERTERS {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            let start = INITIAL + thread_id * KEYS_PER_THREAD;
            for key in start..start + KEYS_PER_THREAD {
                assert!(list.insert(key));
            }
        }));
    }
    for thread_id in 0..REMOVERS {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            let start = thread_id * KEYS_PER_THREAD;
            for key in start..start + KEYS_PER_THREAD {
                assert!(list.remove(key));
            }
        }));
    }
    for _ in 0..2 {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            for key in (0..INITIAL).step_by(7) {
                // searchers only observe; any answer is legal mid-flight
                list.contains(key);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let expected = INITIAL + INSERTERS * KEYS_PER_THREAD - REMOVERS * KEYS_PER_THREAD;
    assert_eq!(list.len(), expected as usize);

    for key in (REMOVERS * KEYS_PER_THREAD)..INITIAL {
        assert!(list.contains(key));
    }
    for key in 0..REMOVERS * KEYS_PER_THREAD {
        assert!(!list.contains(key));
    }
    for key in INITIAL..INITIAL + INSERTERS * KEYS_PER_THREAD {
        assert!(list.contains(key));
    }
}

fn insert_remove_churn_on_shared_keys(list: Arc<dyn OrderedSet>) {
    const THREADS: usize = 8;
    const ROUNDS: usize = 300;
    const KEYS: Key = 16;

    let barrier = Arc::new(Barrier::new(THREADS));
    let mut handles = Vec::new();
    for thread_id in 0..THREADS {
        let list = Arc::clone(&list);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut net: i64 = 0;
            for round in 0..ROUNDS {
                let key = ((round + thread_id) as Key) % KEYS;
                if round % 2 == 0 {
                    if list.insert(key) {
                        net += 1;
                    }
                } else if list.remove(key) {
                    net -= 1;
                }
            }
            net
        }));
    }

    let net_insertions: i64 = handles.into_iter().map(|handle| handle.join().unwrap()).sum();

    // the surviving keys are exactly the net successful insertions
    assert_eq!(list.len() as i64, net_insertions);
    let present = (0..KEYS).filter(|&key| list.contains(key)).count();
    assert_eq!(present as i64, net_insertions);
}

mod coarse {
    use super::*;

    #[test]
    fn test_parallel_disjoint_inserts() {
        parallel_disjoint_inserts(Arc::new(ConcurrentSkipList::<16>::new()));
    }

    #[test]
    fn test_racing_inserts_have_exactly_one_winner() {
        racing_inserts_have_exactly_one_winner(Arc::new(ConcurrentSkipList::<16>::new()));
    }

    #[test]
    fn test_overlapping_inserts_count_each_key_once() {
        overlapping_inserts_count_each_key_once(Arc::new(ConcurrentSkipList::<16>::new()));
    }

    #[test]
    fn test_parallel_disjoint_removes() {
        parallel_disjoint_removes(Arc::new(ConcurrentSkipList::<16>::new()));
    }

    #[test]
    fn test_mixed_stress_keeps_size_accounts() {
        mixed_stress_keeps_size_accounts(Arc::new(ConcurrentSkipList::<16>::new()));
    }

    #[test]
    fn test_insert_remove_churn_on_shared_keys() {
        insert_remove_churn_on_shared_keys(Arc::new(ConcurrentSkipList::<16>::new()));
    }
}

mod lazy {
    use super::*;

    #[test]
    fn test_parallel_disjoint_inserts() {
        parallel_disjoint_inserts(Arc::new(LazySkipList::<16>::new()));
    }

    #[test]
    fn test_racing_inserts_have_exactly_one_winner() {
        racing_inserts_have_exactly_one_winner(Arc::new(LazySkipList::<16>::new()));
    }

    #[test]
    fn test_overlapping_inserts_count_each_key_once() {
        overlapping_inserts_count_each_key_once(Arc::new(LazySkipList::<16>::new()));
    }

    #[test]
    fn test_parallel_disjoint_removes() {
        parallel_disjoint_removes(Arc::new(LazySkipList::<16>::new()));
    }

    #[test]
    fn test_mixed_stress_keeps_size_accounts() {
        mixed_stress_keeps_size_accounts(Arc::new(LazySkipList::<16>::new()));
    }

    #[test]
    fn test_insert_remove_churn_on_shared_keys() {
        insert_remove_churn_on_shared_keys(Arc::new(LazySkipList::<16>::new()));
    }
}

mod lock_free {
    use super::*;

    #[test]
    fn test_parallel_disjoint_inserts() {
        parallel_disjoint_inserts(Arc::new(LockFreeSkipList::<16>::new()));
    }

    #[test]
    fn test_racing_inserts_have_exactly_one_winner() {
        racing_inserts_have_exactly_one_winner(Arc::new(LockFreeSkipList::<16>::new()));
    }

    #[test]
    fn test_overlapping_inserts_count_each_key_once() {
        overlapping_inserts_count_each_key_once(Arc::new(LockFreeSkipList::<16>::new()));
    }

    #[test]
    fn test_parallel_disjoint_removes() {
        parallel_disjoint_removes(Arc::new(LockFreeSkipList::<16>::new()));
    }

    #[test]
    fn test_mixed_stress_keeps_size_accounts() {
        mixed_stress_keeps_size_accounts(Arc::new(LockFreeSkipList::<16>::new()));
    }

    #[test]
    fn test_insert_remove_churn_on_shared_keys() {
        insert_remove_churn_on_shared_keys(Arc::new(LockFreeSkipList::<16>::new()));
    }
}
