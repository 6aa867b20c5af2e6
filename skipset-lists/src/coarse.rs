//! Coarse-grained locking wrapper around the sequential list
//!
//! Every operation takes one list-wide mutex. Correct and simple, but the
//! lock serializes all threads; the lazy and lock-free variants exist to
//! avoid exactly this bottleneck.

use parking_lot::Mutex;

use skipset_core::{Key, OrderedSet};

use crate::sequential::SequentialSkipList;

/// A thread-safe ordered set: the sequential skip list behind one mutex
pub struct ConcurrentSkipList<const MAX_HEIGHT: usize> {
    list: Mutex<SequentialSkipList<MAX_HEIGHT>>,
}

impl<const MAX_HEIGHT: usize> ConcurrentSkipList<MAX_HEIGHT> {
    /// Creates an empty list
    pub fn new() -> Self {
        Self {
            list: Mutex::new(SequentialSkipList::new()),
        }
    }
}

impl<const MAX_HEIGHT: usize> OrderedSet for ConcurrentSkipList<MAX_HEIGHT> {
    fn insert(&self, key: Key) -> bool {
        self.list.lock().insert(key)
    }

    fn remove(&self, key: Key) -> bool {
        self.list.lock().remove(key)
    }

    fn contains(&self, key: Key) -> bool {
        self.list.lock().contains(key)
    }

    fn len(&self) -> usize {
        self.list.lock().len()
    }

    fn clear(&self) {
        self.list.lock().clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations_behind_the_mutex() {
        let list = ConcurrentSkipList::<16>::new();

        assert!(list.is_empty());
        assert!(list.insert(42));
        assert!(!list.insert(42));
        assert!(list.contains(42));
        assert_eq!(list.len(), 1);
        assert!(list.remove(42));
        assert!(!list.remove(42));
        assert!(list.is_empty());
    }

    #[test]
    fn test_shared_between_threads() {
        use std::sync::Arc;
        use std::thread;

        let list = Arc::new(ConcurrentSkipList::<16>::new());
        let mut handles = Vec::new();

        for thread_id in 0..4i64 {
            let list = Arc::clone(&list);
            handles.push(thread::spawn(move || {
                for offset in 0..100 {
                    assert!(list.insert(thread_id * 100 + offset));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(list.len(), 400);
    }
}
