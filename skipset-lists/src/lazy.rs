//! Optimistic fine-grained locking skip list
//!
//! Traversals never lock. Mutations lock only the affected predecessors,
//! then re-validate that the snapshot taken during the unlocked traversal
//! still holds; a failed validation unlocks and retries. Set membership is
//! the predicate `fully_linked && !marked`:
//!
//! - insert publishes all links under the predecessor locks and then flips
//!   `fully_linked`, the insertion linearization point
//! - remove flips `marked` under the victim's lock (the deletion
//!   linearization point) and unlinks afterwards, keeping the victim locked
//!   across validation retries
//!
//! Nodes are reclaimed through epoch-based deferral once unlinked, so a
//! concurrent unlocked traversal can never touch freed memory.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam::epoch::{self, Atomic, Guard, Owned, Shared};
use parking_lot::ReentrantMutex;

use skipset_core::{is_valid_key, Key, OrderedSet, SkipListStatistics, MAXIMUM_KEY, MINIMUM_KEY};

use crate::height::random_height;

struct Node {
    key: Key,
    /// Top level this node participates in; `next` holds `height + 1` links.
    height: usize,
    next: Vec<Atomic<Node>>,
    /// Reentrant so that one node locked as predecessor at several levels
    /// does not deadlock its owner.
    lock: ReentrantMutex<()>,
    marked: AtomicBool,
    fully_linked: AtomicBool,
}

impl Node {
    fn new(key: Key, height: usize) -> Self {
        let mut next = Vec::with_capacity(height + 1);
        for _ in 0..=height {
            next.push(Atomic::null());
        }

        Self {
            key,
            height,
            next,
            lock: ReentrantMutex::new(()),
            marked: AtomicBool::new(false),
            fully_linked: AtomicBool::new(false),
        }
    }
}

/// A thread-safe ordered set with per-node locks and lock-free lookups
pub struct LazySkipList<const MAX_HEIGHT: usize> {
    head: Atomic<Node>,
    sentinel: Atomic<Node>,
    size: AtomicUsize,
}

impl<const MAX_HEIGHT: usize> LazySkipList<MAX_HEIGHT> {
    /// Creates an empty list
    pub fn new() -> Self {
        assert!(MAX_HEIGHT > 0, "maximum height must be greater than 0");

        let sentinel_node = Node::new(MAXIMUM_KEY, MAX_HEIGHT - 1);
        sentinel_node.fully_linked.store(true, Ordering::Relaxed);
        let head_node = Node::new(MINIMUM_KEY, MAX_HEIGHT - 1);
        head_node.fully_linked.store(true, Ordering::Relaxed);

        let sentinel = Atomic::new(sentinel_node);
        let guard = unsafe { epoch::unprotected() };
        let sentinel_shared = sentinel.load(Ordering::Relaxed, guard);
        for level in 0..MAX_HEIGHT {
            head_node.next[level].store(sentinel_shared, Ordering::Relaxed);
        }

        Self {
            head: Atomic::new(head_node),
            sentinel,
            size: AtomicUsize::new(0),
        }
    }

    /// Records the predecessor and successor at every level and returns the
    /// highest level whose successor carries `key`, without taking any locks
    fn find<'g>(
        &self,
        key: Key,
        predecessors: &mut [Shared<'g, Node>; MAX_HEIGHT],
        successors: &mut [Shared<'g, Node>; MAX_HEIGHT],
        guard: &'g Guard,
    ) -> Option<usize> {
        let mut found_level = None;
        let mut pred = self.head.load(Ordering::Acquire, guard);

        for level in (0..MAX_HEIGHT).rev() {
            let mut curr = unsafe { pred.deref() }.next[level].load(Ordering::Acquire, guard);
            while unsafe { curr.deref() }.key < key {
                pred = curr;
                curr = unsafe { pred.deref() }.next[level].load(Ordering::Acquire, guard);
            }

            if found_level.is_none() && unsafe { curr.deref() }.key == key {
                found_level = Some(level);
            }
            predecessors[level] = pred;
            successors[level] = curr;
        }
        found_level
    }
}

impl<const MAX_HEIGHT: usize> OrderedSet for LazySkipList<MAX_HEIGHT> {
    fn insert(&self, key: Key) -> bool {
        debug_assert!(is_valid_key(key));
        SkipListStatistics::with_local(|statistics| statistics.insertion_start());

        let guard = epoch::pin();
        let new_height = random_height(MAX_HEIGHT);
        let mut predecessors = [Shared::null(); MAX_HEIGHT];
        let mut successors = [Shared::null(); MAX_HEIGHT];

        loop {
            if let Some(found_level) = self.find(key, &mut predecessors, &mut successors, &guard) {
                let found = unsafe { successors[found_level].deref() };
                if !found.marked.load(Ordering::Acquire) {
                    // wait until the winning insert finishes publishing
                    while !found.fully_linked.load(Ordering::Acquire) {
                        std::hint::spin_loop();
                    }
                    SkipListStatistics::with_local(|statistics| statistics.insertion_failure());
                    return false;
                }
                // a marked duplicate is on its way out; retry once it is gone
                SkipListStatistics::with_local(|statistics| statistics.insertion_retry());
                continue;
            }

            // lock predecessors bottom-up, then re-validate the snapshot
            let mut locks = Vec::with_capacity(new_height + 1);
            let mut valid = true;
            for level in 0..=new_height {
                let pred = unsafe { predecessors[level].deref() };
                let succ = unsafe { successors[level].deref() };
                locks.push(pred.lock.lock());
                if pred.marked.load(Ordering::Acquire)
                    || succ.marked.load(Ordering::Acquire)
                    || pred.next[level].load(Ordering::Acquire, &guard) != successors[level]
                {
                    valid = false;
                    break;
                }
            }
            if !valid {
                drop(locks);
                SkipListStatistics::with_local(|statistics| statistics.insertion_retry());
                continue;
            }

            let node = Owned::new(Node::new(key, new_height));
            for level in 0..=new_height {
                node.next[level].store(successors[level], Ordering::Relaxed);
            }
            let node = node.into_shared(&guard);
            for level in 0..=new_height {
                unsafe { predecessors[level].deref() }.next[level].store(node, Ordering::Release);
            }
            // insertion linearization point
            unsafe { node.deref() }.fully_linked.store(true, Ordering::Release);
            self.size.fetch_add(1, Ordering::Relaxed);

            SkipListStatistics::with_local(|statistics| statistics.insertion_success());
            return true;
        }
    }

    fn remove(&self, key: Key) -> bool {
        debug_assert!(is_valid_key(key));
        SkipListStatistics::with_local(|statistics| statistics.deletion_start());

        let guard = epoch::pin();
        let mut predecessors = [Shared::null(); MAX_HEIGHT];
        let mut successors = [Shared::null(); MAX_HEIGHT];
        let mut victim = Shared::null();
        let mut victim_lock = None;

        loop {
            let found_level = self.find(key, &mut predecessors, &mut successors, &guard);
            let retrying = victim_lock.is_some();

            let Some(found_level) = found_level else {
                SkipListStatistics::with_local(|statistics| statistics.deletion_failure());
                return false;
            };

            if !retrying {
                let candidate = unsafe { successors[found_level].deref() };
                if !(candidate.fully_linked.load(Ordering::Acquire)
                    && !candidate.marked.load(Ordering::Acquire)
                    && candidate.height == found_level)
                {
                    SkipListStatistics::with_local(|statistics| statistics.deletion_failure());
                    return false;
                }

                victim = successors[found_level];
                let lock = candidate.lock.lock();
                if candidate.marked.load(Ordering::Acquire) {
                    drop(lock);
                    SkipListStatistics::with_local(|statistics| statistics.deletion_failure());
                    return false;
                }
                // deletion linearization point; the victim stays locked
                // until it is unlinked
                candidate.marked.store(true, Ordering::Release);
                self.size.fetch_sub(1, Ordering::Relaxed);
                victim_lock = Some(lock);
            }

            let victim_node = unsafe { victim.deref() };

            // lock predecessors bottom-up, then re-validate
            let mut locks = Vec::with_capacity(victim_node.height + 1);
            let mut valid = true;
            for level in 0..=victim_node.height {
                let pred = unsafe { predecessors[level].deref() };
                locks.push(pred.lock.lock());
                if pred.marked.load(Ordering::Acquire)
                    || pred.next[level].load(Ordering::Acquire, &guard) != victim
                {
                    valid = false;
                    break;
                }
            }
            if !valid {
                drop(locks);
                SkipListStatistics::with_local(|statistics| statistics.deletion_retry());
                continue;
            }

            // unlink top-down; afterwards no path through the list reaches
            // the victim, so it can be handed to deferred reclamation
            for level in (0..=victim_node.height).rev() {
                let successor = victim_node.next[level].load(Ordering::Acquire, &guard);
                unsafe { predecessors[level].deref() }.next[level]
                    .store(successor, Ordering::Release);
            }

            drop(locks);
            drop(victim_lock);
            unsafe { guard.defer_destroy(victim) };

            SkipListStatistics::with_local(|statistics| statistics.deletion_success());
            return true;
        }
    }

    fn contains(&self, key: Key) -> bool {
        debug_assert!(is_valid_key(key));
        SkipListStatistics::with_local(|statistics| statistics.lookup_start());

        let guard = epoch::pin();
        let mut predecessors = [Shared::null(); MAX_HEIGHT];
        let mut successors = [Shared::null(); MAX_HEIGHT];
        let found_level = self.find(key, &mut predecessors, &mut successors, &guard);

        SkipListStatistics::with_local(|statistics| statistics.lookup_done());
        match found_level {
            Some(level) => {
                let found = unsafe { successors[level].deref() };
                found.fully_linked.load(Ordering::Acquire) && !found.marked.load(Ordering::Acquire)
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    /// Requires external quiescence; concurrent operations observe
    /// intermediate states.
    fn clear(&self) {
        let guard = epoch::pin();
        let head = unsafe { self.head.load(Ordering::Acquire, &guard).deref() };
        let sentinel = self.sentinel.load(Ordering::Acquire, &guard);
        let _head_lock = head.lock.lock();

        let mut current = head.next[0].load(Ordering::Acquire, &guard);
        while current != sentinel {
            let node = unsafe { current.deref() };
            // wait out an in-flight insert of this node
            while !node.fully_linked.load(Ordering::Acquire) || node.marked.load(Ordering::Acquire)
            {
                std::hint::spin_loop();
            }
            {
                let _node_lock = node.lock.lock();
                node.marked.store(true, Ordering::Release);
            }

            let next = node.next[0].load(Ordering::Acquire, &guard);
            unsafe { guard.defer_destroy(current) };
            current = next;
        }

        for level in 0..MAX_HEIGHT {
            head.next[level].store(sentinel, Ordering::Release);
        }
        self.size.store(0, Ordering::Relaxed);
    }
}

impl<const MAX_HEIGHT: usize> Drop for LazySkipList<MAX_HEIGHT> {
    fn drop(&mut self) {
        let guard = &epoch::pin();

        let mut current = self.head.load(Ordering::Acquire, guard);
        while !current.is_null() {
            let next = unsafe { current.deref() }.next[0].load(Ordering::Acquire, guard);
            unsafe {
                guard.defer_destroy(current);
            }
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_list_is_empty() {
        let list = LazySkipList::<16>::new();

        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_insert_then_contains() {
        let list = LazySkipList::<16>::new();

        assert!(list.insert(42));

        assert!(!list.is_empty());
        assert_eq!(list.len(), 1);
        assert!(list.contains(42));
        assert!(!list.contains(41));
    }

    #[test]
    fn test_duplicate_insert_fails() {
        let list = LazySkipList::<16>::new();

        assert!(list.insert(12));
        assert!(!list.insert(12));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let list = LazySkipList::<16>::new();

        list.insert(42);
        assert!(list.remove(42));
        assert!(!list.remove(42));
        assert!(list.is_empty());
        assert!(!list.contains(42));
    }

    #[test]
    fn test_multiple_keys() {
        let list = LazySkipList::<16>::new();

        list.insert(12);
        list.insert(42);
        list.insert(21);

        assert_eq!(list.len(), 3);
        assert!(list.contains(12));
        assert!(list.contains(21));
        assert!(list.contains(42));
    }

    #[test]
    fn test_reinsert_after_remove() {
        let list = LazySkipList::<16>::new();

        assert!(list.insert(7));
        assert!(list.remove(7));
        assert!(list.insert(7));
        assert!(list.contains(7));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_clear_empties_the_list() {
        let list = LazySkipList::<16>::new();

        list.insert(21);
        list.insert(42);
        list.clear();

        assert!(list.is_empty());
        assert!(!list.contains(21));
        assert!(!list.contains(42));

        for key in 0..3 {
            assert!(list.insert(key));
        }
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_size_accounting_single_threaded() {
        let list = LazySkipList::<16>::new();

        for key in 0..100 {
            assert!(list.insert(key));
        }
        for key in 50..150 {
            list.remove(key);
        }

        assert_eq!(list.len(), 50);
    }
}
