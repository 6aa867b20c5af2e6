//! Single-threaded skip list, the correctness oracle
//!
//! This variant is not thread-safe: mutation takes `&mut self` and the
//! borrow checker enforces exclusive access. The concurrent variants are
//! validated against it. Wrap it in [`ConcurrentSkipList`](crate::coarse)
//! for shared use.

use skipset_core::{is_valid_key, Key, SkipListStatistics, MAXIMUM_KEY, MINIMUM_KEY};

use crate::height::random_height;

/// Recognizable bad address written into unused forward slots in debug
/// builds, so that following one faults loudly instead of silently reading
/// a stale pointer.
#[cfg(debug_assertions)]
const POISON_ADDRESS: usize = 0xC0FFEE;

struct Node<const MAX_HEIGHT: usize> {
    key: Key,
    /// Top level this node is linked at; `next[0..=height]` are live slots.
    height: usize,
    next: [*mut Node<MAX_HEIGHT>; MAX_HEIGHT],
}

impl<const MAX_HEIGHT: usize> Node<MAX_HEIGHT> {
    fn allocate(key: Key, height: usize) -> *mut Self {
        debug_assert!(height < MAX_HEIGHT);

        #[cfg(debug_assertions)]
        let next = [POISON_ADDRESS as *mut Self; MAX_HEIGHT];
        #[cfg(not(debug_assertions))]
        let next = [std::ptr::null_mut(); MAX_HEIGHT];

        Box::into_raw(Box::new(Self { key, height, next }))
    }
}

/// A probabilistic ordered set of integer keys with expected O(log n) search
///
/// Head and sentinel nodes of maximum height carry the two sentinel keys;
/// every stored key lies strictly between them. The ordered key sequence is
/// the level-0 chain.
pub struct SequentialSkipList<const MAX_HEIGHT: usize> {
    head: *mut Node<MAX_HEIGHT>,
    sentinel: *mut Node<MAX_HEIGHT>,
    /// Highest level currently linked to a real node.
    height: usize,
    size: usize,
}

// The list owns every node reachable from `head` and never hands out node
// references, so moving it across threads is sound.
unsafe impl<const MAX_HEIGHT: usize> Send for SequentialSkipList<MAX_HEIGHT> {}

impl<const MAX_HEIGHT: usize> SequentialSkipList<MAX_HEIGHT> {
    /// Creates an empty list
    pub fn new() -> Self {
        assert!(MAX_HEIGHT > 0, "maximum height must be greater than 0");

        let head = Node::allocate(MINIMUM_KEY, MAX_HEIGHT - 1);
        let sentinel = Node::<MAX_HEIGHT>::allocate(MAXIMUM_KEY, MAX_HEIGHT - 1);
        unsafe {
            (*head).next = [sentinel; MAX_HEIGHT];
            (*sentinel).next = [std::ptr::null_mut(); MAX_HEIGHT];
        }

        let list = Self {
            head,
            sentinel,
            height: 0,
            size: 0,
        };
        list.check_consistency();
        list
    }

    /// Inserts `key`, returning whether it was newly added
    pub fn insert(&mut self, key: Key) -> bool {
        debug_assert!(is_valid_key(key));
        SkipListStatistics::with_local(|statistics| statistics.insertion_start());

        let mut predecessors = [std::ptr::null_mut(); MAX_HEIGHT];
        let current = self.search_with_predecessors(key, &mut predecessors);
        if unsafe { (*current).key } == key {
            SkipListStatistics::with_local(|statistics| statistics.insertion_failure());
            return false;
        }

        let new_height = random_height(MAX_HEIGHT);
        if new_height > self.height {
            // slots above the previous maximum connect straight to the head
            for level in (self.height + 1)..=new_height {
                predecessors[level] = self.head;
            }
            self.height = new_height;
        }

        let new_node = Node::allocate(key, new_height);
        unsafe {
            for level in 0..=new_height {
                (*new_node).next[level] = (*predecessors[level]).next[level];
                (*predecessors[level]).next[level] = new_node;
            }
        }

        self.size += 1;
        self.check_consistency();
        SkipListStatistics::with_local(|statistics| statistics.insertion_success());
        true
    }

    /// Removes `key`, returning whether it was present
    pub fn remove(&mut self, key: Key) -> bool {
        debug_assert!(is_valid_key(key));
        SkipListStatistics::with_local(|statistics| statistics.deletion_start());

        let mut predecessors = [std::ptr::null_mut(); MAX_HEIGHT];
        let current = self.search_with_predecessors(key, &mut predecessors);
        if unsafe { (*current).key } != key {
            SkipListStatistics::with_local(|statistics| statistics.deletion_failure());
            return false;
        }

        unsafe {
            for level in 0..=(*current).height {
                (*predecessors[level]).next[level] = (*current).next[level];
            }
            drop(Box::from_raw(current));
        }

        // shrink to the highest level still connecting to a real node
        while self.height > 0 && unsafe { (*self.head).next[self.height] } == self.sentinel {
            self.height -= 1;
        }

        self.size -= 1;
        self.check_consistency();
        SkipListStatistics::with_local(|statistics| statistics.deletion_success());
        true
    }

    /// Returns whether `key` is present
    pub fn contains(&self, key: Key) -> bool {
        debug_assert!(is_valid_key(key));
        SkipListStatistics::with_local(|statistics| statistics.lookup_start());

        let mut current = self.head;
        unsafe {
            for level in (0..=self.height).rev() {
                while (*(*current).next[level]).key < key {
                    current = (*current).next[level];
                }
            }
            current = (*current).next[0];

            SkipListStatistics::with_local(|statistics| statistics.lookup_done());
            (*current).key == key
        }
    }

    /// Removes every key
    pub fn clear(&mut self) {
        unsafe {
            let mut current = (*self.head).next[0];
            while current != self.sentinel {
                let next = (*current).next[0];
                drop(Box::from_raw(current));
                current = next;
            }

            for level in 0..=self.height {
                (*self.head).next[level] = self.sentinel;
            }
        }

        self.size = 0;
        self.height = 0;
        self.check_consistency();
    }

    /// Returns the number of stored keys
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Walks down from the current height, remembering the last node with a
    /// key below `key` at every level, and returns the level-0 successor of
    /// the lowest predecessor.
    fn search_with_predecessors(
        &self,
        key: Key,
        predecessors: &mut [*mut Node<MAX_HEIGHT>; MAX_HEIGHT],
    ) -> *mut Node<MAX_HEIGHT> {
        let mut current = self.head;
        unsafe {
            for level in (0..=self.height).rev() {
                while (*(*current).next[level]).key < key {
                    current = (*current).next[level];
                }
                predecessors[level] = current;
            }
            (*current).next[0]
        }
    }

    /// Debug-only structural validation, run after every mutation
    fn check_consistency(&self) {
        #[cfg(debug_assertions)]
        unsafe {
            let poison = POISON_ADDRESS as *mut Node<MAX_HEIGHT>;

            let mut current = self.head;
            while current != self.sentinel {
                let node_height = (*current).height;

                // live slots never carry the poison or null
                for level in 0..=node_height {
                    debug_assert!(!(*current).next[level].is_null());
                    debug_assert!((*current).next[level] != poison);
                }

                // unused slots carry nothing but the poison
                for level in (node_height + 1)..MAX_HEIGHT {
                    debug_assert!((*current).next[level] == poison);
                }

                current = (*current).next[0];
            }

            // sentinel forward links must never be usable
            for level in 0..MAX_HEIGHT {
                debug_assert!((*self.sentinel).next[level].is_null());
            }
        }
    }

    #[cfg(test)]
    fn keys_in_order(&self) -> Vec<Key> {
        let mut keys = Vec::with_capacity(self.size);
        unsafe {
            let mut current = (*self.head).next[0];
            while current != self.sentinel {
                keys.push((*current).key);
                current = (*current).next[0];
            }
        }
        keys
    }
}

impl<const MAX_HEIGHT: usize> Drop for SequentialSkipList<MAX_HEIGHT> {
    fn drop(&mut self) {
        unsafe {
            let mut current = self.head;
            while !current.is_null() {
                let next = (*current).next[0];
                drop(Box::from_raw(current));
                current = next;
            }
        }
    }
}
