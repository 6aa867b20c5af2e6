//! Non-blocking skip list built on atomic marked pointers
//!
//! Each forward link is a [`MarkedRef`]: a single atomic word packing the
//! successor pointer and a logical-deletion mark. Removal proceeds in three
//! phases: mark the victim's links from its top level down to 1, win the
//! level-0 mark CAS (the deletion linearization point), then physically
//! unlink. Any traversal that encounters a marked node helps by unlinking
//! it, so no thread ever waits on another thread's progress.
//!
//! Insertion linearizes at the level-0 CAS that splices the node in; higher
//! levels are published afterwards and repaired via fresh traversals when a
//! CAS loses a race.
//!
//! Victims are reclaimed through crossbeam's epoch scheme by the thread that
//! wins the level-0 mark, after one cleanup traversal has unlinked them.

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::epoch::{self, Atomic, Guard, Owned, Shared};

use skipset_core::{is_valid_key, Key, OrderedSet, SkipListStatistics, MAXIMUM_KEY, MINIMUM_KEY};

use crate::height::random_height;
use crate::marked::MarkedRef;

struct Node {
    key: Key,
    /// Top level this node is published at; `next` holds `height + 1` links.
    height: usize,
    next: Vec<MarkedRef<Node>>,
}

impl Node {
    fn new(key: Key, height: usize) -> Self {
        let mut next = Vec::with_capacity(height + 1);
        for _ in 0..=height {
            next.push(MarkedRef::null());
        }

        Self { key, height, next }
    }
}

/// A thread-safe ordered set that is lock-free for every operation
pub struct LockFreeSkipList<const MAX_HEIGHT: usize> {
    head: Atomic<Node>,
    sentinel: Atomic<Node>,
    size: AtomicUsize,
}

impl<const MAX_HEIGHT: usize> LockFreeSkipList<MAX_HEIGHT> {
    /// Creates an empty list
    pub fn new() -> Self {
        assert!(MAX_HEIGHT > 0, "maximum height must be greater than 0");

        let sentinel_node = Node::new(MAXIMUM_KEY, MAX_HEIGHT - 1);
        let head_node = Node::new(MINIMUM_KEY, MAX_HEIGHT - 1);

        let sentinel = Atomic::new(sentinel_node);
        let guard = unsafe { epoch::unprotected() };
        let sentinel_shared = sentinel.load(Ordering::Relaxed, guard);
        for level in 0..MAX_HEIGHT {
            head_node.next[level].store(sentinel_shared, false);
        }

        Self {
            head: Atomic::new(head_node),
            sentinel,
            size: AtomicUsize::new(0),
        }
    }

    /// Records the predecessor and successor at every level, unlinking every
    /// marked node encountered on the way
    ///
    /// Returns whether an unmarked node carrying `key` sits at level 0. A
    /// failed unlink CAS means the snapshot went stale, so the traversal
    /// restarts from the head.
    fn find<'g>(
        &self,
        key: Key,
        predecessors: &mut [Shared<'g, Node>; MAX_HEIGHT],
        successors: &mut [Shared<'g, Node>; MAX_HEIGHT],
        guard: &'g Guard,
    ) -> bool {
        'retry: loop {
            let mut pred = self.head.load(Ordering::Acquire, guard);

            for level in (0..MAX_HEIGHT).rev() {
                let mut curr = unsafe { pred.deref() }.next[level].load_ref(guard);

                loop {
                    let (mut succ, mut marked) = unsafe { curr.deref() }.next[level].load(guard);

                    while marked {
                        if !unsafe { pred.deref() }.next[level]
                            .compare_and_set(curr, succ, false, false, guard)
                        {
                            continue 'retry;
                        }
                        curr = unsafe { pred.deref() }.next[level].load_ref(guard);
                        let pair = unsafe { curr.deref() }.next[level].load(guard);
                        succ = pair.0;
                        marked = pair.1;
                    }

                    if unsafe { curr.deref() }.key < key {
                        pred = curr;
                        curr = succ;
                    } else {
                        break;
                    }
                }

                predecessors[level] = pred;
                successors[level] = curr;
            }

            return unsafe { successors[0].deref() }.key == key;
        }
    }
}

impl<const MAX_HEIGHT: usize> OrderedSet for LockFreeSkipList<MAX_HEIGHT> {
    fn insert(&self, key: Key) -> bool {
        debug_assert!(is_valid_key(key));
        SkipListStatistics::with_local(|statistics| statistics.insertion_start());

        let guard = epoch::pin();
        let top_level = random_height(MAX_HEIGHT);
        let mut predecessors = [Shared::null(); MAX_HEIGHT];
        let mut successors = [Shared::null(); MAX_HEIGHT];

        loop {
            if self.find(key, &mut predecessors, &mut successors, &guard) {
                SkipListStatistics::with_local(|statistics| statistics.insertion_failure());
                return false;
            }

            let node = Node::new(key, top_level);
            for level in 0..=top_level {
                node.next[level].store(successors[level], false);
            }
            let node = Owned::new(node).into_shared(&guard);

            // level-0 splice, the insertion linearization point
            if !unsafe { predecessors[0].deref() }.next[0]
                .compare_and_set(successors[0], node, false, false, &guard)
            {
                // never published; take the allocation back and retry
                drop(unsafe { node.into_owned() });
                SkipListStatistics::with_local(|statistics| statistics.insertion_retry());
                continue;
            }
            self.size.fetch_add(1, Ordering::Relaxed);

            // publish the remaining levels, refreshing the snapshot whenever
            // a splice loses a race
            let mut level = 1;
            while level <= top_level {
                if unsafe { predecessors[level].deref() }.next[level]
                    .compare_and_set(successors[level], node, false, false, &guard)
                {
                    level += 1;
                    continue;
                }
                if !self.find(key, &mut predecessors, &mut successors, &guard)
                    || successors[0] != node
                {
                    // the node was already removed again; the traversal
                    // above unlinked whatever was published so far
                    break;
                }
            }

            // a remove may have condemned the node while higher levels were
            // still being published; scrub our own links before returning
            let (_, marked) = unsafe { node.deref() }.next[0].load(&guard);
            if marked {
                self.find(key, &mut predecessors, &mut successors, &guard);
            }

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

        if !self.find(key, &mut predecessors, &mut successors, &guard) {
            SkipListStatistics::with_local(|statistics| statistics.deletion_failure());
            return false;
        }

        let victim = successors[0];
        let victim_node = unsafe { victim.deref() };

        // phase one: condemn the links from the top level down to 1
        for level in (1..=victim_node.height).rev() {
            let (mut succ, mut marked) = victim_node.next[level].load(&guard);
            while !marked {
                victim_node.next[level].compare_and_set(succ, succ, false, true, &guard);
                let pair = victim_node.next[level].load(&guard);
                succ = pair.0;
                marked = pair.1;
            }
        }

        // phase two: the level-0 mark CAS decides which thread removes the
        // key; everyone else observes the mark and reports failure
        let (mut succ, _) = victim_node.next[0].load(&guard);
        loop {
            let won = victim_node.next[0].compare_and_set(succ, succ, false, true, &guard);
            let (next_succ, marked) = victim_node.next[0].load(&guard);

            if won {
                self.size.fetch_sub(1, Ordering::Relaxed);
                // phase three: physically unlink, then retire the node
                self.find(key, &mut predecessors, &mut successors, &guard);
                unsafe { guard.defer_destroy(victim) };
                SkipListStatistics::with_local(|statistics| statistics.deletion_success());
                return true;
            } else if marked {
                SkipListStatistics::with_local(|statistics| statistics.deletion_failure());
                return false;
            }
            succ = next_succ;
        }
    }

    fn contains(&self, key: Key) -> bool {
        debug_assert!(is_valid_key(key));
        SkipListStatistics::with_local(|statistics| statistics.lookup_start());

        let guard = epoch::pin();
        let mut pred = self.head.load(Ordering::Acquire, &guard);
        let mut curr = pred;

        for level in (0..MAX_HEIGHT).rev() {
            curr = unsafe { pred.deref() }.next[level].load_ref(&guard);

            loop {
                let (mut succ, mut marked) = unsafe { curr.deref() }.next[level].load(&guard);

                // step over condemned nodes without helping
                while marked {
                    curr = unsafe { curr.deref() }.next[level].load_ref(&guard);
                    let pair = unsafe { curr.deref() }.next[level].load(&guard);
                    succ = pair.0;
                    marked = pair.1;
                }

                if unsafe { curr.deref() }.key < key {
                    pred = curr;
                    curr = succ;
                } else {
                    break;
                }
            }
        }

        SkipListStatistics::with_local(|statistics| statistics.lookup_done());
        unsafe { curr.deref() }.key == key
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

        // condemn every node between head and sentinel
        let mut current = head.next[0].load_ref(&guard);
        while current != sentinel {
            let node = unsafe { current.deref() };
            for level in (0..=node.height).rev() {
                let (mut succ, mut marked) = node.next[level].load(&guard);
                while !marked {
                    node.next[level].compare_and_set(succ, succ, false, true, &guard);
                    let pair = node.next[level].load(&guard);
                    succ = pair.0;
                    marked = pair.1;
                }
            }

            let next = node.next[0].load_ref(&guard);
            unsafe { guard.defer_destroy(current) };
            current = next;
        }

        for level in 0..MAX_HEIGHT {
            head.next[level].store(sentinel, false);
        }
        self.size.store(0, Ordering::Relaxed);
    }
}

impl<const MAX_HEIGHT: usize> Drop for LockFreeSkipList<MAX_HEIGHT> {
    fn drop(&mut self) {
        let guard = &epoch::pin();

        let mut current = self.head.load(Ordering::Acquire, guard);
        while !current.is_null() {
            let next = unsafe { current.deref() }.next[0].load_ref(guard);
            unsafe {
                guard.defer_destroy(current);
            }
            current = next;
        }
    }
}
