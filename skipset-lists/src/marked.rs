//! Atomic reference carrying a one-bit logical-deletion mark
//!
//! The mark is packed into the low tag bit of the pointer word, so reading
//! or swapping the `(pointer, mark)` pair is a single atomic step. Node
//! allocations are at least word-aligned, which keeps the bit free.

use std::sync::atomic::Ordering;

use crossbeam::epoch::{Atomic, Guard, Shared};

const MARK_BIT: usize = 1;

/// An atomic `(pointer, mark)` cell over epoch-protected nodes
pub(crate) struct MarkedRef<T> {
    inner: Atomic<T>,
}

impl<T> MarkedRef<T> {
    /// Creates a cell holding a null, unmarked reference
    pub(crate) fn null() -> Self {
        Self {
            inner: Atomic::null(),
        }
    }

    /// Reads the reference and its mark in one atomic step
    pub(crate) fn load<'g>(&self, guard: &'g Guard) -> (Shared<'g, T>, bool) {
        let shared = self.inner.load(Ordering::SeqCst, guard);
        (shared.with_tag(0), shared.tag() == MARK_BIT)
    }

    /// Reads only the reference, discarding the mark
    pub(crate) fn load_ref<'g>(&self, guard: &'g Guard) -> Shared<'g, T> {
        self.inner.load(Ordering::SeqCst, guard).with_tag(0)
    }

    /// Unconditionally replaces the `(pointer, mark)` pair
    pub(crate) fn store(&self, reference: Shared<'_, T>, marked: bool) {
        self.inner
            .store(reference.with_tag(usize::from(marked)), Ordering::SeqCst);
    }

    /// Swaps `(current, current_mark)` for `(new, new_mark)` in one CAS
    ///
    /// Returns whether the exchange took place.
    pub(crate) fn compare_and_set(
        &self,
        current: Shared<'_, T>,
        new: Shared<'_, T>,
        current_mark: bool,
        new_mark: bool,
        guard: &Guard,
    ) -> bool {
        self.inner
            .compare_exchange(
                current.with_tag(usize::from(current_mark)),
                new.with_tag(usize::from(new_mark)),
                Ordering::SeqCst,
                Ordering::SeqCst,
                guard,
            )
            .is_ok()
    }
}
