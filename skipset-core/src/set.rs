//! The ordered-set contract shared by every thread-safe skip list
//!
//! All operations take `&self`; concurrent implementations synchronize
//! internally. Each operation is linearizable at a single atomic step
//! between invocation and return, with the exception of `clear`, which is
//! only meaningful under external quiescence.

use crate::types::Key;

/// A sorted set of integer keys
///
/// Keys must lie strictly between [`MINIMUM_KEY`](crate::MINIMUM_KEY) and
/// [`MAXIMUM_KEY`](crate::MAXIMUM_KEY); the bounds are reserved for the
/// internal head and sentinel nodes.
pub trait OrderedSet: Send + Sync {
    /// Inserts `key` into the set
    ///
    /// Returns `true` if the key was absent and is now present, `false` if
    /// it was already present.
    fn insert(&self, key: Key) -> bool;

    /// Removes `key` from the set
    ///
    /// Returns `true` if the key was present and is now absent, `false` if
    /// it was absent.
    fn remove(&self, key: Key) -> bool;

    /// Returns whether `key` was present at some instant during the call
    fn contains(&self, key: Key) -> bool;

    /// Returns the number of keys in the set
    ///
    /// Best-effort under concurrency; exact when the set is quiescent.
    fn len(&self) -> usize;

    /// Returns whether the set is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every key from the set
    ///
    /// Not linearizable with respect to concurrent operations; callers must
    /// quiesce the set externally.
    fn clear(&self);
}
