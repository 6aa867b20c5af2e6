//! Skip-list implementations for skipset
//!
//! This crate implements the [`OrderedSet`](skipset_core::OrderedSet)
//! contract as probabilistic skip lists in four flavors:
//!
//! - **[`SequentialSkipList`]**: single-threaded reference implementation,
//!   used as the correctness oracle
//! - **[`ConcurrentSkipList`]**: the sequential list behind one coarse mutex
//! - **[`LazySkipList`]**: optimistic fine-grained locking with per-node
//!   reentrant locks and mark-then-unlink removal
//! - **[`LockFreeSkipList`]**: non-blocking, built on atomic marked pointers
//!   with cooperative physical unlinking
//!
//! The concurrent variants defer node reclamation through crossbeam's
//! epoch-based scheme, so traversals never touch freed memory.
//!
//! # Example
//!
//! ```
//! use skipset_core::OrderedSet;
//! use skipset_lists::LazySkipList;
//!
//! let list = LazySkipList::<16>::new();
//! assert!(list.insert(42));
//! assert!(list.contains(42));
//! assert!(!list.insert(42));
//! ```

pub mod coarse;
mod height;
pub mod lazy;
pub mod lock_free;
mod marked;
pub mod sequential;

pub use coarse::ConcurrentSkipList;
pub use lazy::LazySkipList;
pub use lock_free::LockFreeSkipList;
pub use sequential::SequentialSkipList;
