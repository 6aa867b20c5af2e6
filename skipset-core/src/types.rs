//! Core types used throughout skipset
//!
//! This module contains the key type stored by every list together with the
//! sentinel bounds that delimit valid keys.

/// A key in an ordered set, represented as a signed 64-bit integer
pub type Key = i64;

/// Sentinel key carried by the head node of every list
///
/// No valid key may compare less than or equal to this value.
pub const MINIMUM_KEY: Key = Key::MIN;

/// Sentinel key carried by the tail sentinel node of every list
///
/// No valid key may compare greater than or equal to this value.
pub const MAXIMUM_KEY: Key = Key::MAX;

/// Returns whether `key` lies strictly between the two sentinel bounds
#[inline]
pub fn is_valid_key(key: Key) -> bool {
    MINIMUM_KEY < key && key < MAXIMUM_KEY
}
