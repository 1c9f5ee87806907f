//! Core types used throughout SkipQ
//!
//! This module contains the fundamental data types that form the basis of the
//! queue's data model. Values are left generic at the skip list layer; this
//! module only fixes the key representation, since the skip list's ordering
//! and sentinel logic depend on it being a concrete, totally ordered type.

/// The key type ordered by the priority queue.
///
/// Keys must be strictly less than [`SENTINEL_KEYMAX`]; that value is
/// reserved for the tail sentinel and is never a valid user key.
pub type Key = u64;

/// The reserved key value used by the skip list's tail sentinel.
///
/// No caller-supplied key may equal this value; doing so is a usage error.
/// `PriorityQueue::try_insert` rejects it with [`crate::Error::KeyOutOfRange`];
/// the infallible `PriorityQueue::insert` panics via that same check, and the
/// skip list's own insert path carries a `debug_assert!` as a last-resort
/// invariant check beneath it.
pub const SENTINEL_KEYMAX: Key = u64::MAX;
