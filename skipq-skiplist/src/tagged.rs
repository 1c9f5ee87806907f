//! Logical-deletion marking on skip list forward pointers
//!
//! Every `next[level]` pointer in the skip list is a `crossbeam_epoch::Atomic`.
//! `crossbeam_epoch` already reserves the low bits of every `Shared` pointer
//! for a user-defined tag (nodes are naturally aligned well beyond 2 bytes, so
//! the low bit is always free); this module gives that tag bit the specific
//! meaning the skip list assigns it — "the node this pointer targets has been
//! logically deleted" — without reaching for raw pointer arithmetic.
//!
//! The mark lands on the *current* node's own `next[0]` pointer during a
//! walk, not on a predecessor's pointer to some other node — a single CAS
//! on `next[0]` both observes the pointer's old value and deletes the node
//! that owns it. The node whose outgoing pointer gets marked becomes a
//! permanent tombstone; the value returned to the caller is whatever that
//! pointer targeted, one node further along the chain.

use crossbeam::epoch::Shared;

const MARK_BIT: usize = 1;

/// Returns `true` if `ptr` carries the logical-deletion mark.
pub(crate) fn is_marked<T>(ptr: Shared<'_, T>) -> bool {
    ptr.tag() & MARK_BIT != 0
}

/// Returns `ptr` with the logical-deletion mark set, preserving the address.
pub(crate) fn mark<'g, T>(ptr: Shared<'g, T>) -> Shared<'g, T> {
    ptr.with_tag(ptr.tag() | MARK_BIT)
}

/// Returns `ptr` with the logical-deletion mark cleared, preserving the
/// address. Used when dereferencing a pointer read off a `next` slot: the
/// mark is metadata about deletion, not part of the node's identity.
pub(crate) fn unmarked<'g, T>(ptr: Shared<'g, T>) -> Shared<'g, T> {
    ptr.with_tag(ptr.tag() & !MARK_BIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::epoch::{self, Owned};

    #[test]
    fn mark_unmark_roundtrip() {
        let guard = &epoch::pin();
        let owned = Owned::new(42i32);
        let shared = owned.into_shared(guard);

        assert!(!is_marked(shared));
        let marked = mark(shared);
        assert!(is_marked(marked));
        assert_eq!(unmarked(marked), shared);
        assert_eq!(unsafe { *unmarked(marked).as_ref().unwrap() }, 42);

        unsafe {
            guard.defer_destroy(shared);
        }
    }

    #[test]
    fn unmark_is_idempotent() {
        let guard = &epoch::pin();
        let owned = Owned::new(7i32);
        let shared = owned.into_shared(guard);

        assert_eq!(unmarked(shared), unmarked(unmarked(shared)));

        unsafe {
            guard.defer_destroy(shared);
        }
    }
}
