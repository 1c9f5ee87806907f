//! The skip list node type
//!
//! Each node owns one `Atomic` forward pointer per level it participates in:
//! a node at level `i` is also linked at every level below `i`. Nodes
//! are cache-line aligned, matching the original design's manual 64-byte
//! alignment of its `malloc`ed nodes — under heavy contention, neighbouring
//! nodes sharing a cache line would otherwise false-share on every CAS.

use crossbeam::epoch::Atomic;
use skipq_core::Key;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Maximum number of forward-pointer levels a node can have.
pub(crate) const MAX_LEVEL: usize = 32;

#[repr(align(64))]
pub(crate) struct Node<V> {
    pub(crate) key: Key,
    /// `None` only for the head and tail sentinels.
    pub(crate) value: Option<V>,
    /// Effective height of the node. Starts at `next.len()` and only ever
    /// shrinks: an insert that abandons upper-level linking lowers it, so
    /// readers never follow a forward pointer that was staged during
    /// insertion but never wired into a chain.
    level: AtomicUsize,
    pub(crate) next: Box<[Atomic<Node<V>>]>,
}

impl<V> Node<V> {
    pub(crate) fn new(key: Key, value: V, level: usize) -> Self {
        Self {
            key,
            value: Some(value),
            level: AtomicUsize::new(level),
            next: (0..level).map(|_| Atomic::null()).collect(),
        }
    }

    pub(crate) fn sentinel(key: Key, level: usize) -> Self {
        Self {
            key,
            value: None,
            level: AtomicUsize::new(level),
            next: (0..level).map(|_| Atomic::null()).collect(),
        }
    }

    pub(crate) fn level(&self) -> usize {
        self.level.load(Ordering::Relaxed)
    }

    pub(crate) fn set_level(&self, level: usize) {
        debug_assert!(level >= 1 && level <= self.next.len());
        self.level.store(level, Ordering::Relaxed);
    }
}

/// Draws a node height from a geometric distribution with parameter 1/2,
/// capped at `max_level`, using the branch-free trailing-zero-count
/// formulation (counting trailing ones on a masked random word is equivalent
/// and avoids a `while rng.gen_ratio(..)` loop on the hot insert path).
pub(crate) fn random_level(random_word: u32, max_level: usize) -> usize {
    debug_assert!(max_level >= 1 && max_level <= MAX_LEVEL);
    let top_bit = 1u32 << (max_level - 1);
    let level = 1 + (random_word | top_bit).trailing_zeros() as usize;
    level.min(max_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_level_is_capped() {
        for w in [0u32, u32::MAX, 0xAAAA_AAAA, 0x5555_5555] {
            let level = random_level(w, 12);
            assert!((1..=12).contains(&level));
        }
    }

    #[test]
    fn random_level_all_ones_gives_max() {
        assert_eq!(random_level(u32::MAX, 12), 12);
    }

    #[test]
    fn random_level_zero_gives_one() {
        assert_eq!(random_level(0, 12), 1);
    }

    #[test]
    fn new_node_has_requested_level() {
        let node = Node::new(5u64, "v", 4);
        assert_eq!(node.level(), 4);
        assert_eq!(node.value, Some("v"));
    }

    #[test]
    fn set_level_lowers_effective_height() {
        let node = Node::new(5u64, "v", 4);
        node.set_level(1);
        assert_eq!(node.level(), 1);
        assert_eq!(node.next.len(), 4);
    }

    #[test]
    fn sentinel_has_no_value() {
        let node: Node<&str> = Node::sentinel(0, 8);
        assert_eq!(node.value, None);
    }
}
