//! Epoch-bound node allocation
//!
//! Wraps `crossbeam_epoch`'s pin/guard/deferred-destroy protocol with
//! per-level bookkeeping: one conceptual pool per node level (a node of
//! level `L` needs `L` forward pointers, so its allocation
//! cost scales with `L`). `crossbeam_epoch` already amortises the underlying
//! heap allocation and batches deferred frees per epoch, so this layer adds
//! counters for observability rather than a second free-list on top of it —
//! duplicating crossbeam's pooling here would just be two allocators
//! fighting over the same memory.

use crate::node::{Node, MAX_LEVEL};
use crossbeam::epoch::{self, Guard, Owned, Shared};
use skipq_core::Key;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-level allocation/free counters, indexed by `level - 1`.
pub(crate) struct LevelPools {
    allocated: [AtomicU64; MAX_LEVEL],
    freed: [AtomicU64; MAX_LEVEL],
}

impl LevelPools {
    pub(crate) fn new() -> Self {
        Self {
            allocated: std::array::from_fn(|_| AtomicU64::new(0)),
            freed: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    /// Pins the calling thread's epoch. The returned `Guard`'s `Drop`
    /// releases the pin, modelled as RAII instead of a paired enter/exit
    /// call.
    pub(crate) fn critical_enter(&self) -> Guard {
        epoch::pin()
    }

    /// Allocates a node of the given level, recording it against that
    /// level's pool.
    pub(crate) fn alloc_node<'g, V>(
        &self,
        key: Key,
        value: V,
        level: usize,
        guard: &'g Guard,
    ) -> Shared<'g, Node<V>> {
        debug_assert!((1..=MAX_LEVEL).contains(&level));
        self.allocated[level - 1].fetch_add(1, Ordering::Relaxed);
        Owned::new(Node::new(key, value, level)).into_shared(guard)
    }

    /// Schedules `node` for reclamation once no thread can still be
    /// traversing it (i.e. once every guard alive at the time of this call
    /// has dropped).
    ///
    /// # Safety
    ///
    /// `node` must have been unlinked from every level of the skip list
    /// before this is called: no live search path may still reach it.
    pub(crate) unsafe fn free_node<V>(&self, guard: &Guard, node: Shared<'_, Node<V>>) {
        let level = node.as_ref().map(Node::level).unwrap_or(1).clamp(1, MAX_LEVEL);
        self.freed[level - 1].fetch_add(1, Ordering::Relaxed);
        guard.defer_destroy(node);
    }

    /// Total nodes ever allocated, across all levels. Exposed for the
    /// benchmark harness's diagnostics and for stress-test assertions.
    #[cfg(test)]
    pub(crate) fn total_allocated(&self) -> u64 {
        self.allocated.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    #[cfg(test)]
    pub(crate) fn total_freed(&self) -> u64 {
        self.freed.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_free_counters_track_level() {
        let pools = LevelPools::new();
        let guard = pools.critical_enter();

        let n1 = pools.alloc_node(1, "a", 3, &guard);
        let n2 = pools.alloc_node(2, "b", 5, &guard);
        assert_eq!(pools.total_allocated(), 2);
        assert_eq!(pools.total_freed(), 0);

        unsafe {
            pools.free_node(&guard, n1);
            pools.free_node(&guard, n2);
        }
        assert_eq!(pools.total_freed(), 2);
    }
}
