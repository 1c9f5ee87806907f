//! `PriorityQueue<V>`: the public facade over [`crate::skiplist::SkipList`]
//!
//! Mirrors the shape of a storage-engine memtable facade: a thin,
//! `Result`-free wrapper that owns configuration and forwards to the
//! concurrent core, translating `u64` keys but leaving values fully generic.

use crate::skiplist::{SkipList, NUM_LEVELS};
use skipq_core::{Error, Key, Result, SENTINEL_KEYMAX};

/// Tuning knobs for a [`PriorityQueue`].
///
/// `max_offset` is the only thing worth tuning in practice: it trades
/// off tombstone-chasing cost during `delete_min` against how often a
/// head-swing has to walk and free a prefix. `num_levels` and
/// `level_probability` only matter at extreme scale; the defaults (32 levels,
/// p=1/2) are the usual skip list choices and are what the branch-free level
/// draw in [`crate::node::random_level`] assumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipListConfig {
    /// Number of logically-deleted nodes a `delete_min` call will walk past
    /// (cumulatively, across resumed calls) before triggering a head-swing.
    pub max_offset: usize,
    /// Maximum number of forward-pointer levels. Clamped to
    /// [`NUM_LEVELS`].
    pub num_levels: usize,
    /// Denominator of the level-promotion probability, i.e. a node is
    /// promoted to the next level with probability `1 / level_probability`.
    /// Only `2` is supported by the current branch-free level draw; kept as
    /// a field so a future draw function can read it rather than hard-code
    /// it everywhere.
    pub level_probability: u32,
}

impl Default for SkipListConfig {
    fn default() -> Self {
        Self {
            max_offset: 64,
            num_levels: NUM_LEVELS,
            level_probability: 2,
        }
    }
}

/// A lock-free, concurrent priority queue ordered by [`Key`] (ascending:
/// `delete_min` returns the smallest key present).
///
/// `V` is the opaque payload carried alongside each key. It must be `Clone`
/// because `delete_min` and `remove` hand back an owned copy rather than a
/// reference into the list (the node backing it may be concurrently
/// reclaimed the instant another thread wins a race on it), `Send` because
/// nodes cross thread boundaries under concurrent access, and `'static`
/// because nodes may outlive the call that created them, picked up for
/// deferred reclamation by an arbitrary future epoch advance.
pub struct PriorityQueue<V> {
    inner: SkipList<V>,
}

impl<V> PriorityQueue<V> {
    /// Creates an empty queue with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config` is invalid (see [`Self::try_new`]). Use `new` when
    /// the configuration is a compile-time constant you control; use
    /// `try_new` when it comes from user input (e.g. the benchmark CLI).
    pub fn new(config: SkipListConfig) -> Self {
        Self::try_new(config).expect("invalid SkipListConfig")
    }

    /// Fallible counterpart to [`Self::new`].
    pub fn try_new(config: SkipListConfig) -> Result<Self> {
        if config.num_levels == 0 {
            return Err(Error::InvalidConfig(
                "num_levels must be at least 1".to_string(),
            ));
        }
        if config.level_probability < 2 {
            return Err(Error::InvalidConfig(
                "level_probability must be at least 2".to_string(),
            ));
        }
        Ok(Self {
            inner: SkipList::new(config.num_levels, config.max_offset),
        })
    }

    /// Inserts `value` under `key`. Duplicate keys are allowed; all
    /// instances are returned by later `delete_min` calls, which one first
    /// is unspecified.
    ///
    /// # Panics
    ///
    /// Panics if `key` collides with the tail sentinel (see
    /// [`skipq_core::SENTINEL_KEYMAX`]). Use [`Self::try_insert`] when `key`
    /// comes from untrusted input.
    pub fn insert(&self, key: Key, value: V) {
        self.try_insert(key, value)
            .expect("key collides with the tail sentinel");
    }

    /// Fallible counterpart to [`Self::insert`]: rejects `key ==
    /// SENTINEL_KEYMAX` with [`Error::KeyOutOfRange`] instead of panicking.
    pub fn try_insert(&self, key: Key, value: V) -> Result<()> {
        if key >= SENTINEL_KEYMAX {
            return Err(Error::KeyOutOfRange(key));
        }
        self.inner.insert(key, value);
        Ok(())
    }

    /// Removes and returns the entry with the smallest key, or `None` if
    /// the queue is empty.
    pub fn delete_min(&self) -> Option<(Key, V)>
    where
        V: Clone,
    {
        self.inner.delete_min()
    }

    /// Best-effort removal of one entry matching `key`. If multiple entries
    /// share `key`, exactly one is removed; which one is unspecified.
    /// Returns `None` if no live entry with that key was found at the time
    /// of the search — under concurrent mutation this is inherently racy
    /// (the entry may be inserted or removed by another thread immediately
    /// after this call observes the list).
    pub fn remove(&self, key: Key) -> Option<V>
    where
        V: Clone,
    {
        self.inner.remove(key)
    }

    /// Approximate number of live entries. Exact in the absence of
    /// concurrent mutation; otherwise a snapshot that may be stale by the
    /// time it's read.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let config = SkipListConfig::default();
        assert!(config.max_offset > 0);
        assert!(config.num_levels <= NUM_LEVELS);
        assert_eq!(config.level_probability, 2);
    }

    #[test]
    fn try_new_rejects_zero_levels() {
        let config = SkipListConfig {
            num_levels: 0,
            ..SkipListConfig::default()
        };
        let result: Result<PriorityQueue<u64>> = PriorityQueue::try_new(config);
        assert!(result.is_err());
    }

    #[test]
    fn empty_queue_reports_empty() {
        let pq: PriorityQueue<u64> = PriorityQueue::new(SkipListConfig::default());
        assert!(pq.is_empty());
        assert_eq!(pq.len(), 0);
        assert_eq!(pq.delete_min(), None);
    }

    #[test]
    fn insert_and_drain_respects_order() {
        let pq = PriorityQueue::new(SkipListConfig::default());
        for k in [42, 1, 7, 100, 3] {
            pq.insert(k, k.to_string());
        }
        assert_eq!(pq.len(), 5);

        let mut drained = Vec::new();
        while let Some((k, _)) = pq.delete_min() {
            drained.push(k);
        }
        assert_eq!(drained, vec![1, 3, 7, 42, 100]);
        assert!(pq.is_empty());
    }

    #[test]
    fn remove_then_len_reflects_it() {
        let pq = PriorityQueue::new(SkipListConfig::default());
        pq.insert(1, "a");
        pq.insert(2, "b");
        assert_eq!(pq.remove(1), Some("a"));
        assert_eq!(pq.len(), 1);
        assert_eq!(pq.delete_min(), Some((2, "b")));
    }

    #[test]
    fn try_insert_rejects_sentinel_key() {
        let pq = PriorityQueue::new(SkipListConfig::default());
        let result = pq.try_insert(u64::MAX, "nope");
        assert!(matches!(result, Err(Error::KeyOutOfRange(k)) if k == u64::MAX));
    }

    #[test]
    fn custom_config_with_small_max_offset() {
        let config = SkipListConfig {
            max_offset: 2,
            num_levels: 8,
            level_probability: 2,
        };
        let pq = PriorityQueue::new(config);
        for k in 0..50u64 {
            pq.insert(k, k);
        }
        let mut count = 0;
        while pq.delete_min().is_some() {
            count += 1;
        }
        assert_eq!(count, 50);
    }
}
