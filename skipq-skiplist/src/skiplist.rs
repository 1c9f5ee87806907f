//! The concurrent skip list: insertion, logical deletion, and head-swing
//! reclamation
//!
//! This is the core of the crate. Three ideas make it lock-free:
//!
//! - **Bottom-up commit**: `insert` links the new node at level 0 first, via
//!   a single CAS. That CAS is the linearisation point; everything above
//!   level 0 is a best-effort accelerator that may lag.
//! - **Logical deletion by marking, not unlinking**: `delete_min` never
//!   rewires pointers to remove its victim. It marks an edge, and the node
//!   the marked edge used to point at is handed back to the caller. The
//!   marking node itself becomes a permanent tombstone until reclaimed.
//! - **Bulk reclamation via head-swing**: rather than have every deleter
//!   unlink its own tombstone (more CAS traffic, more contention on the
//!   chain's front), one thread that has observed enough accumulated
//!   tombstones swings `head.next[*]` directly past the whole run in a
//!   single CAS per level, then hands the skipped prefix to the epoch
//!   allocator for deferred reclamation.

use crate::epoch_alloc::LevelPools;
use crate::node::{random_level, Node};
use crate::tagged;
use crossbeam::epoch::{self, Guard, Shared};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skipq_core::{Key, SENTINEL_KEYMAX};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{fence, AtomicUsize, Ordering};

/// Maximum number of skip list levels.
pub const NUM_LEVELS: usize = 32;

/// Number of failed orphan-placement hops before refreshing the search
/// position via [`SkipList::weak_search_head`]. A progress heuristic only —
/// correctness does not depend on its exact value.
const ORPHAN_REFRESH_INTERVAL: u32 = 10;

/// Per-thread, per-list resume state for `delete_min`.
///
/// Keyed by the owning list's address rather than carried as an explicit
/// handle, so the external API stays a plain `delete_min(&self)` call; the
/// tradeoff is that an entry here outlives the list it was recorded against
/// until the thread records a fresh entry at the same address (acceptable:
/// stale entries are self-healing, since the `obs_hp` comparison on the next
/// call will simply miss and reset to `head`).
///
/// `obs_hp`'s address and tag are kept only to be compared as a value — never
/// dereferenced — against a freshly-loaded `head.next[0]`, as a cheap check
/// for whether a head-swing has run since this state was recorded. The
/// resume position itself is never cached as a raw pointer: a guard dropped
/// at the end of the previous call gives no liveness guarantee for the next
/// one, so a cache hit re-locates the resume point by re-running `find` on
/// `last_key` under the new call's own guard, rather than reconstructing a
/// `Shared` from a stored address.
struct ResumeState {
    last_key: Key,
    obs_hp_addr: usize,
    obs_hp_tag: usize,
    offset: usize,
}

thread_local! {
    static RESUME: RefCell<HashMap<usize, ResumeState>> = RefCell::new(HashMap::new());
}

pub(crate) struct SkipList<V> {
    head: crossbeam::epoch::Atomic<Node<V>>,
    #[allow(dead_code)] // kept as the canonical tail handle for future range support
    tail: crossbeam::epoch::Atomic<Node<V>>,
    num_levels: usize,
    max_offset: usize,
    size: AtomicUsize,
    pools: LevelPools,
    rng: Mutex<StdRng>,
}

impl<V> SkipList<V> {
    pub(crate) fn new(num_levels: usize, max_offset: usize) -> Self {
        let num_levels = num_levels.clamp(1, NUM_LEVELS);
        let guard = &epoch::pin();

        let tail_shared = crossbeam::epoch::Owned::new(Node::sentinel(SENTINEL_KEYMAX, num_levels))
            .into_shared(guard);

        let head_node = Node::sentinel(0, num_levels);
        for level in 0..num_levels {
            head_node.next[level].store(tail_shared, Ordering::Relaxed);
        }
        let head_shared = crossbeam::epoch::Owned::new(head_node).into_shared(guard);

        Self {
            head: crossbeam::epoch::Atomic::from(head_shared),
            tail: crossbeam::epoch::Atomic::from(tail_shared),
            num_levels,
            max_offset,
            size: AtomicUsize::new(0),
            pools: LevelPools::new(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    fn instance_id(&self) -> usize {
        self as *const Self as usize
    }

    fn draw_level(&self) -> usize {
        let word: u32 = self.rng.lock().gen();
        random_level(word, self.num_levels)
    }

    /// Populates `preds`/`succs` for every level. Does not help unlink
    /// marked nodes — it is
    /// "weak" in exactly that sense. `before` selects the stop condition:
    /// `false` stops at the first node with key `> key` (insert's variant,
    /// landing after any existing duplicates); `true` stops at the first
    /// node with key `>= key` (remove's variant, landing immediately before
    /// an exact match).
    fn find<'g>(
        &self,
        key: Key,
        before: bool,
        preds: &mut [Shared<'g, Node<V>>],
        succs: &mut [Shared<'g, Node<V>>],
        guard: &'g Guard,
    ) {
        let mut pred = self.head.load(Ordering::Acquire, guard);
        for level in (0..self.num_levels).rev() {
            let mut curr =
                tagged::unmarked(unsafe { pred.deref() }.next[level].load(Ordering::Acquire, guard));
            loop {
                let curr_ref = unsafe { curr.deref() };
                let stop = if before {
                    curr_ref.key >= key
                } else {
                    curr_ref.key > key
                };
                if stop {
                    break;
                }
                pred = curr;
                curr = tagged::unmarked(curr_ref.next[level].load(Ordering::Acquire, guard));
            }
            preds[level] = pred;
            succs[level] = curr;
        }
    }

    /// Walks down from the top level, following logically-deleted nodes, to
    /// find the current logical start of the list for the orphan-placement
    /// loop to resume from.
    fn weak_search_head<'g>(&self, guard: &'g Guard) -> Shared<'g, Node<V>> {
        let mut x = self.head.load(Ordering::Acquire, guard);
        let mut x_next = x;
        for level in (0..self.num_levels).rev() {
            loop {
                x_next = tagged::unmarked(unsafe { x.deref() }.next[level].load(Ordering::Acquire, guard));
                let next_ref = unsafe { x_next.deref() };
                if next_ref.key == SENTINEL_KEYMAX {
                    break;
                }
                if !tagged::is_marked(next_ref.next[0].load(Ordering::Acquire, guard)) {
                    break;
                }
                x = x_next;
            }
        }
        x_next
    }

    pub(crate) fn insert(&self, key: Key, value: V) {
        debug_assert!(
            key < SENTINEL_KEYMAX,
            "key {key} collides with the tail sentinel"
        );
        let guard = &self.pools.critical_enter();
        let level = self.draw_level();
        let new_node = self.pools.alloc_node(key, value, level, guard);

        let mut preds: Vec<Shared<'_, Node<V>>> = vec![Shared::null(); self.num_levels];
        let mut succs: Vec<Shared<'_, Node<V>>> = vec![Shared::null(); self.num_levels];

        loop {
            self.find(key, false, &mut preds, &mut succs, guard);
            let succ0 = succs[0];
            let new_ref = unsafe { new_node.deref() };
            for (i, succ) in succs.iter().enumerate().take(level) {
                new_ref.next[i].store(*succ, Ordering::Relaxed);
            }
            // Publish the fully initialised node before it becomes reachable.
            fence(Ordering::Release);

            let pred0 = unsafe { preds[0].deref() };
            match pred0.next[0].compare_exchange(
                succ0,
                new_node,
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(_) => break,
                Err(e) => {
                    if tagged::is_marked(e.current) {
                        // The predecessor is logically deleted; the node
                        // cannot land at its intended spot.
                        self.orphan_place(new_node, tagged::unmarked(e.current), guard);
                        self.size.fetch_add(1, Ordering::Relaxed);
                        return;
                    }
                    // Competing insert landed first; re-search and retry.
                    continue;
                }
            }
        }

        self.size.fetch_add(1, Ordering::Relaxed);
        self.link_upper_levels(new_node, key, level, &mut preds, &mut succs, guard);
    }

    /// Orphan-placement loop: `n` could not be linked at its intended spot
    /// because that predecessor was itself logically deleted. `n` is
    /// demoted to the bottom level only and spliced in at the first live
    /// edge found while walking forward from `start`.
    fn orphan_place<'g>(
        &self,
        new_node: Shared<'g, Node<V>>,
        start: Shared<'g, Node<V>>,
        guard: &'g Guard,
    ) {
        let new_ref = unsafe { new_node.deref() };
        new_ref.set_level(1);

        let mut x = start;
        let mut hops: u32 = 0;
        loop {
            if hops > ORPHAN_REFRESH_INTERVAL {
                x = self.weak_search_head(guard);
                hops = 0;
            }
            let x_ref = unsafe { tagged::unmarked(x).deref() };
            if x_ref.key == SENTINEL_KEYMAX {
                // A stale hop can land on the tail; restart from the
                // current logical head rather than splicing after it.
                x = self.weak_search_head(guard);
                hops = 0;
                continue;
            }
            let x_next = x_ref.next[0].load(Ordering::Acquire, guard);
            if !tagged::is_marked(x_next) {
                // The marker travels on the preceding pointer, so this
                // edge is live. Try to squeeze in here.
                new_ref.next[0].store(x_next, Ordering::Relaxed);
                if x_ref
                    .next[0]
                    .compare_exchange(x_next, new_node, Ordering::AcqRel, Ordering::Acquire, guard)
                    .is_ok()
                {
                    return;
                }
            }
            hops += 1;
            x = tagged::unmarked(x_next);
        }
    }

    /// Upper-level linking. The bottom-level CAS already linearised the
    /// insert; everything here is best-effort acceleration. If linking
    /// stops early, the node's recorded height is lowered to the levels
    /// actually wired in, so readers never follow a forward pointer that
    /// was staged during insertion but never published into a chain.
    fn link_upper_levels<'g>(
        &self,
        new_node: Shared<'g, Node<V>>,
        key: Key,
        level: usize,
        preds: &mut [Shared<'g, Node<V>>],
        succs: &mut [Shared<'g, Node<V>>],
        guard: &'g Guard,
    ) {
        let new_ref = unsafe { new_node.deref() };
        let mut i = 1;
        while i < level {
            // Tolerates allocators that recycle node slots.
            if new_ref.key != key {
                break;
            }

            // Ensure the node's own forward pointer is up to date before
            // splicing the predecessor onto it.
            let succ = succs[i];
            let new_next = new_ref.next[i].load(Ordering::Acquire, guard);
            if new_next != succ {
                match new_ref.next[i].compare_exchange(
                    new_next,
                    succ,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                    guard,
                ) {
                    Ok(_) => {}
                    Err(e) => {
                        if tagged::is_marked(e.current) {
                            // Somebody is deleting the node out from under
                            // us; it is committed at the levels it reached.
                            break;
                        }
                        continue;
                    }
                }
            }

            let pred_ref = unsafe { preds[i].deref() };
            if pred_ref
                .next[i]
                .compare_exchange(succ, new_node, Ordering::AcqRel, Ordering::Acquire, guard)
                .is_ok()
            {
                i += 1;
                continue;
            }

            // Losing the predecessor CAS needs an up-to-date view before
            // deciding whether the node has been deleted in the meantime.
            fence(Ordering::Acquire);
            if tagged::is_marked(new_ref.next[0].load(Ordering::Acquire, guard)) || new_ref.key != key
            {
                break;
            }
            self.find(key, false, preds, succs, guard);
            let pred_now = unsafe { preds[i].deref() };
            if tagged::unmarked(pred_now.next[i].load(Ordering::Acquire, guard)) == new_node {
                // Already reachable at this level.
                i += 1;
            }
        }
        new_ref.set_level(i.min(level).max(1));
    }

    /// Looks up a resume position for the current `delete_min` call.
    ///
    /// `current_hp` is `head.next[0]`, freshly loaded this call under
    /// `guard`. If it matches the `obs_hp` recorded by the previous call on
    /// this thread (meaning no head-swing has run since), the resume point
    /// is re-located by running a live, guard-scoped `find` on the
    /// previously returned key, rather than reconstructing a `Shared` from
    /// a pointer address cached across the two calls' separate guards. A
    /// guard dropped at the end of the previous call gives no liveness
    /// guarantee for the next one — only a traversal performed entirely
    /// within the current guard does, and `find` is exactly that.
    fn resume_lookup<'g>(
        &self,
        current_hp: Shared<'g, Node<V>>,
        guard: &'g Guard,
    ) -> (Shared<'g, Node<V>>, usize) {
        let id = self.instance_id();
        let cached = RESUME.with(|cell| {
            cell.borrow().get(&id).and_then(|state| {
                let cached_hp =
                    Shared::from(state.obs_hp_addr as *const Node<V>).with_tag(state.obs_hp_tag);
                (cached_hp == current_hp).then_some((state.last_key, state.offset))
            })
        });

        let Some((last_key, offset)) = cached else {
            return (self.head.load(Ordering::Acquire, guard), 0);
        };

        let mut preds: Vec<Shared<'_, Node<V>>> = vec![Shared::null(); self.num_levels];
        let mut succs: Vec<Shared<'_, Node<V>>> = vec![Shared::null(); self.num_levels];
        self.find(last_key, true, &mut preds, &mut succs, guard);
        (succs[0], offset)
    }

    fn resume_store(&self, last_key: Key, obs_hp: Shared<'_, Node<V>>, offset: usize) {
        let id = self.instance_id();
        RESUME.with(|cell| {
            cell.borrow_mut().insert(
                id,
                ResumeState {
                    last_key,
                    obs_hp_addr: obs_hp.as_raw() as usize,
                    obs_hp_tag: obs_hp.tag(),
                    offset,
                },
            );
        });
    }

    fn resume_clear(&self) {
        let id = self.instance_id();
        RESUME.with(|cell| {
            cell.borrow_mut().remove(&id);
        });
    }

    pub(crate) fn delete_min(&self) -> Option<(Key, V)>
    where
        V: Clone,
    {
        let guard = &self.pools.critical_enter();
        let head = self.head.load(Ordering::Acquire, guard);
        let obs_hp = unsafe { head.deref() }.next[0].load(Ordering::Acquire, guard);
        let (mut x, mut total_offset) = self.resume_lookup(obs_hp, guard);

        let victim;
        let mut hop_count = 0usize;
        loop {
            hop_count += 1;
            let x_ref = unsafe { tagged::unmarked(x).deref() };
            if x_ref.key == SENTINEL_KEYMAX {
                self.resume_clear();
                return None;
            }

            // Bulk-deleted regions can be skipped two levels up: if the
            // level-2 successor's outgoing edge is already marked, jump
            // straight past it.
            #[cfg(feature = "level2_shortcut")]
            if x_ref.level() > 2 {
                let two_ahead = tagged::unmarked(x_ref.next[2].load(Ordering::Acquire, guard));
                let jump = unsafe { two_ahead.deref() }.next[0].load(Ordering::Acquire, guard);
                if tagged::is_marked(jump) {
                    x = tagged::unmarked(jump);
                    continue;
                }
            }

            let x_next = x_ref.next[0].load(Ordering::Acquire, guard);
            if unsafe { tagged::unmarked(x_next).deref() }.key == SENTINEL_KEYMAX {
                self.resume_clear();
                return None;
            }
            if tagged::is_marked(x_next) {
                x = tagged::unmarked(x_next);
                continue;
            }

            match x_ref.next[0].compare_exchange(
                x_next,
                tagged::mark(x_next),
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(_) => {
                    victim = x_next;
                    break;
                }
                Err(e) => {
                    if tagged::is_marked(e.current) {
                        x = tagged::unmarked(e.current);
                    }
                    continue;
                }
            }
        }

        let victim_ref = unsafe { victim.deref() };
        let key = victim_ref.key;
        let value = victim_ref
            .value
            .clone()
            .expect("a node reachable as a delete_min victim always carries a value");

        total_offset += hop_count;
        self.resume_store(key, obs_hp, total_offset);
        self.size.fetch_sub(1, Ordering::Relaxed);

        if total_offset > self.max_offset {
            let current_hp = unsafe { head.deref() }.next[0].load(Ordering::Acquire, guard);
            if current_hp == obs_hp && self.head_swing_cleanup(head, obs_hp, victim, guard) {
                self.resume_store(key, tagged::mark(victim), 0);
            }
        }

        Some((key, value))
    }

    /// From the top level down, walks past every node whose own `next[0]`
    /// is marked, recording the last such node per level. Returns the
    /// highest level that actually needs a head-pointer update.
    fn weak_search_end<'g>(
        &self,
        preds: &mut [Shared<'g, Node<V>>],
        top: Option<usize>,
        guard: &'g Guard,
    ) -> usize {
        let start = top.unwrap_or(self.num_levels - 1);
        let mut lvl = top.unwrap_or(0);
        let mut x = self.head.load(Ordering::Acquire, guard);

        for level in (1..=start).rev() {
            loop {
                let x_next = unsafe { x.deref() }.next[level].load(Ordering::Acquire, guard);
                let next_ref = unsafe { tagged::unmarked(x_next).deref() };
                if !tagged::is_marked(next_ref.next[0].load(Ordering::Acquire, guard)) {
                    break;
                }
                if lvl == 0 {
                    lvl = level;
                }
                x = tagged::unmarked(x_next);
            }
            preds[level] = x;
        }
        lvl
    }

    /// Returns `true` if this call won the level-0 swing. The winner walks
    /// every upper level past the reclaimed prefix, then hands the prefix
    /// to the epoch allocator. If yet another swing replaces `head.next[0]`
    /// while this one is mid-flight, the newer winner owns the upper-level
    /// walk from that point on and the rest of this cleanup is abandoned;
    /// the abandoned prefix stays unreclaimed rather than risking a free
    /// of nodes an upper level can still reach.
    fn head_swing_cleanup<'g>(
        &self,
        head: Shared<'g, Node<V>>,
        old_obs_hp: Shared<'g, Node<V>>,
        victim: Shared<'g, Node<V>>,
        guard: &'g Guard,
    ) -> bool {
        let head_ref = unsafe { head.deref() };
        let target = tagged::mark(victim);

        if head_ref
            .next[0]
            .compare_exchange(old_obs_hp, target, Ordering::AcqRel, Ordering::Acquire, guard)
            .is_err()
        {
            return false;
        }

        // The swing won: every node between the old front and the victim
        // now belongs to this thread.
        let mut preds: Vec<Shared<'_, Node<V>>> = vec![Shared::null(); self.num_levels];
        let top = self.weak_search_end(&mut preds, None, guard);

        for level in (1..=top).rev() {
            loop {
                if head_ref.next[0].load(Ordering::Acquire, guard) != target {
                    return true;
                }
                let current = head_ref.next[level].load(Ordering::Acquire, guard);
                let replacement =
                    unsafe { preds[level].deref() }.next[level].load(Ordering::Acquire, guard);
                if head_ref
                    .next[level]
                    .compare_exchange(current, replacement, Ordering::AcqRel, Ordering::Acquire, guard)
                    .is_ok()
                {
                    break;
                }
                // The front moved under us; re-record the dead prefix from
                // this level down and retry.
                self.weak_search_end(&mut preds, Some(level), guard);
            }
        }

        let mut cursor = tagged::unmarked(old_obs_hp);
        let end = tagged::unmarked(victim);
        while cursor != end {
            let next = tagged::unmarked(unsafe { cursor.deref() }.next[0].load(Ordering::Acquire, guard));
            unsafe {
                self.pools.free_node(guard, cursor);
            }
            cursor = next;
        }
        true
    }

    /// Best-effort removal of a specific key.
    ///
    /// Uses the same marking convention as `delete_min`: the mark lives on
    /// the *predecessor's* outgoing pointer, not on the target node itself,
    /// so removing `candidate` means marking `preds[0]`'s `next[0]` —
    /// exactly the edge `delete_min` would have consumed had it reached
    /// `candidate` first.
    pub(crate) fn remove(&self, key: Key) -> Option<V>
    where
        V: Clone,
    {
        if key >= SENTINEL_KEYMAX {
            // No user key can equal the tail sentinel's.
            return None;
        }
        let guard = &self.pools.critical_enter();
        let mut preds: Vec<Shared<'_, Node<V>>> = vec![Shared::null(); self.num_levels];
        let mut succs: Vec<Shared<'_, Node<V>>> = vec![Shared::null(); self.num_levels];

        loop {
            self.find(key, true, &mut preds, &mut succs, guard);

            let candidate = succs[0];
            let candidate_ref = unsafe { candidate.deref() };
            if candidate_ref.key != key {
                return None;
            }

            let pred_ref = unsafe { preds[0].deref() };
            let current = pred_ref.next[0].load(Ordering::Acquire, guard);
            if tagged::is_marked(current) {
                // preds[0] is itself already a tombstone: someone else's
                // delete_min or remove already claimed this edge.
                return None;
            }
            if tagged::unmarked(current) != candidate {
                // Predecessor moved since find() observed it; retry.
                continue;
            }

            match pred_ref.next[0].compare_exchange(
                current,
                tagged::mark(current),
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(_) => {
                    self.size.fetch_sub(1, Ordering::Relaxed);
                    return candidate_ref.value.clone();
                }
                Err(_) => continue,
            }
        }
    }
}

impl<V> Drop for SkipList<V> {
    fn drop(&mut self) {
        let guard = &epoch::pin();
        let mut curr = tagged::unmarked(self.head.load(Ordering::Acquire, guard));
        while !curr.is_null() {
            let curr_ref = unsafe { curr.deref() };
            let next = tagged::unmarked(curr_ref.next[0].load(Ordering::Acquire, guard));
            unsafe {
                guard.defer_destroy(curr);
            }
            curr = next;
        }
    }
}

// SkipList<V> is Send + Sync whenever V is: every field is either an atomic,
// a Mutex, or a plain counter, and Atomic<Node<V>> requires V: Send + Sync to
// itself be Send + Sync, which is exactly the bound a concurrently-shared
// priority queue needs on its value type.
unsafe impl<V: Send> Send for SkipList<V> {}
unsafe impl<V: Send + Sync> Sync for SkipList<V> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_delete_min_in_order() {
        let list = SkipList::new(NUM_LEVELS, 32);
        list.insert(5, "five");
        list.insert(3, "three");
        list.insert(7, "seven");

        assert_eq!(list.delete_min(), Some((3, "three")));
        assert_eq!(list.delete_min(), Some((5, "five")));
        assert_eq!(list.delete_min(), Some((7, "seven")));
        assert_eq!(list.delete_min(), None);
    }

    #[test]
    fn delete_min_on_empty_queue_returns_none() {
        let list: SkipList<u64> = SkipList::new(NUM_LEVELS, 32);
        assert_eq!(list.delete_min(), None);
        assert_eq!(list.delete_min(), None);
    }

    #[test]
    fn exhausted_queue_accepts_new_inserts() {
        let list = SkipList::new(NUM_LEVELS, 8);
        for k in 0..20u64 {
            list.insert(k, k);
        }
        for k in 0..20u64 {
            assert_eq!(list.delete_min(), Some((k, k)));
        }
        assert_eq!(list.delete_min(), None);
        assert_eq!(list.delete_min(), None);

        list.insert(5, 5);
        assert_eq!(list.delete_min(), Some((5, 5)));
        assert_eq!(list.delete_min(), None);
    }

    #[test]
    fn insert_with_deleted_predecessor_lands_at_front() {
        // Consuming 1..=3 leaves node 2 as a tombstone; re-inserting key 2
        // forces the orphan-placement path, and the new node must still be
        // the next delete_min victim.
        let list = SkipList::new(NUM_LEVELS, 1000);
        for k in 1..=8u64 {
            list.insert(k, k);
        }
        assert_eq!(list.delete_min(), Some((1, 1)));
        assert_eq!(list.delete_min(), Some((2, 2)));
        assert_eq!(list.delete_min(), Some((3, 3)));

        list.insert(2, 2);

        let drained: Vec<u64> = std::iter::from_fn(|| list.delete_min().map(|(k, _)| k)).collect();
        assert_eq!(drained, vec![2, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn remove_existing_key_then_reinsert() {
        let list = SkipList::new(NUM_LEVELS, 32);
        list.insert(10, "ten");
        assert_eq!(list.remove(10), Some("ten"));
        assert_eq!(list.remove(10), None);

        list.insert(10, "ten-again");
        assert_eq!(list.delete_min(), Some((10, "ten-again")));
    }

    #[test]
    fn remove_sentinel_key_is_rejected() {
        let list: SkipList<u64> = SkipList::new(NUM_LEVELS, 32);
        list.insert(1, 1);
        assert_eq!(list.remove(u64::MAX), None);
        assert_eq!(list.len(), 1);
        assert_eq!(list.delete_min(), Some((1, 1)));
    }

    #[test]
    fn remove_missing_key_returns_none() {
        let list: SkipList<u64> = SkipList::new(NUM_LEVELS, 32);
        list.insert(1, 100);
        assert_eq!(list.remove(999), None);
    }

    #[test]
    fn len_tracks_inserts_and_removals() {
        let list = SkipList::new(NUM_LEVELS, 32);
        assert_eq!(list.len(), 0);
        list.insert(1, "a");
        list.insert(2, "b");
        assert_eq!(list.len(), 2);
        list.delete_min();
        assert_eq!(list.len(), 1);
        list.insert(3, "c");
        list.remove(3);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn sorted_drain_after_many_inserts() {
        let list = SkipList::new(NUM_LEVELS, 4);
        let mut keys: Vec<u64> = (0..1000).map(|i| (i * 2654435761u64) % 100_000).collect();
        for &k in &keys {
            list.insert(k, k);
        }
        keys.sort_unstable();

        let mut drained = Vec::new();
        while let Some((k, _)) = list.delete_min() {
            drained.push(k);
        }
        assert_eq!(drained, keys);
    }

    #[test]
    fn head_swing_reclaims_consumed_prefix() {
        let list = SkipList::new(NUM_LEVELS, 4);
        for k in 0..1000u64 {
            list.insert(k, k);
        }
        for _ in 0..100 {
            list.delete_min();
        }
        // A hundred sequential deletes against max_offset = 4 must have
        // triggered repeated head-swings; well over half of the consumed
        // prefix should already be back with the allocator.
        assert_eq!(list.pools.total_allocated(), 1000);
        assert!(
            list.pools.total_freed() >= 50,
            "expected bulk reclamation, freed only {}",
            list.pools.total_freed()
        );

        // All remaining live keys must still drain in sorted order; the
        // head-swing reclamation above must not have corrupted the chain.
        let mut prev: Option<u64> = None;
        let mut count = 0;
        while let Some((k, _)) = list.delete_min() {
            if let Some(p) = prev {
                assert!(k >= p);
            }
            prev = Some(k);
            count += 1;
        }
        assert_eq!(count, 900);
    }

    #[test]
    fn duplicate_keys_all_returned() {
        let list = SkipList::new(NUM_LEVELS, 32);
        list.insert(5, "a");
        list.insert(5, "b");
        list.insert(5, "c");

        let mut values = Vec::new();
        while let Some((k, v)) = list.delete_min() {
            assert_eq!(k, 5);
            values.push(v);
        }
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn concurrent_inserts_all_observable() {
        use std::sync::Arc;
        use std::thread;

        let list = Arc::new(SkipList::new(NUM_LEVELS, 16));
        let mut handles = Vec::new();
        for t in 0..8u64 {
            let list = Arc::clone(&list);
            handles.push(thread::spawn(move || {
                for i in 0..500u64 {
                    list.insert(t * 10_000 + i, (t, i));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(list.len(), 4000);

        let mut drained = Vec::new();
        while let Some((k, _)) = list.delete_min() {
            drained.push(k);
        }
        assert_eq!(drained.len(), 4000);
        for w in drained.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn concurrent_delete_min_single_element_exactly_one_winner() {
        use std::sync::atomic::AtomicUsize;
        use std::sync::Arc;
        use std::thread;

        let list = Arc::new(SkipList::new(NUM_LEVELS, 32));
        list.insert(1, "only");

        let wins = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let list = Arc::clone(&list);
            let wins = Arc::clone(&wins);
            handles.push(thread::spawn(move || {
                if list.delete_min().is_some() {
                    wins.fetch_add(1, Ordering::Relaxed);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(wins.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn concurrent_mixed_workload_preserves_count() {
        use std::sync::atomic::AtomicI64;
        use std::sync::Arc;
        use std::thread;

        let list = Arc::new(SkipList::new(NUM_LEVELS, 8));
        for k in 0..2000u64 {
            list.insert(k, k);
        }
        let removed = Arc::new(AtomicI64::new(0));

        let mut handles = Vec::new();
        for t in 0..4u64 {
            let list = Arc::clone(&list);
            let removed = Arc::clone(&removed);
            handles.push(thread::spawn(move || {
                for i in 0..300u64 {
                    if i % 2 == 0 {
                        list.insert(10_000 + t * 1000 + i, i);
                    } else if list.delete_min().is_some() {
                        removed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let mut drained = 0i64;
        while list.delete_min().is_some() {
            drained += 1;
        }
        let total_inserted = 2000 + 4 * 150; // 150 inserts per thread (half of 300)
        assert_eq!(drained + removed.load(Ordering::Relaxed), total_inserted);
    }
}
