//! A lock-free, concurrent priority queue backed by a skip list
//!
//! This crate implements a skip-list priority queue in the style of Linden &
//! Jonsson: a concurrent skip list that supports
//!
//! - Lock-free `insert` and `delete_min` using compare-and-swap
//! - Logical deletion via low-bit pointer marking on the bottom level
//! - Epoch-based memory reclamation (via `crossbeam_epoch`), so marked nodes
//!   are only physically freed once no thread can still be traversing them
//! - Bulk physical unlinking ("head-swing"): instead of unlinking every
//!   deleted node individually, a deleter that has accumulated enough
//!   logically-deleted nodes swings the head pointer past the whole run in
//!   one atomic step per level
//!
//! # Architecture
//!
//! ```text
//! tagged        — mark/unmark/is_marked over crossbeam_epoch's tag bits
//! epoch_alloc   — critical-section + per-level node allocation bookkeeping
//! node          — the skip list node type
//! skiplist      — insert / delete_min / remove / head_swing_cleanup
//! queue         — PriorityQueue<V> facade + SkipListConfig
//! ```
//!
//! # Example
//!
//! ```
//! use skipq_skiplist::{PriorityQueue, SkipListConfig};
//!
//! let pq = PriorityQueue::<&'static str>::new(SkipListConfig::default());
//! pq.insert(5, "five");
//! pq.insert(3, "three");
//! pq.insert(7, "seven");
//!
//! assert_eq!(pq.delete_min(), Some((3, "three")));
//! assert_eq!(pq.delete_min(), Some((5, "five")));
//! assert_eq!(pq.delete_min(), Some((7, "seven")));
//! assert_eq!(pq.delete_min(), None);
//! ```
//!
//! # Non-goals
//!
//! Ordered iteration, range queries, strongly-guaranteed deletion by
//! arbitrary key (`remove` is best-effort), persistence, and cross-process
//! sharing are all out of scope.

mod epoch_alloc;
mod node;
mod queue;
mod skiplist;
mod tagged;

pub use queue::{PriorityQueue, SkipListConfig};
pub use skiplist::NUM_LEVELS;
