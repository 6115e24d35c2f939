//! The root store: construction, store/fetch/remove, reindex, and clear.
//!
//! This is the ~45% of the core's surface area per the system overview: the
//! public operations that trigger everything else (digesting, descending,
//! reindexing) and own the live [`Stats`].

use crate::bucket::{self, Bucket};
use crate::digest::{digest, DIGEST_LEN};
use crate::error::TrieError;
use crate::index::{IndexNode, Slot, FAN_OUT};
use crate::record::PackedRecord;
use crate::stats::Stats;

/// Default chain-length threshold at which a slot is promoted to a deeper index.
pub const DEFAULT_MAX_BUCKETS: usize = 16;
/// Default additive slack applied to the threshold while redistributing a split chain.
pub const DEFAULT_REINDEX_SCATTER: usize = 1;

/// Outcome of a successful [`DigestTrie::store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The key was not previously present; a new bucket was created.
    Added,
    /// The key was already present; its value was replaced in place.
    Replaced,
}

/// A borrowed view into a stored value, returned by [`DigestTrie::fetch`].
///
/// Valid until the next call on the [`DigestTrie`] that mutates it — the
/// borrow checker enforces this at compile time since `Entry` borrows `&self`.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    /// The flags byte stored alongside the value.
    pub flags: u8,
    /// The stored value bytes.
    pub content: &'a [u8],
}

/// An in-process, in-memory digit-trie of fan-out-16 index nodes over a
/// hashed key digest, with linear bucket chains at the leaves.
///
/// Single-threaded: every method takes `&self` or `&mut self` in the
/// ordinary Rust way and there is no internal locking. Concurrent callers
/// must synchronize externally. Multiple concurrent readers with no writer
/// is not a supported mode at this layer, so the type carries a marker field
/// that opts it out of the auto-derived `Sync` impl — without it, every
/// field here (`IndexNode`, `usize`, `Stats`) is ordinary owned data with no
/// interior mutability, and the compiler would happily let callers share a
/// `DigestTrie` across threads via `Arc` and call `fetch` concurrently. The
/// marker makes that a compile error instead of a silent, unintended
/// capability the doc comment would otherwise be lying about.
pub struct DigestTrie {
    pub(crate) root: IndexNode,
    pub(crate) max_buckets: usize,
    pub(crate) reindex_scatter: usize,
    pub(crate) stats: Stats,
    _not_sync: std::marker::PhantomData<std::cell::Cell<()>>,
}

impl std::fmt::Debug for DigestTrie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestTrie")
            .field("max_buckets", &self.max_buckets)
            .field("reindex_scatter", &self.reindex_scatter)
            .field("stats", &self.stats)
            .finish()
    }
}

impl Default for DigestTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl DigestTrie {
    /// Construct a trie with the default `max_buckets` (16) and
    /// `reindex_scatter` (1).
    pub fn new() -> Self {
        Self::with_capacity_policy(DEFAULT_MAX_BUCKETS, DEFAULT_REINDEX_SCATTER)
    }

    /// Construct a trie with explicit reindex tuning.
    ///
    /// `max_buckets` is clamped to at least 1. `reindex_scatter` is clamped
    /// to at least 1, then reset to 1 if `max_buckets + reindex_scatter`
    /// would exceed 256 (the guard that keeps the widened sub-chain
    /// threshold from ever exceeding a full nibble's possible distribution).
    pub fn with_capacity_policy(max_buckets: usize, reindex_scatter: usize) -> Self {
        let max_buckets = max_buckets.max(1);
        let mut reindex_scatter = reindex_scatter.max(1);
        if max_buckets + reindex_scatter > 256 {
            reindex_scatter = 1;
        }
        let root = IndexNode::new();
        let stats = Stats {
            index_size: std::mem::size_of::<IndexNode>(),
            ..Stats::default()
        };
        Self {
            root,
            max_buckets,
            reindex_scatter,
            stats,
            _not_sync: std::marker::PhantomData,
        }
    }

    /// Current memory and population accounting.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Number of distinct keys currently stored.
    pub fn len(&self) -> usize {
        self.stats.num_keys
    }

    /// Whether the trie currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.stats.num_keys == 0
    }

    /// Store `content` under `key` with an opaque `flags` byte.
    ///
    /// Returns [`StoreOutcome::Added`] for a new key or
    /// [`StoreOutcome::Replaced`] if `key` was already present. Fails
    /// without touching the table if `key` or `content` cannot fit in the
    /// packed record's length fields.
    pub fn store(&mut self, key: &[u8], content: &[u8], flags: u8) -> Result<StoreOutcome, TrieError> {
        let packed = PackedRecord::encode(key, content)?;
        let d = digest(key);
        let outcome = store_rec(
            &mut self.root,
            0,
            &d,
            key,
            packed,
            flags,
            self.max_buckets,
            self.reindex_scatter,
            &mut self.stats,
        );
        tracing::trace!(key_len = key.len(), content_len = content.len(), ?outcome, "store");
        Ok(outcome)
    }

    /// Look up `key`, returning a borrowed view of its flags and content.
    pub fn fetch(&self, key: &[u8]) -> Option<Entry<'_>> {
        let d = digest(key);
        fetch_rec(&self.root, 0, &d, key)
    }

    /// Remove `key`, returning whether it was present.
    ///
    /// If removing the last bucket in a chain empties its slot, the slot is
    /// cleared but the surrounding index node is never contracted.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        let d = digest(key);
        remove_rec(&mut self.root, 0, &d, key, &mut self.stats)
    }

    /// Release the entire trie and reinitialize a fresh, empty root.
    pub fn clear(&mut self) {
        self.root = IndexNode::new();
        self.stats = Stats {
            index_size: std::mem::size_of::<IndexNode>(),
            ..Stats::default()
        };
    }

    /// Release only the subtree reachable from root slot `slice` (masked to
    /// 0..15), leaving the other 15 root slots intact.
    ///
    /// Useful for a coarse-grained partitioned teardown when a caller uses
    /// the top nibble of its own key space as a manual shard.
    pub fn clear_slice(&mut self, slice: u8) {
        let idx = (slice & 0x0F) as usize;
        let (index_size, meta_size, data_size, keys) = subtree_totals(&self.root.slots[idx]);
        self.stats.index_size -= index_size;
        self.stats.meta_size -= meta_size;
        self.stats.data_size -= data_size;
        self.stats.num_keys -= keys;
        self.root.slots[idx] = Slot::Empty;
    }

    /// The depth and length of every bucket chain currently in the table.
    ///
    /// Depth is the number of index-node descents taken to reach the chain
    /// (0 for a chain hanging directly off the root, up to 7 for a chain at
    /// maximum depth). Exposed for diagnostics and for tests that check the
    /// reindex threshold is actually being honored at every depth below the
    /// terminal one.
    pub fn chain_lengths(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        collect_chain_lengths(&self.root, 0, &mut out);
        out
    }
}

fn collect_chain_lengths(node: &IndexNode, depth: usize, out: &mut Vec<(usize, usize)>) {
    for slot in node.slots.iter() {
        match slot {
            Slot::Empty => {}
            Slot::Chain(head) => out.push((depth, bucket::len(head))),
            Slot::Index(child) => collect_chain_lengths(child, depth + 1, out),
        }
    }
}

/// Whether a chain at depth `d` (the digest index used to reach it) is
/// eligible for reindexing. A reindex creates a new index node whose own
/// descent uses `digest[d + 1]`, which only exists while `d + 1 < DIGEST_LEN`
/// — at `d == DIGEST_LEN - 1` the chain is terminal and `max_buckets` is
/// advisory only, per the spec's own resolution of the depth-8 edge case.
#[inline]
fn reindex_eligible(d: usize) -> bool {
    d + 1 < DIGEST_LEN
}

fn store_rec(
    node: &mut IndexNode,
    depth: usize,
    d: &[u8; DIGEST_LEN],
    key: &[u8],
    packed: PackedRecord,
    flags: u8,
    max_buckets: usize,
    reindex_scatter: usize,
    stats: &mut Stats,
) -> StoreOutcome {
    let nib = d[depth] as usize;

    match &mut node.slots[nib] {
        Slot::Empty => {
            stats.meta_size += std::mem::size_of::<Bucket>();
            stats.data_size += packed.len();
            stats.num_keys += 1;
            node.slots[nib] = Slot::Chain(Box::new(Bucket {
                flags,
                record: packed,
                next: None,
            }));
            return StoreOutcome::Added;
        }
        Slot::Index(child) => {
            return store_rec(
                child,
                depth + 1,
                d,
                key,
                packed,
                flags,
                max_buckets,
                reindex_scatter,
                stats,
            );
        }
        Slot::Chain(head) => {
            if let Some(existing) = bucket::find_mut(head, key) {
                stats.data_size -= existing.record.len();
                stats.data_size += packed.len();
                existing.record = packed;
                existing.flags = flags;
                return StoreOutcome::Replaced;
            }
        }
    }

    // Key is new and a chain already lives at this slot.
    let needs_reindex = match &node.slots[nib] {
        Slot::Chain(head) => bucket::len(head) >= max_buckets && reindex_eligible(depth),
        _ => false,
    };
    if needs_reindex {
        reindex_slot(&mut node.slots[nib], depth, max_buckets, reindex_scatter, stats);
        if let Slot::Index(child) = &mut node.slots[nib] {
            return store_rec(
                child,
                depth + 1,
                d,
                key,
                packed,
                flags,
                max_buckets,
                reindex_scatter,
                stats,
            );
        }
        unreachable!("reindex always produces an index slot");
    }

    stats.meta_size += std::mem::size_of::<Bucket>();
    stats.data_size += packed.len();
    stats.num_keys += 1;
    let new_bucket = Box::new(Bucket {
        flags,
        record: packed,
        next: None,
    });
    bucket::prepend(&mut node.slots[nib], new_bucket);
    StoreOutcome::Added
}

fn fetch_rec<'a>(node: &'a IndexNode, depth: usize, d: &[u8; DIGEST_LEN], key: &[u8]) -> Option<Entry<'a>> {
    let nib = d[depth] as usize;
    match &node.slots[nib] {
        Slot::Empty => None,
        Slot::Index(child) => fetch_rec(child, depth + 1, d, key),
        Slot::Chain(head) => bucket::find(head, key).map(|b| Entry {
            flags: b.flags,
            content: b.record.content(),
        }),
    }
}

fn remove_rec(node: &mut IndexNode, depth: usize, d: &[u8; DIGEST_LEN], key: &[u8], stats: &mut Stats) -> bool {
    let nib = d[depth] as usize;
    if matches!(&node.slots[nib], Slot::Index(_)) {
        if let Slot::Index(child) = &mut node.slots[nib] {
            return remove_rec(child, depth + 1, d, key, stats);
        }
    }
    match bucket::remove(&mut node.slots[nib], key) {
        Some(removed) => {
            stats.meta_size -= std::mem::size_of::<Bucket>();
            stats.data_size -= removed.record.len();
            stats.num_keys -= 1;
            tracing::trace!(depth, "remove");
            true
        }
        None => false,
    }
}

/// Promote the saturated chain in `slot` (found at depth `depth`) into a new
/// index node, redistributing its buckets by `digest[depth + 1]`.
///
/// After redistributing, any freshly formed sub-chain whose length exceeds
/// `max_buckets + reindex_scatter` is itself reindexed immediately — the
/// widened acceptance threshold that keeps a clustered digest from thrashing
/// on every subsequent store.
fn reindex_slot(slot: &mut Slot, depth: usize, max_buckets: usize, reindex_scatter: usize, stats: &mut Stats) {
    let previous = std::mem::replace(slot, Slot::Empty);
    let old_head = match previous {
        Slot::Chain(head) => head,
        _ => unreachable!("reindex_slot called on a non-chain slot"),
    };

    let mut new_index = Box::new(IndexNode::new());
    stats.index_size += std::mem::size_of::<IndexNode>();

    let mut cur = Some(old_head);
    while let Some(mut b) = cur {
        cur = b.next.take();
        let kd = digest(b.record.key());
        let nib = kd[depth + 1] as usize;
        bucket::prepend(&mut new_index.slots[nib], b);
    }

    tracing::debug!(depth, "reindex");

    let widened_threshold = max_buckets + reindex_scatter;
    if reindex_eligible(depth + 1) {
        for nib in 0..FAN_OUT {
            let overflowed = matches!(&new_index.slots[nib], Slot::Chain(head) if bucket::len(head) > widened_threshold);
            if overflowed {
                reindex_slot(&mut new_index.slots[nib], depth + 1, max_buckets, reindex_scatter, stats);
            }
        }
    }

    *slot = Slot::Index(new_index);
}

/// Recursively sum the index/meta/data bytes and key count of everything
/// reachable from `slot`, used by [`DigestTrie::clear_slice`].
fn subtree_totals(slot: &Slot) -> (usize, usize, usize, usize) {
    match slot {
        Slot::Empty => (0, 0, 0, 0),
        Slot::Chain(head) => {
            let mut meta = 0;
            let mut data = 0;
            let mut keys = 0;
            let mut cur = Some(head.as_ref());
            while let Some(b) = cur {
                meta += std::mem::size_of::<Bucket>();
                data += b.record.len();
                keys += 1;
                cur = b.next.as_deref();
            }
            (0, meta, data, keys)
        }
        Slot::Index(node) => {
            let mut totals = (std::mem::size_of::<IndexNode>(), 0, 0, 0);
            for child in node.slots.iter() {
                let (i, m, d, k) = subtree_totals(child);
                totals.0 += i;
                totals.1 += m;
                totals.2 += d;
                totals.3 += k;
            }
            totals
        }
    }
}
