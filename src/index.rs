//! The trie's branching node: a fixed fan-out-16 array of slots.
//!
//! Every non-empty slot holds exactly one of the two `Tag` shapes described
//! in the core design — a deeper [`IndexNode`] or a [`Bucket`] chain head —
//! never both, which is why [`Slot`] is a plain sum type rather than a
//! tagged struct with a discriminant byte: the enum variant *is* the tag.

use crate::bucket::Bucket;

/// Number of child slots per index node — one per nibble value.
pub(crate) const FAN_OUT: usize = 16;

/// One of the 16 cells in an [`IndexNode`].
pub(crate) enum Slot {
    /// No entry reachable through this slot.
    Empty,
    /// A deeper branching node.
    Index(Box<IndexNode>),
    /// The head of a bucket chain sharing the digest prefix that selects this slot.
    Chain(Box<Bucket>),
}

/// A fan-out-16 branching node in the trie.
///
/// Created at root initialization or by a reindex; never destroyed except
/// by dropping the owning [`crate::DigestTrie`] (or a `clear`/`clear_slice`
/// releasing the subtree it roots).
pub(crate) struct IndexNode {
    pub(crate) slots: [Slot; FAN_OUT],
}

impl IndexNode {
    /// A freshly allocated node with all 16 slots empty.
    pub(crate) fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::Empty),
        }
    }
}
