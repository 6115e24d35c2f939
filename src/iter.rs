//! Full-table traversal: `first_key` / `next_key`.
//!
//! There is no persistent cursor type in the public API — each call walks
//! from the root. `next_key` does not promise a snapshot-consistent view
//! across interleaved mutation; a key inserted or removed between two calls
//! may or may not appear, same as the source megahash table's own iteration
//! contract.

use crate::bucket::Bucket;
use crate::index::{IndexNode, Slot};
use crate::trie::DigestTrie;

/// Depth-first walk over every bucket reachable from a root index node,
/// low-to-high nibble at each level and head-to-tail within a chain.
pub(crate) struct Cursor<'a> {
    node_stack: Vec<std::slice::Iter<'a, Slot>>,
    chain_cursor: Option<&'a Bucket>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(root: &'a IndexNode) -> Self {
        Self {
            node_stack: vec![root.slots.iter()],
            chain_cursor: None,
        }
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = &'a Bucket;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(b) = self.chain_cursor {
                self.chain_cursor = b.next.as_deref();
                return Some(b);
            }

            let next_slot = match self.node_stack.last_mut() {
                Some(iter) => iter.next(),
                None => return None,
            };

            match next_slot {
                Some(Slot::Empty) => continue,
                Some(Slot::Index(child)) => self.node_stack.push(child.slots.iter()),
                Some(Slot::Chain(head)) => {
                    self.chain_cursor = head.next.as_deref();
                    return Some(head);
                }
                None => {
                    self.node_stack.pop();
                }
            }
        }
    }
}

impl DigestTrie {
    /// The first key in traversal order, or `None` if the trie is empty.
    pub fn first_key(&self) -> Option<&[u8]> {
        Cursor::new(&self.root).next().map(|b| b.record.key())
    }

    /// The key immediately following `previous` in traversal order.
    ///
    /// Returns `None` once `previous` is the last key, or if `previous` is
    /// no longer present (there is no saved cursor to resume from).
    pub fn next_key(&self, previous: &[u8]) -> Option<&[u8]> {
        let mut cursor = Cursor::new(&self.root);
        for b in cursor.by_ref() {
            if b.record.key_eq(previous) {
                return cursor.next().map(|next| next.record.key());
            }
        }
        None
    }
}
