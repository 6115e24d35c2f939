//! A single stored entry, and the singly-linked chain operations over it.
//!
//! A chain is a list of [`Bucket`]s that share a digest prefix. Chains are
//! walked iteratively rather than recursively throughout this module: a
//! chain at maximum trie depth is explicitly allowed to grow unboundedly
//! (see [`crate::trie`]'s reindex eligibility rule), so recursion depth
//! would otherwise track untrusted input size.

use crate::index::Slot;
use crate::record::PackedRecord;

/// One stored entry. Owns its packed record and the rest of the chain.
pub(crate) struct Bucket {
    pub(crate) flags: u8,
    pub(crate) record: PackedRecord,
    pub(crate) next: Option<Box<Bucket>>,
}

/// Find a bucket by key, read-only.
pub(crate) fn find<'a>(head: &'a Bucket, key: &[u8]) -> Option<&'a Bucket> {
    let mut cur = head;
    loop {
        if cur.record.key_eq(key) {
            return Some(cur);
        }
        match cur.next.as_deref() {
            Some(next) => cur = next,
            None => return None,
        }
    }
}

/// Find a bucket by key, mutably — used by store's replace-in-place path.
pub(crate) fn find_mut<'a>(head: &'a mut Bucket, key: &[u8]) -> Option<&'a mut Bucket> {
    let mut cur = head;
    loop {
        if cur.record.key_eq(key) {
            return Some(cur);
        }
        match cur.next.as_deref_mut() {
            Some(next) => cur = next,
            None => return None,
        }
    }
}

/// Number of buckets in the chain headed at `head`.
pub(crate) fn len(head: &Bucket) -> usize {
    let mut n = 1;
    let mut cur = head;
    while let Some(next) = cur.next.as_deref() {
        n += 1;
        cur = next;
    }
    n
}

/// Prepend `bucket` to the chain in `slot`, which must be [`Slot::Empty`] or
/// [`Slot::Chain`]. Insertion order within a chain is otherwise unspecified.
pub(crate) fn prepend(slot: &mut Slot, mut bucket: Box<Bucket>) {
    let previous = std::mem::replace(slot, Slot::Empty);
    bucket.next = match previous {
        Slot::Empty => None,
        Slot::Chain(old_head) => Some(old_head),
        Slot::Index(_) => unreachable!("cannot prepend a bucket into an index slot"),
    };
    *slot = Slot::Chain(bucket);
}

/// Unlink the bucket matching `key` from the chain in `slot`, leaving the
/// slot as [`Slot::Chain`] with the remainder or [`Slot::Empty`] if that was
/// the only entry. Returns the removed bucket, with its `next` severed.
pub(crate) fn remove(slot: &mut Slot, key: &[u8]) -> Option<Box<Bucket>> {
    let previous = std::mem::replace(slot, Slot::Empty);
    let head = match previous {
        Slot::Chain(head) => head,
        other => {
            *slot = other;
            return None;
        }
    };

    // Flatten into a vec and rebuild excluding the match, preserving order.
    // Avoids recursion over a chain whose length is caller-controlled.
    let mut nodes = Vec::with_capacity(len(&head));
    let mut cur = Some(head);
    while let Some(mut b) = cur {
        cur = b.next.take();
        nodes.push(b);
    }

    let mut removed = None;
    let mut remaining: Option<Box<Bucket>> = None;
    for mut b in nodes.into_iter().rev() {
        if removed.is_none() && b.record.key_eq(key) {
            removed = Some(b);
            continue;
        }
        b.next = remaining.take();
        remaining = Some(b);
    }

    *slot = match remaining {
        Some(h) => Slot::Chain(h),
        None => Slot::Empty,
    };
    removed
}
