//! An in-process, in-memory key/value table backed by a digest trie.
//!
//! Keys are reduced to an 8-nibble digest and descended through fan-out-16
//! index nodes; entries that share a digest prefix live together in a
//! linear bucket chain until the chain grows past a configurable threshold
//! and gets promoted into a deeper index node. See [`DigestTrie`] for the
//! public surface.
//!
//! ```
//! use digest_trie::DigestTrie;
//!
//! let mut trie = DigestTrie::new();
//! trie.store(b"hello", b"world", 0).unwrap();
//! assert_eq!(trie.fetch(b"hello").unwrap().content, b"world");
//! ```
//!
//! This type is single-threaded: there is no internal locking, and callers
//! sharing one `DigestTrie` across threads must synchronize externally.

#![warn(missing_docs)]

mod bucket;
mod digest;
mod error;
mod index;
mod iter;
mod record;
mod stats;
mod trie;

pub use error::TrieError;
pub use stats::Stats;
pub use trie::{DigestTrie, Entry, StoreOutcome, DEFAULT_MAX_BUCKETS, DEFAULT_REINDEX_SCATTER};
