//! Error types for the digest-trie core.
//!
//! The core has exactly two failure modes at its boundary: a key/value pair
//! that cannot be represented in the packed record's length fields. There is
//! no broader `Internal(String)` catch-all here, unlike an application-level
//! error enum that aggregates failures from many subsystems — this crate
//! only ever fails in these two ways.

use thiserror::Error;

/// Errors returned by [`crate::DigestTrie::store`].
///
/// Both variants are "structural failure" in the sense of the core's error
/// model: the table is left exactly as it was before the call, because the
/// length check happens before any slot is touched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TrieError {
    /// The key is longer than the 16-bit length field in a packed record can hold.
    #[error("key length {0} exceeds the maximum of 65535 bytes")]
    KeyTooLong(usize),

    /// The content is longer than the 32-bit length field in a packed record can hold.
    #[error("content length {0} exceeds the maximum of 4294967295 bytes")]
    ContentTooLong(usize),
}
