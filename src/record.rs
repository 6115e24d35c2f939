//! Packed record layout: a single-allocation encoding of a (key, value) pair.
//!
//! ```text
//! [ keyLength : 2 bytes, host byte order ]
//! [ key       : keyLength bytes          ]
//! [ contentLength : 4 bytes, host byte order ]
//! [ content   : contentLength bytes      ]
//! ```
//!
//! The single allocation is load-bearing: per-entry overhead is the
//! [`crate::bucket::Bucket`] header plus exactly one heap allocation,
//! independent of key or value size. Replacing this with per-field owned
//! sub-allocations would change the `meta_size`/`data_size` accounting
//! semantics described in [`crate::stats::Stats`].

use crate::error::TrieError;

/// A key and value packed into one contiguous byte region.
pub(crate) struct PackedRecord(Box<[u8]>);

impl PackedRecord {
    /// Encode `key` and `content` into a new packed record.
    ///
    /// Fails if `key` or `content` cannot be represented in the 16-bit /
    /// 32-bit length fields respectively.
    pub(crate) fn encode(key: &[u8], content: &[u8]) -> Result<Self, TrieError> {
        let key_len: u16 = key
            .len()
            .try_into()
            .map_err(|_| TrieError::KeyTooLong(key.len()))?;
        let content_len: u32 = content
            .len()
            .try_into()
            .map_err(|_| TrieError::ContentTooLong(content.len()))?;

        let mut buf = Vec::with_capacity(2 + key.len() + 4 + content.len());
        buf.extend_from_slice(&key_len.to_ne_bytes());
        buf.extend_from_slice(key);
        buf.extend_from_slice(&content_len.to_ne_bytes());
        buf.extend_from_slice(content);
        Ok(Self(buf.into_boxed_slice()))
    }

    #[inline]
    fn key_len(&self) -> usize {
        u16::from_ne_bytes([self.0[0], self.0[1]]) as usize
    }

    #[inline]
    fn content_offset(&self) -> usize {
        2 + self.key_len()
    }

    #[inline]
    fn content_len(&self) -> usize {
        let off = self.content_offset();
        u32::from_ne_bytes([self.0[off], self.0[off + 1], self.0[off + 2], self.0[off + 3]])
            as usize
    }

    /// The stored key bytes.
    pub(crate) fn key(&self) -> &[u8] {
        &self.0[2..2 + self.key_len()]
    }

    /// The stored content bytes.
    pub(crate) fn content(&self) -> &[u8] {
        let off = self.content_offset() + 4;
        &self.0[off..off + self.content_len()]
    }

    /// Whether this record's key matches `key` byte-for-byte.
    pub(crate) fn key_eq(&self, key: &[u8]) -> bool {
        self.key_len() == key.len() && self.key() == key
    }

    /// Total size of the packed region in bytes, for `data_size` accounting.
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_key_and_content() {
        let rec = PackedRecord::encode(b"foo", b"bar").unwrap();
        assert_eq!(rec.key(), b"foo");
        assert_eq!(rec.content(), b"bar");
        assert!(rec.key_eq(b"foo"));
        assert!(!rec.key_eq(b"fo"));
    }

    #[test]
    fn empty_key_and_content_are_valid() {
        let rec = PackedRecord::encode(b"", b"").unwrap();
        assert_eq!(rec.key(), b"");
        assert_eq!(rec.content(), b"");
        assert_eq!(rec.len(), 2 + 4);
    }

    #[test]
    fn key_longer_than_u16_is_rejected() {
        let huge_key = vec![0u8; u16::MAX as usize + 1];
        let err = PackedRecord::encode(&huge_key, b"").unwrap_err();
        assert_eq!(err, TrieError::KeyTooLong(huge_key.len()));
    }

    #[test]
    fn len_accounts_for_full_layout() {
        let rec = PackedRecord::encode(b"abcd", b"xyz").unwrap();
        assert_eq!(rec.len(), 2 + 4 + 4 + 3);
    }
}
