//! Memory accounting for the trie.
//!
//! Every allocation updates one of these counters; every release updates it
//! in the opposite direction. There is no periodic recomputation pass —
//! `Stats` is always exactly current.

use std::fmt;

/// Live memory accounting for a [`crate::DigestTrie`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of buckets reachable from the root.
    pub num_keys: usize,
    /// Bytes of [`crate::index::IndexNode`]s currently live.
    pub index_size: usize,
    /// Bytes of bucket headers currently live (excludes packed record bytes).
    pub meta_size: usize,
    /// Bytes of packed record regions currently live.
    pub data_size: usize,
}

impl Stats {
    /// Total bytes attributed to this trie across all three categories.
    pub fn total_bytes(&self) -> usize {
        self.index_size + self.meta_size + self.data_size
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ num_keys: {}, index_size: {}, meta_size: {}, data_size: {}, total: {} }}",
            self.num_keys,
            self.index_size,
            self.meta_size,
            self.data_size,
            self.total_bytes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_bytes_sums_all_categories() {
        let stats = Stats {
            num_keys: 3,
            index_size: 10,
            meta_size: 20,
            data_size: 30,
        };
        assert_eq!(stats.total_bytes(), 60);
    }

    #[test]
    fn default_is_all_zero() {
        assert_eq!(Stats::default(), Stats { num_keys: 0, index_size: 0, meta_size: 0, data_size: 0 });
    }
}
