//! Property tests over randomized sequences of store/fetch/remove operations.

use digest_trie::{DigestTrie, StoreOutcome};
use proptest::collection::vec;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Store(Vec<u8>, Vec<u8>, u8),
    Remove(Vec<u8>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let key = vec(0u8..4, 1..3); // small alphabet, short keys: forces collisions and reindexing
    prop_oneof![
        (key.clone(), vec(any::<u8>(), 0..16), any::<u8>())
            .prop_map(|(k, v, f)| Op::Store(k, v, f)),
        key.prop_map(Op::Remove),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A model `HashMap` kept alongside the trie must agree on every fetch,
    /// after every operation in the sequence, regardless of how many
    /// reindexes the trie performs internally.
    #[test]
    fn matches_a_reference_hash_map(ops in vec(op_strategy(), 0..300)) {
        use std::collections::HashMap;

        let mut trie = DigestTrie::with_capacity_policy(4, 1);
        let mut model: HashMap<Vec<u8>, (Vec<u8>, u8)> = HashMap::new();

        for op in ops {
            match op {
                Op::Store(k, v, f) => {
                    let outcome = trie.store(&k, &v, f).unwrap();
                    let expected = if model.contains_key(&k) {
                        StoreOutcome::Replaced
                    } else {
                        StoreOutcome::Added
                    };
                    prop_assert_eq!(outcome, expected);
                    model.insert(k, (v, f));
                }
                Op::Remove(k) => {
                    let removed = trie.remove(&k);
                    prop_assert_eq!(removed, model.remove(&k).is_some());
                }
            }

            prop_assert_eq!(trie.len(), model.len());
            for (k, (v, f)) in &model {
                let entry = trie.fetch(k).expect("key present in model must be present in trie");
                prop_assert_eq!(entry.content, v.as_slice());
                prop_assert_eq!(entry.flags, *f);
            }
        }
    }

    /// `first_key`/`next_key` must visit every live key exactly once,
    /// independent of how the table was built up.
    #[test]
    fn traversal_visits_every_live_key_exactly_once(ops in vec(op_strategy(), 0..200)) {
        use std::collections::{HashMap, HashSet};

        let mut trie = DigestTrie::with_capacity_policy(4, 1);
        let mut model: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();

        for op in ops {
            match op {
                Op::Store(k, v, f) => { trie.store(&k, &v, f).unwrap(); model.insert(k, v); }
                Op::Remove(k) => { trie.remove(&k); model.remove(&k); }
            }
        }

        let mut visited = HashSet::new();
        let mut cur = trie.first_key().map(|k| k.to_vec());
        while let Some(k) = cur {
            prop_assert!(visited.insert(k.clone()), "key visited twice during traversal");
            cur = trie.next_key(&k).map(|k| k.to_vec());
        }

        let expected: HashSet<Vec<u8>> = model.keys().cloned().collect();
        prop_assert_eq!(visited, expected);
    }

    /// Stats never go negative and `num_keys` always equals the fetchable population.
    #[test]
    fn stats_track_population_consistently(ops in vec(op_strategy(), 0..200)) {
        let mut trie = DigestTrie::with_capacity_policy(4, 1);
        let mut expected_keys = std::collections::HashSet::new();

        for op in ops {
            match op {
                Op::Store(k, v, f) => {
                    trie.store(&k, &v, f).unwrap();
                    expected_keys.insert(k);
                }
                Op::Remove(k) => {
                    trie.remove(&k);
                    expected_keys.remove(&k);
                }
            }
            prop_assert_eq!(trie.stats().num_keys, expected_keys.len());
            prop_assert_eq!(trie.len(), expected_keys.len());
        }
    }

    /// No chain above the terminal depth (7) may exceed `max_buckets +
    /// reindex_scatter` buckets — a regression that silently disables
    /// reindexing would let a chain grow past this bound undetected by the
    /// other property tests, which only check population, not shape.
    #[test]
    fn no_chain_above_terminal_depth_exceeds_the_widened_threshold(
        ops in vec(op_strategy(), 0..300),
        max_buckets in 1usize..8,
        reindex_scatter in 1usize..8,
    ) {
        let mut trie = DigestTrie::with_capacity_policy(max_buckets, reindex_scatter);
        for op in ops {
            match op {
                Op::Store(k, v, f) => { trie.store(&k, &v, f).unwrap(); }
                Op::Remove(k) => { trie.remove(&k); }
            }
        }

        let threshold = max_buckets + reindex_scatter;
        for (depth, len) in trie.chain_lengths() {
            if depth < 7 {
                prop_assert!(
                    len <= threshold,
                    "chain at depth {} has {} buckets, exceeding max_buckets ({}) + reindex_scatter ({})",
                    depth, len, max_buckets, reindex_scatter
                );
            }
        }
    }
}
