//! Key digest derivation.
//!
//! Every keyed operation starts by reducing the key to a fixed 8-nibble
//! descent path. The hash is DJB2 — fast and simple, not cryptographic and
//! not keyed. Callers with adversarial keys need to key their inputs
//! themselves before handing them to this crate.

/// Number of nibbles in a digest, and the maximum depth of the index trie.
pub(crate) const DIGEST_LEN: usize = 8;

/// A digest: one nibble (0..=15) per trie level.
pub(crate) type Digest = [u8; DIGEST_LEN];

/// Derive the descent path for `key`.
///
/// Computes a 32-bit DJB2 hash (seed 5381, `h = h*33 + byte` modulo 2^32),
/// lays the four hash bytes out in host byte order, then splits each byte
/// into its high nibble (kept in positions 0..3) and low nibble (moved to
/// positions 4..7).
pub(crate) fn digest(key: &[u8]) -> Digest {
    let mut h: u32 = 5381;
    for &b in key {
        h = h.wrapping_mul(33).wrapping_add(b as u32);
    }
    let bytes = h.to_ne_bytes();
    let mut out = [0u8; DIGEST_LEN];
    for i in 0..4 {
        out[i] = bytes[i] >> 4;
        out[4 + i] = bytes[i] & 0x0F;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(digest(b"foo"), digest(b"foo"));
    }

    #[test]
    fn digest_nibbles_are_in_range() {
        for key in [&b""[..], b"a", b"foo", b"a much longer key than the others"] {
            for nibble in digest(key) {
                assert!(nibble <= 0x0F);
            }
        }
    }

    #[test]
    fn empty_key_has_the_djb2_seed_digest() {
        // h stays at the seed 5381 = 0x0000_1505 for an empty key.
        let bytes = 5381u32.to_ne_bytes();
        let mut expected = [0u8; DIGEST_LEN];
        for i in 0..4 {
            expected[i] = bytes[i] >> 4;
            expected[4 + i] = bytes[i] & 0x0F;
        }
        assert_eq!(digest(b""), expected);
    }

    #[test]
    fn different_keys_usually_differ() {
        // Not an invariant (collisions are expected and handled), but a
        // sanity check that the digest isn't degenerate.
        let digests: std::collections::HashSet<_> =
            (0u32..256).map(|i| digest(&i.to_ne_bytes())).collect();
        assert!(digests.len() > 200);
    }
}
