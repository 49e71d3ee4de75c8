//! Random simulation signatures.
//!
//! Every node carries a [`Signature`]: its value under [`SIM_WORDS`] × 32
//! pseudo-random input assignments. Signatures are an approximate functional
//! fingerprint: nodes with different signatures are certainly different, nodes
//! with equal signatures are only *candidates* for equivalence.
//!
//! # Normalization
//!
//! A signature is stored so that bit 0 of word 0 is always 0. If the raw
//! vector has that bit set, every word is flipped and `inverted` is recorded.
//! A node and its complement therefore share the same stored words and the
//! same hash, which is what lets the functional table detect
//! complementary equivalences.

use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Number of 32-bit simulation words per node.
pub const SIM_WORDS: usize = 127;

/// One distinct prime per word index, used to mix words into the hash.
pub const PRIMES: [u32; SIM_WORDS] = [
    1009, 1013, 1019, 1021, 1031, 1033, 1039, 1049, 1051, 1061, //
    1063, 1069, 1087, 1091, 1093, 1097, 1103, 1109, 1117, 1123, //
    1129, 1151, 1153, 1163, 1171, 1181, 1187, 1193, 1201, 1213, //
    1217, 1223, 1229, 1231, 1237, 1249, 1259, 1277, 1279, 1283, //
    1289, 1291, 1297, 1301, 1303, 1307, 1319, 1321, 1327, 1361, //
    1367, 1373, 1381, 1399, 1409, 1423, 1427, 1429, 1433, 1439, //
    1447, 1451, 1453, 1459, 1471, 1481, 1483, 1487, 1489, 1493, //
    1499, 1511, 1523, 1531, 1543, 1549, 1553, 1559, 1567, 1571, //
    1579, 1583, 1597, 1601, 1607, 1609, 1613, 1619, 1621, 1627, //
    1637, 1657, 1663, 1667, 1669, 1693, 1697, 1699, 1709, 1721, //
    1723, 1733, 1741, 1747, 1753, 1759, 1777, 1783, 1787, 1789, //
    1801, 1811, 1823, 1831, 1847, 1861, 1867, 1871, 1873, 1877, //
    1879, 1889, 1901, 1907, 1913, 1931, 1933,
];

/// Wrapping sum of `words[i] * PRIMES[i]`.
pub fn signature_hash(words: &[u32]) -> u32 {
    words
        .iter()
        .zip(PRIMES.iter())
        .fold(0u32, |acc, (&w, &p)| acc.wrapping_add(w.wrapping_mul(p)))
}

/// Normalized simulation vector of a node.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    words: Box<[u32]>,
    hash: u32,
    inverted: bool,
}

impl Signature {
    /// Normalize a raw simulation vector.
    pub fn from_raw(mut words: Box<[u32]>) -> Self {
        assert_eq!(words.len(), SIM_WORDS, "Signature must have {} words", SIM_WORDS);
        let inverted = words[0] & 1 == 1;
        if inverted {
            for w in words.iter_mut() {
                *w = !*w;
            }
        }
        let hash = signature_hash(&words);
        Self { words, hash, inverted }
    }

    /// Signature of the constant-true function.
    pub fn constant() -> Self {
        Self::from_raw(vec![u32::MAX; SIM_WORDS].into_boxed_slice())
    }

    /// Stored (normalized) words.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Word `i` of the function seen through an edge with polarity `complemented`.
    #[inline]
    pub fn word(&self, i: usize, complemented: bool) -> u32 {
        let w = self.words[i];
        if self.inverted ^ complemented {
            !w
        } else {
            w
        }
    }

    /// Value of the node (not normalized) under simulation pattern `k`.
    pub fn value(&self, k: usize) -> bool {
        (self.word(k / 32, false) >> (k % 32)) & 1 == 1
    }

    /// Exact comparison of the normalized vectors, ignoring orientation.
    pub fn same_class(&self, other: &Signature) -> bool {
        self.hash == other.hash && self.words == other.words
    }

    /// Whether the two signatures agree when `other` is seen with `phase`.
    pub fn agrees_with(&self, other: &Signature, phase: bool) -> bool {
        self.same_class(other) && (self.inverted ^ other.inverted) == phase
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("word0", &format_args!("{:#010x}", self.words[0]))
            .field("hash", &format_args!("{:#010x}", self.hash))
            .field("inverted", &self.inverted)
            .finish()
    }
}

/// Source of input vectors and evaluator of AND signatures.
pub struct Simulator {
    rng: SmallRng,
}

impl Simulator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Fresh independent random vector for a primary input.
    pub fn random(&mut self) -> Signature {
        let words: Box<[u32]> = (0..SIM_WORDS).map(|_| self.rng.gen::<u32>()).collect();
        Signature::from_raw(words)
    }

    /// Signature of `a & b`, each child seen through its edge polarity.
    pub fn and(&self, a: &Signature, a_compl: bool, b: &Signature, b_compl: bool) -> Signature {
        let words: Box<[u32]> = (0..SIM_WORDS)
            .map(|i| a.word(i, a_compl) & b.word(i, b_compl))
            .collect();
        Signature::from_raw(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::is_prime;

    #[test]
    fn test_prime_table() {
        for (i, &p) in PRIMES.iter().enumerate() {
            assert!(is_prime(p as usize), "{} is not prime", p);
            assert!(!PRIMES[..i].contains(&p), "{} is repeated", p);
        }
    }

    #[test]
    fn test_normalized() {
        let mut sim = Simulator::new(1);
        for _ in 0..20 {
            let s = sim.random();
            assert_eq!(s.words()[0] & 1, 0);
        }
        let c = Signature::constant();
        assert!(c.is_inverted());
        assert!(c.words().iter().all(|&w| w == 0));
        assert!(c.value(0));
        assert!(c.value(SIM_WORDS * 32 - 1));
    }

    #[test]
    fn test_complement_shares_class() {
        let mut sim = Simulator::new(7);
        let x = sim.random();
        let y = sim.random();
        let f = sim.and(&x, false, &y, true);
        let nf_words: Box<[u32]> = (0..SIM_WORDS).map(|i| !f.word(i, false)).collect();
        let nf = Signature::from_raw(nf_words);
        assert!(f.same_class(&nf));
        assert!(f.agrees_with(&nf, true));
        assert!(!f.agrees_with(&nf, false));
        assert_eq!(f.hash(), nf.hash());
    }

    #[test]
    fn test_and_semantics() {
        let mut sim = Simulator::new(3);
        let x = sim.random();
        let y = sim.random();
        let f = sim.and(&x, true, &y, false);
        for k in 0..SIM_WORDS * 32 {
            assert_eq!(f.value(k), !x.value(k) && y.value(k));
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let a = Simulator::new(42).random();
        let b = Simulator::new(42).random();
        let c = Simulator::new(43).random();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
