use std::fmt;

const WORD_BITS: usize = u64::BITS as usize;

/// A fixed-length bit vector.
///
/// The packed words are the single source of truth; the dense and sparse views are
/// derived on demand, so both always describe the same bits.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    words: Vec<u64>,
    n_bits: usize,
}

impl Fingerprint {
    pub fn new(n_bits: usize) -> Self {
        Self {
            words: vec![0; n_bits.div_ceil(WORD_BITS)],
            n_bits,
        }
    }

    /// Builds a fingerprint from set bit positions; out-of-range positions are ignored.
    pub fn from_on_bits(n_bits: usize, on_bits: impl IntoIterator<Item = usize>) -> Self {
        let mut fp = Self::new(n_bits);
        for bit in on_bits {
            if bit < n_bits {
                fp.set(bit);
            }
        }
        fp
    }

    pub(crate) fn set(&mut self, bit: usize) {
        self.words[bit / WORD_BITS] |= 1 << (bit % WORD_BITS);
    }

    pub fn contains(&self, bit: usize) -> bool {
        bit < self.n_bits && self.words[bit / WORD_BITS] & (1 << (bit % WORD_BITS)) != 0
    }

    pub fn len(&self) -> usize {
        self.n_bits
    }

    pub fn is_empty(&self) -> bool {
        self.n_bits == 0
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Sparse view: positions of set bits in ascending order.
    pub fn on_bits(&self) -> Vec<usize> {
        let mut bits = Vec::with_capacity(self.count_ones());
        for (w, &word) in self.words.iter().enumerate() {
            let mut rest = word;
            while rest != 0 {
                let offset = rest.trailing_zeros() as usize;
                bits.push(w * WORD_BITS + offset);
                rest &= rest - 1;
            }
        }
        bits
    }

    /// Dense view: one 0/1 byte per bit.
    pub fn to_dense(&self) -> Vec<u8> {
        (0..self.n_bits).map(|bit| self.contains(bit) as u8).collect()
    }

    /// Dense view as classifier features.
    pub fn to_features(&self) -> Vec<f64> {
        (0..self.n_bits)
            .map(|bit| if self.contains(bit) { 1.0 } else { 0.0 })
            .collect()
    }

    /// Tanimoto (Jaccard) similarity. Fingerprints of different lengths, or two empty
    /// fingerprints, have similarity 0.
    pub fn tanimoto(&self, other: &Fingerprint) -> f64 {
        if self.n_bits != other.n_bits {
            return 0.0;
        }
        let (mut both, mut either) = (0u32, 0u32);
        for (a, b) in self.words.iter().zip(&other.words) {
            both += (a & b).count_ones();
            either += (a | b).count_ones();
        }
        if either == 0 {
            0.0
        } else {
            both as f64 / either as f64
        }
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fingerprint")
            .field("n_bits", &self.n_bits)
            .field("on_bits", &self.on_bits())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_and_sparse_views_agree() {
        let fp = Fingerprint::from_on_bits(130, [0, 63, 64, 129, 500]);
        assert_eq!(fp.on_bits(), vec![0, 63, 64, 129]);
        let dense = fp.to_dense();
        assert_eq!(dense.len(), 130);
        let from_dense: Vec<usize> = dense
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| (b == 1).then_some(i))
            .collect();
        assert_eq!(from_dense, fp.on_bits());
        assert_eq!(fp.count_ones(), 4);
    }

    #[test]
    fn tanimoto_is_intersection_over_union() {
        let a = Fingerprint::from_on_bits(64, [1, 2, 3, 4]);
        let b = Fingerprint::from_on_bits(64, [3, 4, 5]);
        assert!((a.tanimoto(&b) - 2.0 / 5.0).abs() < 1e-12);
        assert_eq!(a.tanimoto(&a), 1.0);
    }

    #[test]
    fn tanimoto_edge_cases() {
        let empty = Fingerprint::new(64);
        assert_eq!(empty.tanimoto(&empty), 0.0);
        let short = Fingerprint::from_on_bits(32, [1]);
        let long = Fingerprint::from_on_bits(64, [1]);
        assert_eq!(short.tanimoto(&long), 0.0);
    }
}
