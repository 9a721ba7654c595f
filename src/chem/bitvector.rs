use std::ops::BitOrAssign;

/// A fixed-length vector of bits, packed into 64-bit words.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitVector {
    nbits: usize,
    words: Vec<u64>,
}

impl BitVector {
    pub fn new(nbits: usize) -> Self {
        Self {
            nbits,
            words: vec![0; nbits.div_ceil(64)],
        }
    }

    pub fn len(&self) -> usize {
        self.nbits
    }

    pub fn is_empty(&self) -> bool {
        self.nbits == 0
    }

    /// panics if `idx` is out of bounds
    pub fn set(&mut self, idx: usize) {
        assert!(idx < self.nbits, "bit {idx} out of range for {}", self.nbits);
        self.words[idx / 64] |= 1 << (idx % 64);
    }

    pub fn get(&self, idx: usize) -> bool {
        idx < self.nbits && self.words[idx / 64] & (1 << (idx % 64)) != 0
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// indices of the set bits in increasing order
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.nbits).filter(|&i| self.get(i))
    }

    /// expand into one 0.0 or 1.0 value per bit, like RDKit's
    /// `DataStructs.ConvertToNumpyArray`
    pub fn to_dense(&self) -> Vec<f32> {
        (0..self.nbits)
            .map(|i| if self.get(i) { 1.0 } else { 0.0 })
            .collect()
    }
}

impl BitOrAssign<&BitVector> for BitVector {
    fn bitor_assign(&mut self, rhs: &BitVector) {
        assert_eq!(self.nbits, rhs.nbits);
        for (a, b) in self.words.iter_mut().zip(&rhs.words) {
            *a |= b;
        }
    }
}
