// engine/draft-engine/src/bitset.rs

/// Word-packed bitset with fast forward scans. Length is in bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitset {
    words: Box<[u64]>,
    len_bits: usize,
}

impl Bitset {
    /// Allocate a zeroed bitset with `len_bits` bits.
    pub fn with_len(len_bits: usize) -> Self {
        let nwords = (len_bits + 63) >> 6;
        Self { words: vec![0u64; nwords].into_boxed_slice(), len_bits }
    }

    #[inline]
    pub fn len_bits(&self) -> usize {
        self.len_bits
    }
    #[inline]
    fn check(&self, i: usize) {
        assert!(i < self.len_bits, "bit index {i} OOB");
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    pub fn set(&mut self, i: usize) {
        self.check(i);
        self.words[i >> 6] |= 1u64 << (i & 63);
    }
    #[inline]
    pub fn clear(&mut self, i: usize) {
        self.check(i);
        self.words[i >> 6] &= !(1u64 << (i & 63));
    }
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        self.check(i);
        ((self.words[i >> 6] >> (i & 63)) & 1) != 0
    }

    /// Next set bit at or after `i`.
    pub fn next_one_at_or_after(&self, i: usize) -> Option<usize> {
        if i >= self.len_bits {
            return None;
        }
        let mut w = i >> 6;
        let bits = self.words[w] & (!0u64 << (i & 63));
        if bits != 0 {
            let idx = (w << 6) + bits.trailing_zeros() as usize;
            return (idx < self.len_bits).then_some(idx);
        }
        w += 1;
        while w < self.words.len() {
            let v = self.words[w];
            if v != 0 {
                let idx = (w << 6) + v.trailing_zeros() as usize;
                return (idx < self.len_bits).then_some(idx);
            }
            w += 1;
        }
        None
    }

    /// Set bits at or after `start`, ascending.
    pub fn ones_from(&self, start: usize) -> impl Iterator<Item = usize> + '_ {
        let mut next = self.next_one_at_or_after(start);
        core::iter::from_fn(move || {
            let cur = next?;
            next = self.next_one_at_or_after(cur + 1);
            Some(cur)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear_across_boundaries() {
        let mut bs = Bitset::with_len(130);
        assert!(bs.is_empty());
        for &i in &[0usize, 63, 64, 65, 127, 128, 129] {
            bs.set(i);
            assert!(bs.get(i));
        }
        assert_eq!(bs.count_ones(), 7);
        for &i in &[0usize, 63, 64, 65, 127, 128, 129] {
            bs.clear(i);
            assert!(!bs.get(i));
        }
        assert!(bs.is_empty());
    }

    #[test]
    fn next_one_at_or_after_works() {
        let mut bs = Bitset::with_len(130);
        for &i in &[3usize, 63, 64, 90, 129] {
            bs.set(i);
        }
        assert_eq!(bs.next_one_at_or_after(0), Some(3));
        assert_eq!(bs.next_one_at_or_after(3), Some(3));
        assert_eq!(bs.next_one_at_or_after(4), Some(63));
        assert_eq!(bs.next_one_at_or_after(65), Some(90));
        assert_eq!(bs.next_one_at_or_after(128), Some(129));
        assert_eq!(bs.next_one_at_or_after(130), None);
    }

    #[test]
    fn ones_from_walks_ascending() {
        let mut bs = Bitset::with_len(200);
        for &i in &[5usize, 64, 65, 199] {
            bs.set(i);
        }
        assert_eq!(bs.ones_from(0).collect::<Vec<_>>(), vec![5, 64, 65, 199]);
        assert_eq!(bs.ones_from(65).collect::<Vec<_>>(), vec![65, 199]);
        assert_eq!(bs.ones_from(200).count(), 0);
    }

    #[test]
    fn zero_length_is_always_empty() {
        let bs = Bitset::with_len(0);
        assert!(bs.is_empty());
        assert_eq!(bs.next_one_at_or_after(0), None);
    }
}
