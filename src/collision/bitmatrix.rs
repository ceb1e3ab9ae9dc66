//! Rows of dynamically sized bitsets, used by the grid to mark
//! which collider slots touch which grid columns and rows.

#[derive(Clone, Debug)]
pub(crate) struct BitMatrix {
    entry_size: usize,
    entry_count: usize,
    bits: Vec<u64>,
}

impl BitMatrix {
    pub fn new(bits_per_entry: usize, entry_count: usize) -> Self {
        let entry_size = bits_per_entry / 64 + 1;
        Self {
            entry_size,
            entry_count,
            bits: vec![0; entry_count * entry_size],
        }
    }

    pub fn entry(&self, idx: usize) -> Entry<'_> {
        let start = idx * self.entry_size;
        Entry(&self.bits[start..start + self.entry_size])
    }

    /// Set a bit in an entry.
    ///
    /// # Panics
    /// Panics if either index is outside the matrix.
    pub fn set(&mut self, entry_idx: usize, bit_idx: usize) {
        let start = entry_idx * self.entry_size;
        self.bits[start + bit_idx / 64] |= 1_u64 << (bit_idx % 64);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|b| *b = 0);
    }

    /// Zero every bit and grow entries if they can't hold `new_bits_per_entry` bits.
    /// Never shrinks, so steady-state frames don't reallocate.
    pub fn clear_and_resize(&mut self, new_bits_per_entry: usize) {
        let needed_entry_size = new_bits_per_entry / 64 + 1;
        if needed_entry_size > self.entry_size {
            self.entry_size = needed_entry_size;
            self.bits.clear();
            self.bits.resize(self.entry_size * self.entry_count, 0);
        } else {
            self.clear();
        }
    }
}

/// Anything that can be read as a sequence of 64-bit words.
pub(crate) trait Words {
    fn len(&self) -> usize;
    fn word(&self, idx: usize) -> u64;
}

/// A view into a single entry in a bit matrix.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry<'a>(&'a [u64]);

impl<'a> Entry<'a> {
    pub fn intersection(self, other: Self) -> Intersection<'a> {
        Intersection(self.0, other.0)
    }

    pub fn has(&self, idx: usize) -> bool {
        self.0
            .get(idx / 64)
            .map_or(false, |word| word & (1_u64 << (idx % 64)) != 0)
    }
}

impl<'a> Words for Entry<'a> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn word(&self, idx: usize) -> u64 {
        self.0[idx]
    }
}

/// Bitwise AND of two entries, computed lazily while iterating.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Intersection<'a>(&'a [u64], &'a [u64]);

impl<'a> Intersection<'a> {
    pub fn iter(self) -> SetBits<Self> {
        SetBits::new(self)
    }
}

impl<'a> Words for Intersection<'a> {
    fn len(&self) -> usize {
        self.0.len().min(self.1.len())
    }

    fn word(&self, idx: usize) -> u64 {
        self.0[idx] & self.1[idx]
    }
}

/// Iterator over the indices of set bits, lowest first.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SetBits<W: Words> {
    words: W,
    word_idx: usize,
    // copy each word into the iterator so we can remove bits from it
    // instead of reading from the original bitset every time
    curr_word: u64,
}

impl<W: Words> SetBits<W> {
    fn new(words: W) -> Self {
        let curr_word = if words.len() > 0 { words.word(0) } else { 0 };
        Self {
            words,
            word_idx: 0,
            curr_word,
        }
    }
}

impl<W: Words> Iterator for SetBits<W> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.curr_word != 0 {
                let first_bit_idx = self.curr_word.trailing_zeros();
                self.curr_word ^= 1 << first_bit_idx;
                return Some(self.word_idx * 64 + first_bit_idx as usize);
            }
            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.curr_word = self.words.word(self.word_idx);
        }
    }
}
