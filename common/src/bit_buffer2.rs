//! Bit-packed 2D buffer for binary masks.
//!
//! Every row starts on a fresh `u64` word so row scans and the separable
//! dilation passes can work a word at a time. Padding bits past `width` in
//! the last word of a row are always zero.

use std::ops::Index;

/// Number of bits per storage word.
const BITS_PER_WORD: usize = 64;

/// A 2D buffer storing boolean values packed as bits, row-aligned to words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer2 {
    words: Vec<u64>,
    width: usize,
    height: usize,
    words_per_row: usize,
}

impl BitBuffer2 {
    /// Create a new bit buffer filled with the given value.
    pub fn new_filled(width: usize, height: usize, value: bool) -> Self {
        let words_per_row = width.div_ceil(BITS_PER_WORD);
        let mut buf = Self {
            words: vec![0u64; words_per_row * height],
            width,
            height,
            words_per_row,
        };
        if value {
            buf.fill(true);
        }
        buf
    }

    /// Create a new bit buffer from a row-major slice of booleans.
    ///
    /// The slice length must equal `width * height`.
    pub fn from_slice(width: usize, height: usize, data: &[bool]) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "data length {} does not match dimensions {}x{}={}",
            data.len(),
            width,
            height,
            width * height
        );

        let mut buf = Self::new_filled(width, height, false);
        for (i, &value) in data.iter().enumerate() {
            if value {
                buf.set_xy(i % width, i / width, true);
            }
        }
        buf
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of `u64` words backing a single row.
    #[inline]
    pub fn words_per_row(&self) -> usize {
        self.words_per_row
    }

    #[inline]
    pub fn get_xy(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        let word = self.words[y * self.words_per_row + x / BITS_PER_WORD];
        (word >> (x % BITS_PER_WORD)) & 1 != 0
    }

    #[inline]
    pub fn set_xy(&mut self, x: usize, y: usize, value: bool) {
        debug_assert!(x < self.width && y < self.height);
        let word = &mut self.words[y * self.words_per_row + x / BITS_PER_WORD];
        let bit = 1u64 << (x % BITS_PER_WORD);
        if value {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    /// Fill all bits with the given value, keeping row padding clear.
    pub fn fill(&mut self, value: bool) {
        if !value {
            self.words.fill(0);
            return;
        }
        let tail = self.tail_mask();
        for row in self.words.chunks_mut(self.words_per_row.max(1)) {
            row.fill(!0u64);
            if let Some(last) = row.last_mut() {
                *last &= tail;
            }
        }
    }

    /// Mask of the valid bits in the last word of each row.
    #[inline]
    pub fn tail_mask(&self) -> u64 {
        match self.width % BITS_PER_WORD {
            0 => !0u64,
            bits => (1u64 << bits) - 1,
        }
    }

    /// Word storage, `words_per_row` words per row, bits in LSB order.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    #[inline]
    pub fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }

    /// Words of row `y`.
    #[inline]
    pub fn row_words(&self, y: usize) -> &[u64] {
        let start = y * self.words_per_row;
        &self.words[start..start + self.words_per_row]
    }

    /// Count the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

/// Index by (x, y) coordinates.
impl Index<(usize, usize)> for BitBuffer2 {
    type Output = bool;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        if self.get_xy(x, y) { &true } else { &false }
    }
}
