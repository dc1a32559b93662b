#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Binary Linear Algebra over GF(2)
//!
//! Bit-packed vectors and the systematic parity-check product used by
//! code-based encryption schemes to turn a secret error pattern into a
//! public syndrome.
//!
//! Addition is XOR, multiplication is AND. Bit `j` of a packed sequence lives
//! in word `j / 64` at bit position `j % 64`.

mod syndrome;

pub use syndrome::{SystematicMatrix, compute_syndrome};

use crate::error::{Error, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Machine word used for bit packing.
pub type Word = u64;

/// Bits per [`Word`].
pub const WORD_BITS: usize = Word::BITS as usize;

/// Number of words needed to hold `bits` bits.
#[must_use]
pub const fn words_for(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

/// Mask selecting the meaningful bits of the last word of a `bits`-bit sequence.
#[must_use]
pub(crate) const fn tail_mask(bits: usize) -> Word {
    match bits % WORD_BITS {
        0 => Word::MAX,
        rem => (1 << rem) - 1,
    }
}

/// XOR-folds a word down to its parity bit without data-dependent branches.
#[must_use]
pub(crate) const fn parity(mut x: Word) -> Word {
    x ^= x >> 32;
    x ^= x >> 16;
    x ^= x >> 8;
    x ^= x >> 4;
    x ^= x >> 2;
    x ^= x >> 1;
    x & 1
}

/// A fixed-length bit vector packed into [`Word`]s.
///
/// Padding bits past `len()` are always zero. Contents are zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PackedBits {
    bits: usize,
    words: Vec<Word>,
}

impl std::fmt::Debug for PackedBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackedBits").field("bits", &self.bits).finish_non_exhaustive()
    }
}

impl PackedBits {
    /// All-zero vector of `bits` bits.
    #[must_use]
    pub fn zeros(bits: usize) -> Self {
        Self { bits, words: vec![0; words_for(bits)] }
    }

    /// Wraps packed words, clearing any padding bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `words` is not exactly
    /// `words_for(bits)` long.
    pub fn from_words(bits: usize, mut words: Vec<Word>) -> Result<Self> {
        let expected = words_for(bits);
        if words.len() != expected {
            return Err(Error::DimensionMismatch {
                operand: "bit vector",
                expected,
                actual: words.len(),
            });
        }
        if let Some(last) = words.last_mut() {
            *last &= tail_mask(bits);
        }
        Ok(Self { bits, words })
    }

    /// Length in bits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits
    }

    /// Whether the vector has zero length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Packed words.
    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Reads bit `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BitOutOfRange`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        Ok((self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1)
    }

    /// Writes bit `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BitOutOfRange`] if `index >= len()`.
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        self.check_index(index)?;
        let mask = 1 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        *word = (*word & !mask) | (Word::from(value) << (index % WORD_BITS));
        Ok(())
    }

    /// Bitwise sum (XOR) of two vectors of equal length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the lengths differ.
    pub fn xor(&self, other: &Self) -> Result<Self> {
        if self.bits != other.bits {
            return Err(Error::DimensionMismatch {
                operand: "bit vector",
                expected: self.words.len(),
                actual: other.words.len(),
            });
        }
        let words = self.words.iter().zip(&other.words).map(|(a, b)| a ^ b).collect();
        Ok(Self { bits: self.bits, words })
    }

    /// Number of set bits.
    #[must_use]
    pub fn weight(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Concatenates `low` and `high`, each starting on a word boundary.
    ///
    /// This is the input layout expected by [`compute_syndrome`].
    #[must_use]
    pub fn concat_aligned(low: &Self, high: &Self) -> Vec<Word> {
        let mut words = Vec::with_capacity(low.words.len() + high.words.len());
        words.extend_from_slice(&low.words);
        words.extend_from_slice(&high.words);
        words
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.bits {
            return Err(Error::BitOutOfRange { index, limit: self.bits });
        }
        Ok(())
    }
}
