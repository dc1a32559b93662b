//! Systematic syndrome computation.
//!
//! The parity-check matrix is `H = [I | D]` with an implicit identity block
//! of `syndrome_bits` columns and an explicit dense block `D` of
//! `syndrome_bits` rows by `dense_bits` columns. For an input vector
//! `e = (e_low, e_high)`, the syndrome is `e_low ^ D * e_high`.
//!
//! The memory-access pattern depends only on the dimensions, never on the
//! input bits: every row of `D` is read in full, the per-row product is
//! folded to a parity bit with shifts, and the bit is merged into the output
//! with an unconditional XOR.

use super::{PackedBits, WORD_BITS, Word, parity, tail_mask, words_for};
use crate::error::{Error, Result};
use tracing::instrument;
use zeroize::Zeroizing;

/// Computes `output = input_low ^ D * input_high` over GF(2).
///
/// - `matrix` holds `D` row-major, `syndrome_bits` rows of
///   `words_for(dense_bits)` words each. Padding bits are ignored.
/// - `input` holds the low segment in its first `words_for(syndrome_bits)`
///   words and the high segment in the following `words_for(dense_bits)` words.
/// - `output` receives `words_for(syndrome_bits)` words; padding bits are cleared.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] if any slice length disagrees with
/// the declared dimensions. Lengths are public, so this check leaks nothing
/// about the input bits.
#[instrument(level = "debug", skip(output, matrix, input))]
pub fn compute_syndrome(
    output: &mut [Word],
    matrix: &[Word],
    input: &[Word],
    syndrome_bits: usize,
    dense_bits: usize,
) -> Result<()> {
    let syndrome_words = words_for(syndrome_bits);
    let row_words = words_for(dense_bits);
    check_len("syndrome", syndrome_words, output.len())?;
    check_len("input vector", syndrome_words + row_words, input.len())?;
    let matrix_words = syndrome_bits.checked_mul(row_words).ok_or(Error::DimensionMismatch {
        operand: "parity-check matrix",
        expected: usize::MAX,
        actual: matrix.len(),
    })?;
    check_len("parity-check matrix", matrix_words, matrix.len())?;

    let (low, high) = input.split_at(syndrome_words);
    let mut high = Zeroizing::new(high.to_vec());
    if let Some(last) = high.last_mut() {
        *last &= tail_mask(dense_bits);
    }

    // Identity block: a plain copy of the low segment.
    output.copy_from_slice(low);
    if let Some(last) = output.last_mut() {
        *last &= tail_mask(syndrome_bits);
    }

    if row_words == 0 {
        return Ok(());
    }

    for (row_index, row) in matrix.chunks_exact(row_words).enumerate() {
        let product = row.iter().zip(high.iter()).fold(0, |acc, (m, e)| acc ^ (m & e));
        output[row_index / WORD_BITS] ^= parity(product) << (row_index % WORD_BITS);
    }

    Ok(())
}

fn check_len(operand: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::DimensionMismatch { operand, expected, actual });
    }
    Ok(())
}

/// Systematic parity-check matrix `[I | D]` storing only the dense block.
#[derive(Clone, PartialEq, Eq)]
pub struct SystematicMatrix {
    syndrome_bits: usize,
    dense_bits: usize,
    dense: Vec<Word>,
}

impl std::fmt::Debug for SystematicMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystematicMatrix")
            .field("syndrome_bits", &self.syndrome_bits)
            .field("dense_bits", &self.dense_bits)
            .finish_non_exhaustive()
    }
}

impl SystematicMatrix {
    /// Matrix whose dense block is all zero.
    #[must_use]
    pub fn zeros(syndrome_bits: usize, dense_bits: usize) -> Self {
        Self { syndrome_bits, dense_bits, dense: vec![0; syndrome_bits * words_for(dense_bits)] }
    }

    /// Builds a matrix from a row-major packed dense block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `dense` is not
    /// `syndrome_bits * words_for(dense_bits)` words long.
    pub fn from_dense_words(
        syndrome_bits: usize,
        dense_bits: usize,
        mut dense: Vec<Word>,
    ) -> Result<Self> {
        let row_words = words_for(dense_bits);
        check_len("parity-check matrix", syndrome_bits * row_words, dense.len())?;
        if row_words > 0 {
            let mask = tail_mask(dense_bits);
            for row in dense.chunks_exact_mut(row_words) {
                if let Some(last) = row.last_mut() {
                    *last &= mask;
                }
            }
        }
        Ok(Self { syndrome_bits, dense_bits, dense })
    }

    /// Rows of the matrix, equal to the syndrome width.
    #[must_use]
    pub fn syndrome_bits(&self) -> usize {
        self.syndrome_bits
    }

    /// Columns of the dense block.
    #[must_use]
    pub fn dense_bits(&self) -> usize {
        self.dense_bits
    }

    /// Packed dense block, row-major.
    #[must_use]
    pub fn dense_words(&self) -> &[Word] {
        &self.dense
    }

    /// Words expected in an input vector for [`Self::syndrome`].
    #[must_use]
    pub fn input_words(&self) -> usize {
        words_for(self.syndrome_bits) + words_for(self.dense_bits)
    }

    /// Sets entry `(row, col)` of the dense block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BitOutOfRange`] if the coordinate is outside the block.
    pub fn set(&mut self, row: usize, col: usize, value: bool) -> Result<()> {
        let index = self.index(row, col)?;
        let mask: Word = 1 << (col % WORD_BITS);
        let word = &mut self.dense[index];
        *word = (*word & !mask) | (Word::from(value) << (col % WORD_BITS));
        Ok(())
    }

    /// Reads entry `(row, col)` of the dense block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BitOutOfRange`] if the coordinate is outside the block.
    pub fn get(&self, row: usize, col: usize) -> Result<bool> {
        let index = self.index(row, col)?;
        Ok((self.dense[index] >> (col % WORD_BITS)) & 1 == 1)
    }

    /// Syndrome of a word-aligned input vector (see [`compute_syndrome`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `input` has the wrong length.
    pub fn syndrome(&self, input: &[Word]) -> Result<PackedBits> {
        let mut words = Zeroizing::new(vec![0; words_for(self.syndrome_bits)]);
        compute_syndrome(&mut words, &self.dense, input, self.syndrome_bits, self.dense_bits)?;
        PackedBits::from_words(self.syndrome_bits, std::mem::take(&mut *words))
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.syndrome_bits {
            return Err(Error::BitOutOfRange { index: row, limit: self.syndrome_bits });
        }
        if col >= self.dense_bits {
            return Err(Error::BitOutOfRange { index: col, limit: self.dense_bits });
        }
        Ok(row * words_for(self.dense_bits) + col / WORD_BITS)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dense_width_returns_low_segment() {
        let low = [0xdead_beef_u64, 0x1234];
        let mut out = [0u64; 2];
        compute_syndrome(&mut out, &[], &low, 128, 0).unwrap();
        assert_eq!(out, low);
    }

    #[test]
    fn test_zero_input_gives_zero_syndrome() {
        let mut matrix = SystematicMatrix::zeros(10, 70);
        for r in 0..10 {
            matrix.set(r, (r * 7) % 70, true).unwrap();
        }
        let input = vec![0; matrix.input_words()];
        assert_eq!(matrix.syndrome(&input).unwrap().weight(), 0);
    }

    #[test]
    fn test_single_high_bit_selects_matrix_column() {
        // D = [[1,0,1],[0,1,1]]
        let mut matrix = SystematicMatrix::zeros(2, 3);
        matrix.set(0, 0, true).unwrap();
        matrix.set(0, 2, true).unwrap();
        matrix.set(1, 1, true).unwrap();
        matrix.set(1, 2, true).unwrap();

        // e_low = 0, e_high = column 2 selected
        let syndrome = matrix.syndrome(&[0, 0b100]).unwrap();
        assert_eq!(syndrome.words(), &[0b11]);

        // e_high = columns 0 and 2: row0 = 1^1 = 0, row1 = 0^1 = 1
        let syndrome = matrix.syndrome(&[0, 0b101]).unwrap();
        assert_eq!(syndrome.words(), &[0b10]);
    }

    #[test]
    fn test_low_segment_folds_through_identity() {
        let mut matrix = SystematicMatrix::zeros(2, 3);
        matrix.set(0, 0, true).unwrap();
        let syndrome = matrix.syndrome(&[0b01, 0b001]).unwrap();
        assert_eq!(syndrome.words(), &[0b00]);
        let syndrome = matrix.syndrome(&[0b10, 0b001]).unwrap();
        assert_eq!(syndrome.words(), &[0b11]);
    }

    #[test]
    fn test_padding_bits_ignored() {
        let mut matrix = SystematicMatrix::zeros(3, 5);
        matrix.set(2, 4, true).unwrap();
        let clean = matrix.syndrome(&[0, 0b1_0000]).unwrap();
        let noisy = matrix.syndrome(&[!0b111, !0b1_1111 | 0b1_0000]).unwrap();
        assert_eq!(clean, noisy);
        assert_eq!(clean.words(), &[0b100]);
    }

    #[test]
    fn test_multi_word_rows() {
        let mut matrix = SystematicMatrix::zeros(65, 130);
        matrix.set(64, 129, true).unwrap();
        matrix.set(64, 0, true).unwrap();
        let mut high = PackedBits::zeros(130);
        high.set(129, true).unwrap();
        let input = PackedBits::concat_aligned(&PackedBits::zeros(65), &high);
        let syndrome = matrix.syndrome(&input).unwrap();
        assert_eq!(syndrome.weight(), 1);
        assert!(syndrome.get(64).unwrap());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut out = [0u64; 1];
        let err = compute_syndrome(&mut out, &[0; 3], &[0; 1], 3, 10).unwrap_err();
        assert_eq!(err, Error::DimensionMismatch { operand: "input vector", expected: 2, actual: 1 });

        let err = compute_syndrome(&mut out, &[0; 2], &[0; 2], 3, 10).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch { operand: "parity-check matrix", expected: 3, actual: 2 }
        );

        let mut wide = [0u64; 2];
        assert!(compute_syndrome(&mut wide, &[0; 3], &[0; 2], 3, 10).is_err());
    }

    #[test]
    fn test_from_dense_words_masks_row_padding() {
        let matrix = SystematicMatrix::from_dense_words(2, 3, vec![Word::MAX, 0b010]).unwrap();
        assert_eq!(matrix.dense_words(), &[0b111, 0b010]);
        assert!(matrix.get(1, 1).unwrap());
        assert!(matrix.get(2, 0).is_err());
        assert!(matrix.get(0, 3).is_err());
    }
}
