//! Error types for pqcheck-primitives crate.

/// Errors that can occur in the harness primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An operand has the wrong number of packed words for the declared dimensions.
    #[error("{operand} length mismatch: expected {expected} words, got {actual}")]
    DimensionMismatch {
        /// Which operand was rejected.
        operand: &'static str,
        /// Expected length in words.
        expected: usize,
        /// Actual length in words.
        actual: usize,
    },

    /// A bit coordinate lies outside the matrix or vector.
    #[error("Bit index out of range: {index} >= {limit}")]
    BitOutOfRange {
        /// Requested index.
        index: usize,
        /// Exclusive upper bound.
        limit: usize,
    },

    /// A guarded buffer was asked for a layout it cannot represent.
    #[error("Invalid guard layout: {0}")]
    InvalidGuardLayout(String),
}

/// Result type alias for pqcheck-primitives operations.
pub type Result<T> = std::result::Result<T, Error>;
