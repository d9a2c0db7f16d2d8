//! Error types for the derivation / interpretation / painting core.
//!
//! Every variant is a caller-side precondition failure. The core returns
//! them at the point of violation and never retries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LsysError {
    #[error("no rule for predecessor '{0}'")]
    MissingRule(char),

    #[error("length mismatch: {what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("predecessor set must be sorted and free of duplicates")]
    UnsortedPredecessors,

    #[error("matrix dimension mismatch: {lhs_rows}x{lhs_cols} * {rhs_rows}x{rhs_cols}")]
    DimensionMismatch {
        lhs_rows: usize,
        lhs_cols: usize,
        rhs_rows: usize,
        rhs_cols: usize,
    },

    #[error("a gradient needs at least two keys")]
    GradientTooShort,

    #[error("discrete gradient key index {index} exceeds the largest palette index {max}")]
    GradientTooLarge { index: u64, max: u32 },

    #[error("no gradient key at slot {0}")]
    NoSuchKey(usize),
}

pub type Result<T> = std::result::Result<T, LsysError>;

/// Check that two parallel arrays agree in length.
pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(LsysError::LengthMismatch {
            what,
            expected,
            actual,
        })
    }
}
