//! Structural solver errors.

use std::error::Error;
use std::fmt;

/// Errors from matrix assembly or preconditioner construction.
///
/// Non-convergence is deliberately *not* here: it is an outcome carried
/// in [`SolveReport`](crate::SolveReport), because the engine treats it
/// as a recoverable step rejection rather than a failure.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// Vector length does not match the matrix dimension.
    DimensionMismatch {
        /// Matrix dimension.
        matrix: usize,
        /// Offending vector length.
        vector: usize,
    },
    /// A triplet index lies outside the matrix dimension.
    IndexOutOfBounds {
        /// The offending row or column.
        index: usize,
        /// Matrix dimension.
        n: usize,
    },
    /// A zero (or missing) diagonal makes the preconditioner singular.
    ZeroDiagonal {
        /// The offending row.
        row: usize,
    },
    /// Convergence tolerance is non-positive or non-finite.
    InvalidTolerance {
        /// The offending value.
        value: f64,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { matrix, vector } => {
                write!(f, "matrix dimension {matrix} vs vector length {vector}")
            }
            Self::IndexOutOfBounds { index, n } => {
                write!(f, "index {index} outside matrix dimension {n}")
            }
            Self::ZeroDiagonal { row } => {
                write!(f, "zero diagonal at row {row}, preconditioner is singular")
            }
            Self::InvalidTolerance { value } => {
                write!(f, "tolerance {value} must be finite and positive")
            }
        }
    }
}

impl Error for SolverError {}
