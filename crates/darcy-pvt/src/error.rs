//! PVT construction and evaluation errors.

use std::error::Error;
use std::fmt;

/// Errors from PVT table construction or property evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum PvtError {
    /// A table needs at least two pressure nodes.
    TooFewRows {
        /// Rows supplied.
        got: usize,
    },
    /// Pressure nodes must be strictly increasing.
    NonMonotonicPressure {
        /// Index of the first node that does not increase.
        index: usize,
    },
    /// A table column's length differs from the pressure axis.
    ColumnLength {
        /// Column name.
        column: &'static str,
        /// Values supplied.
        got: usize,
        /// Values required.
        expected: usize,
    },
    /// A table value is NaN or infinite.
    NonFiniteValue {
        /// Column name.
        column: &'static str,
        /// Row index.
        row: usize,
    },
    /// A correlation parameter is outside its validity range.
    InvalidParameter {
        /// Description of the offending parameter.
        reason: String,
    },
    /// An evaluation input (pressure, temperature) is non-physical.
    InvalidInput {
        /// Description of the offending input.
        reason: String,
    },
    /// A strict-extrapolation lookup fell outside the table range.
    OutOfTableRange {
        /// The pressure requested.
        pressure: f64,
        /// The table's covered range.
        range: (f64, f64),
    },
}

impl fmt::Display for PvtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewRows { got } => {
                write!(f, "PVT table needs at least 2 rows, got {got}")
            }
            Self::NonMonotonicPressure { index } => {
                write!(f, "pressure nodes must strictly increase (row {index})")
            }
            Self::ColumnLength {
                column,
                got,
                expected,
            } => {
                write!(f, "column '{column}' has {got} values, expected {expected}")
            }
            Self::NonFiniteValue { column, row } => {
                write!(f, "non-finite value in column '{column}' row {row}")
            }
            Self::InvalidParameter { reason } => {
                write!(f, "invalid correlation parameter: {reason}")
            }
            Self::InvalidInput { reason } => write!(f, "invalid PVT input: {reason}"),
            Self::OutOfTableRange { pressure, range } => {
                write!(
                    f,
                    "pressure {pressure} outside table range [{}, {}]",
                    range.0, range.1
                )
            }
        }
    }
}

impl Error for PvtError {}
