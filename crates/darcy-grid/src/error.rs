//! Construction-time validation errors for grids and models.

use std::error::Error;
use std::fmt;

/// Errors detected while constructing grid storage or a reservoir model.
///
/// All of these are fatal at construction time: invalid inputs are never
/// silently corrected.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelError {
    /// A grid dimension is zero.
    EmptyGrid,
    /// A cell dimension or thickness is non-positive or non-finite.
    InvalidGeometry {
        /// Description of the offending value.
        reason: String,
    },
    /// A property array's length does not match the grid shape.
    ShapeMismatch {
        /// Name of the offending grid.
        field: String,
        /// Number of values supplied.
        got: usize,
        /// Number of cells the shape requires.
        expected: usize,
    },
    /// A property value is outside its physical range.
    OutOfRange {
        /// Name of the offending grid.
        field: String,
        /// Linear rank of the first offending cell.
        cell: usize,
        /// The offending value.
        value: f64,
    },
    /// Phase saturations do not sum to one in some cell.
    SaturationSum {
        /// Linear rank of the first offending cell.
        cell: usize,
        /// The saturation sum found there.
        sum: f64,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid has zero cells"),
            Self::InvalidGeometry { reason } => write!(f, "invalid geometry: {reason}"),
            Self::ShapeMismatch {
                field,
                got,
                expected,
            } => {
                write!(f, "{field} has {got} values, shape requires {expected}")
            }
            Self::OutOfRange { field, cell, value } => {
                write!(f, "{field} out of range at cell {cell}: {value}")
            }
            Self::SaturationSum { cell, sum } => {
                write!(f, "saturations sum to {sum} at cell {cell}, expected 1")
            }
        }
    }
}

impl Error for ModelError {}
