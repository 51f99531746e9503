//! Well construction and resolution errors.

use darcy_core::CellCoord;
use std::error::Error;
use std::fmt;

/// Errors detected while constructing wells or resolving controls.
///
/// Construction errors are fatal: malformed well input is never
/// silently corrected.
#[derive(Clone, Debug, PartialEq)]
pub enum WellError {
    /// A perforation interval lies (partly) outside the grid.
    PerforationOutOfGrid {
        /// Well name.
        well: String,
        /// The offending coordinate.
        coord: CellCoord,
    },
    /// A perforation interval's corners are reversed.
    ReversedInterval {
        /// Well name.
        well: String,
        /// Interval start corner.
        start: CellCoord,
        /// Interval end corner.
        end: CellCoord,
    },
    /// A well has no perforation intervals.
    NoPerforations {
        /// Well name.
        well: String,
    },
    /// Wellbore radius is non-positive or non-finite.
    InvalidRadius {
        /// Well name.
        well: String,
        /// The offending radius.
        radius: f64,
    },
    /// Two wells share a name.
    DuplicateName {
        /// The duplicated name.
        name: String,
    },
    /// An injected fluid's phase cannot be injected (oil injection is
    /// not supported) or its descriptor is non-physical.
    UnsupportedFluid {
        /// Description of the problem.
        reason: String,
    },
    /// A control parameter is invalid (zero rate, wrong rate sign for
    /// the well kind, non-positive BHP limit, empty multi-phase set).
    InvalidControl {
        /// Description of the problem.
        reason: String,
    },
    /// Skin factor drives the Peaceman denominator non-positive.
    InvalidSkin {
        /// Well name.
        well: String,
        /// The offending denominator `ln(re/rw) + skin`.
        denominator: f64,
    },
}

impl fmt::Display for WellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerforationOutOfGrid { well, coord } => {
                write!(f, "well '{well}': perforation {coord:?} outside grid")
            }
            Self::ReversedInterval { well, start, end } => {
                write!(
                    f,
                    "well '{well}': interval corners {start:?}..{end:?} are reversed"
                )
            }
            Self::NoPerforations { well } => {
                write!(f, "well '{well}' has no perforation intervals")
            }
            Self::InvalidRadius { well, radius } => {
                write!(f, "well '{well}': radius {radius} must be finite and positive")
            }
            Self::DuplicateName { name } => write!(f, "duplicate well name '{name}'"),
            Self::UnsupportedFluid { reason } => write!(f, "unsupported fluid: {reason}"),
            Self::InvalidControl { reason } => write!(f, "invalid well control: {reason}"),
            Self::InvalidSkin { well, denominator } => {
                write!(
                    f,
                    "well '{well}': ln(re/rw) + skin = {denominator} must be positive"
                )
            }
        }
    }
}

impl Error for WellError {}
