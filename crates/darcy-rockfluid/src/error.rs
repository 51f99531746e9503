//! Rock-fluid model construction errors.

use std::error::Error;
use std::fmt;

/// Errors detected while constructing rock-fluid curves or tables.
#[derive(Clone, Debug, PartialEq)]
pub enum RockFluidError {
    /// An endpoint saturation is outside [0, 1).
    InvalidEndpoint {
        /// Name of the offending endpoint.
        name: &'static str,
        /// The offending value.
        value: f64,
    },
    /// Endpoint saturations leave no mobile span (sum ≥ 1).
    NoMobileSpan {
        /// Sum of the competing endpoint saturations.
        sum: f64,
    },
    /// A curvature exponent or endpoint kr is non-positive or non-finite.
    InvalidParameter {
        /// Description of the offending parameter.
        reason: String,
    },
    /// An entry pressure or pore-size exponent is non-physical.
    InvalidCapillary {
        /// Description of the offending parameter.
        reason: String,
    },
}

impl fmt::Display for RockFluidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint { name, value } => {
                write!(f, "endpoint saturation {name} = {value} outside [0, 1)")
            }
            Self::NoMobileSpan { sum } => {
                write!(f, "endpoint saturations sum to {sum}, no mobile span remains")
            }
            Self::InvalidParameter { reason } => write!(f, "invalid parameter: {reason}"),
            Self::InvalidCapillary { reason } => {
                write!(f, "invalid capillary parameter: {reason}")
            }
        }
    }
}

impl Error for RockFluidError {}
