//! Grid boundary conditions.

use std::error::Error;
use std::fmt;

/// One of the six grid faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    /// i = 0 face.
    XMin,
    /// i = nx − 1 face.
    XMax,
    /// j = 0 face.
    YMin,
    /// j = ny − 1 face.
    YMax,
    /// k = 0 face (top).
    ZMin,
    /// k = nz − 1 face (bottom).
    ZMax,
}

impl Face {
    /// All six faces.
    pub const ALL: [Face; 6] = [
        Face::XMin,
        Face::XMax,
        Face::YMin,
        Face::YMax,
        Face::ZMin,
        Face::ZMax,
    ];

    /// The opposite face of the same axis.
    pub fn opposite(&self) -> Face {
        match self {
            Self::XMin => Self::XMax,
            Self::XMax => Self::XMin,
            Self::YMin => Self::YMax,
            Self::YMax => Self::YMin,
            Self::ZMin => Self::ZMax,
            Self::ZMax => Self::ZMin,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::XMin => "x-min",
            Self::XMax => "x-max",
            Self::YMin => "y-min",
            Self::YMax => "y-max",
            Self::ZMin => "z-min",
            Self::ZMax => "z-max",
        };
        write!(f, "{name}")
    }
}

/// What happens at one grid face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundaryCondition {
    /// Sealed: no flux crosses the face (default).
    NoFlow,
    /// The face is held at a fixed pressure; flux follows the half-cell
    /// transmissibility.
    ConstantPressure {
        /// Boundary pressure, psia.
        pressure: f64,
    },
    /// Analytic aquifer: water influx proportional to the pressure
    /// deficit through a productivity index.
    Aquifer {
        /// Aquifer pressure, psia.
        pressure: f64,
        /// Influx coefficient, ft³/day/psi per boundary cell.
        productivity_index: f64,
    },
    /// The face wraps to the opposite face of the same axis. Must be
    /// declared on both faces of the pair.
    Periodic,
}

/// Boundary-condition configuration errors.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundaryError {
    /// A pressure or productivity index is non-physical.
    InvalidParameter {
        /// The face carrying the bad value.
        face: Face,
        /// Description of the problem.
        reason: String,
    },
    /// Periodic declared on one face but not its opposite.
    UnpairedPeriodic {
        /// The face whose partner is missing.
        face: Face,
    },
}

impl fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { face, reason } => {
                write!(f, "boundary {face}: {reason}")
            }
            Self::UnpairedPeriodic { face } => {
                write!(f, "boundary {face}: periodic without matching opposite face")
            }
        }
    }
}

impl Error for BoundaryError {}

/// Boundary conditions for all six faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundarySet {
    x_min: BoundaryCondition,
    x_max: BoundaryCondition,
    y_min: BoundaryCondition,
    y_max: BoundaryCondition,
    z_min: BoundaryCondition,
    z_max: BoundaryCondition,
}

impl Default for BoundarySet {
    fn default() -> Self {
        Self::closed()
    }
}

impl BoundarySet {
    /// All faces sealed (closed box).
    pub fn closed() -> Self {
        Self {
            x_min: BoundaryCondition::NoFlow,
            x_max: BoundaryCondition::NoFlow,
            y_min: BoundaryCondition::NoFlow,
            y_max: BoundaryCondition::NoFlow,
            z_min: BoundaryCondition::NoFlow,
            z_max: BoundaryCondition::NoFlow,
        }
    }

    /// Replace one face's condition.
    pub fn with_face(mut self, face: Face, condition: BoundaryCondition) -> Self {
        *self.face_mut(face) = condition;
        self
    }

    /// The condition on one face.
    pub fn face(&self, face: Face) -> BoundaryCondition {
        match face {
            Face::XMin => self.x_min,
            Face::XMax => self.x_max,
            Face::YMin => self.y_min,
            Face::YMax => self.y_max,
            Face::ZMin => self.z_min,
            Face::ZMax => self.z_max,
        }
    }

    fn face_mut(&mut self, face: Face) -> &mut BoundaryCondition {
        match face {
            Face::XMin => &mut self.x_min,
            Face::XMax => &mut self.x_max,
            Face::YMin => &mut self.y_min,
            Face::YMax => &mut self.y_max,
            Face::ZMin => &mut self.z_min,
            Face::ZMax => &mut self.z_max,
        }
    }

    /// Validate parameters and periodic pairing.
    pub fn validate(&self) -> Result<(), BoundaryError> {
        for face in Face::ALL {
            match self.face(face) {
                BoundaryCondition::NoFlow => {}
                BoundaryCondition::ConstantPressure { pressure } => {
                    if !pressure.is_finite() || pressure <= 0.0 {
                        return Err(BoundaryError::InvalidParameter {
                            face,
                            reason: format!("pressure {pressure} must be finite and positive"),
                        });
                    }
                }
                BoundaryCondition::Aquifer {
                    pressure,
                    productivity_index,
                } => {
                    if !pressure.is_finite() || pressure <= 0.0 {
                        return Err(BoundaryError::InvalidParameter {
                            face,
                            reason: format!("pressure {pressure} must be finite and positive"),
                        });
                    }
                    if !productivity_index.is_finite() || productivity_index < 0.0 {
                        return Err(BoundaryError::InvalidParameter {
                            face,
                            reason: format!(
                                "productivity index {productivity_index} must be non-negative"
                            ),
                        });
                    }
                }
                BoundaryCondition::Periodic => {
                    if self.face(face.opposite()) != BoundaryCondition::Periodic {
                        return Err(BoundaryError::UnpairedPeriodic { face });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_set_is_valid() {
        assert!(BoundarySet::closed().validate().is_ok());
    }

    #[test]
    fn unpaired_periodic_rejected() {
        let set = BoundarySet::closed().with_face(Face::XMin, BoundaryCondition::Periodic);
        assert_eq!(
            set.validate(),
            Err(BoundaryError::UnpairedPeriodic { face: Face::XMin })
        );
        let paired = set.with_face(Face::XMax, BoundaryCondition::Periodic);
        assert!(paired.validate().is_ok());
    }

    #[test]
    fn bad_aquifer_parameters_rejected() {
        let set = BoundarySet::closed().with_face(
            Face::ZMax,
            BoundaryCondition::Aquifer {
                pressure: 3000.0,
                productivity_index: -1.0,
            },
        );
        assert!(matches!(
            set.validate(),
            Err(BoundaryError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn constant_pressure_must_be_physical() {
        let set = BoundarySet::closed().with_face(
            Face::XMax,
            BoundaryCondition::ConstantPressure { pressure: f64::NAN },
        );
        assert!(set.validate().is_err());
    }
}
