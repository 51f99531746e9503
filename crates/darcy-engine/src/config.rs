//! Solver configuration, validation, and error types.

use darcy_solver::{LinearSolver, PreconditionerKind};
use std::error::Error;
use std::fmt;

/// Pressure/saturation coupling scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    /// Implicit pressure, explicit saturation.
    Impes,
    /// Fully explicit pressure and saturation update. Cheap per step,
    /// stable only at small timesteps.
    Explicit,
}

/// How injected and in-situ gas/oil mobilities blend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Miscibility {
    /// No mixing: phases keep their own viscosities.
    Immiscible,
    /// Todd-Longstaff partial-miscibility mixing above the injected
    /// fluid's minimum miscibility pressure.
    ToddLongstaff,
}

/// Errors detected during [`SolverConfig::validate()`] or simulation
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A tolerance or factor is outside its valid range.
    InvalidParameter {
        /// Description of the offending parameter.
        reason: String,
    },
    /// Timer configuration is inconsistent.
    InvalidTimer {
        /// Description of the offending parameter.
        reason: String,
    },
    /// Boundary-condition configuration is inconsistent.
    Boundary(crate::boundary::BoundaryError),
    /// The reservoir model failed validation.
    Model(darcy_grid::ModelError),
    /// A well or schedule failed validation.
    Well(darcy_wells::WellError),
    /// The PVT input failed validation.
    Pvt(darcy_pvt::PvtError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { reason } => write!(f, "invalid parameter: {reason}"),
            Self::InvalidTimer { reason } => write!(f, "invalid timer: {reason}"),
            Self::Boundary(e) => write!(f, "boundary: {e}"),
            Self::Model(e) => write!(f, "model: {e}"),
            Self::Well(e) => write!(f, "well: {e}"),
            Self::Pvt(e) => write!(f, "pvt: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Boundary(e) => Some(e),
            Self::Model(e) => Some(e),
            Self::Well(e) => Some(e),
            Self::Pvt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::boundary::BoundaryError> for ConfigError {
    fn from(e: crate::boundary::BoundaryError) -> Self {
        Self::Boundary(e)
    }
}

impl From<darcy_grid::ModelError> for ConfigError {
    fn from(e: darcy_grid::ModelError) -> Self {
        Self::Model(e)
    }
}

impl From<darcy_wells::WellError> for ConfigError {
    fn from(e: darcy_wells::WellError) -> Self {
        Self::Well(e)
    }
}

impl From<darcy_pvt::PvtError> for ConfigError {
    fn from(e: darcy_pvt::PvtError) -> Self {
        Self::Pvt(e)
    }
}

/// Complete solver configuration for a run.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Coupling scheme.
    pub scheme: Scheme,
    /// Krylov method for the implicit pressure solve.
    pub method: LinearSolver,
    /// Preconditioner family.
    pub preconditioner: PreconditionerKind,
    /// Relative residual tolerance for the pressure solve.
    pub pressure_convergence_tolerance: f64,
    /// Iteration budget for the pressure solve.
    pub max_iterations: u32,
    /// Evaluate gas flow coefficients with squared-pressure face
    /// averaging, which linearizes gas compressibility better at low
    /// pressure.
    pub pseudo_pressure: bool,
    /// Include capillary-pressure gradients in the flow terms.
    pub capillary_effects: bool,
    /// Scale factor on capillary gradients when enabled.
    pub capillary_strength: f64,
    /// Gas/oil mobility mixing model.
    pub miscibility: Miscibility,
    /// Per-step cap on any cell's gas-saturation change.
    pub max_gas_saturation_change: f64,
    /// Total clamped saturation volume tolerated before a step is
    /// rejected as a stability breach.
    pub saturation_clamp_tolerance: f64,
    /// Rebuild the preconditioner after this many solves.
    pub preconditioner_update_frequency: u32,
    /// Rebuild early when matrix values drift past this relative L2
    /// distance.
    pub preconditioner_recompute_threshold: f64,
    /// Hand every Nth accepted state to the stream consumer.
    pub output_frequency: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::Impes,
            method: LinearSolver::BiCgStab,
            preconditioner: PreconditionerKind::Ilu0,
            pressure_convergence_tolerance: 1.0e-8,
            max_iterations: 500,
            pseudo_pressure: false,
            capillary_effects: false,
            capillary_strength: 1.0,
            miscibility: Miscibility::Immiscible,
            max_gas_saturation_change: 0.1,
            saturation_clamp_tolerance: 1.0e-3,
            preconditioner_update_frequency: 10,
            preconditioner_recompute_threshold: 0.3,
            output_frequency: 1,
        }
    }
}

impl SolverConfig {
    /// Validate all parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Convergence tolerance must be a small positive number.
        if !self.pressure_convergence_tolerance.is_finite()
            || self.pressure_convergence_tolerance <= 0.0
            || self.pressure_convergence_tolerance >= 1.0
        {
            return Err(ConfigError::InvalidParameter {
                reason: format!(
                    "pressure tolerance {} outside (0, 1)",
                    self.pressure_convergence_tolerance
                ),
            });
        }
        // 2. Iteration budget.
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidParameter {
                reason: "max_iterations must be at least 1".to_string(),
            });
        }
        // 3. GMRES restart length.
        if let LinearSolver::Gmres { restart } = self.method {
            if restart == 0 {
                return Err(ConfigError::InvalidParameter {
                    reason: "GMRES restart must be at least 1".to_string(),
                });
            }
        }
        // 4. Capillary strength.
        if !self.capillary_strength.is_finite() || self.capillary_strength < 0.0 {
            return Err(ConfigError::InvalidParameter {
                reason: format!(
                    "capillary strength {} must be finite and non-negative",
                    self.capillary_strength
                ),
            });
        }
        // 5. Gas-saturation-change cap.
        if !self.max_gas_saturation_change.is_finite()
            || self.max_gas_saturation_change <= 0.0
            || self.max_gas_saturation_change > 1.0
        {
            return Err(ConfigError::InvalidParameter {
                reason: format!(
                    "max gas saturation change {} outside (0, 1]",
                    self.max_gas_saturation_change
                ),
            });
        }
        // 6. Clamp tolerance.
        if !self.saturation_clamp_tolerance.is_finite() || self.saturation_clamp_tolerance < 0.0 {
            return Err(ConfigError::InvalidParameter {
                reason: format!(
                    "saturation clamp tolerance {} must be finite and non-negative",
                    self.saturation_clamp_tolerance
                ),
            });
        }
        // 7. Preconditioner cache parameters.
        if self.preconditioner_update_frequency == 0 {
            return Err(ConfigError::InvalidParameter {
                reason: "preconditioner update frequency must be at least 1".to_string(),
            });
        }
        if !self.preconditioner_recompute_threshold.is_finite()
            || self.preconditioner_recompute_threshold <= 0.0
        {
            return Err(ConfigError::InvalidParameter {
                reason: format!(
                    "preconditioner recompute threshold {} must be positive",
                    self.preconditioner_recompute_threshold
                ),
            });
        }
        // 8. Output cadence.
        if self.output_frequency == 0 {
            return Err(ConfigError::InvalidParameter {
                reason: "output frequency must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn bad_tolerance_rejected() {
        let mut cfg = SolverConfig::default();
        cfg.pressure_convergence_tolerance = 0.0;
        assert!(cfg.validate().is_err());
        cfg.pressure_convergence_tolerance = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_gmres_restart_rejected() {
        let mut cfg = SolverConfig::default();
        cfg.method = LinearSolver::Gmres { restart: 0 };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn gas_saturation_cap_range_checked() {
        let mut cfg = SolverConfig::default();
        cfg.max_gas_saturation_change = 0.0;
        assert!(cfg.validate().is_err());
        cfg.max_gas_saturation_change = 1.5;
        assert!(cfg.validate().is_err());
        cfg.max_gas_saturation_change = 0.05;
        assert!(cfg.validate().is_ok());
    }
}
