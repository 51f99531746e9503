//! Injected and produced fluid descriptors.

use crate::error::WellError;
use darcy_core::Phase;

/// The fluid an injection well pushes into the reservoir.
#[derive(Clone, Debug, PartialEq)]
pub struct InjectedFluid {
    /// Display name, e.g. `"CO2"`.
    pub name: String,
    /// Which phase the fluid enters as. Oil injection is unsupported.
    pub phase: Phase,
    /// Specific gravity (gas: air = 1; water: fresh water = 1).
    pub specific_gravity: f64,
    /// Molecular weight, lbm/lb-mol.
    pub molecular_weight: f64,
    /// Viscosity at reservoir conditions, cP.
    pub viscosity: f64,
    /// Density at reservoir conditions, lbm/ft³.
    pub density: f64,
    /// Minimum miscibility pressure, psia. Only meaningful for miscible
    /// gas injection.
    pub minimum_miscibility_pressure: f64,
    /// Todd-Longstaff mixing parameter ω in [0, 1].
    pub todd_longstaff_omega: f64,
    /// Whether the fluid can become miscible with reservoir oil.
    pub is_miscible: bool,
    /// Injected concentration, fraction of the stream.
    pub concentration: f64,
}

impl InjectedFluid {
    /// Validate the descriptor.
    pub fn validate(&self) -> Result<(), WellError> {
        if self.phase == Phase::Oil {
            return Err(WellError::UnsupportedFluid {
                reason: format!("'{}': oil injection is not supported", self.name),
            });
        }
        for (label, v) in [
            ("specific gravity", self.specific_gravity),
            ("molecular weight", self.molecular_weight),
            ("viscosity", self.viscosity),
            ("density", self.density),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(WellError::UnsupportedFluid {
                    reason: format!("'{}': {label} {v} must be finite and positive", self.name),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.todd_longstaff_omega) {
            return Err(WellError::UnsupportedFluid {
                reason: format!(
                    "'{}': Todd-Longstaff omega {} outside [0, 1]",
                    self.name, self.todd_longstaff_omega
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.concentration) {
            return Err(WellError::UnsupportedFluid {
                reason: format!(
                    "'{}': concentration {} outside [0, 1]",
                    self.name, self.concentration
                ),
            });
        }
        if self.is_miscible
            && (!self.minimum_miscibility_pressure.is_finite()
                || self.minimum_miscibility_pressure <= 0.0)
        {
            return Err(WellError::UnsupportedFluid {
                reason: format!(
                    "'{}': miscible fluid needs a positive minimum miscibility pressure",
                    self.name
                ),
            });
        }
        Ok(())
    }
}

/// A fluid a production well reports producing.
#[derive(Clone, Debug, PartialEq)]
pub struct ProducedFluid {
    /// Display name, e.g. `"Oil"`.
    pub name: String,
    /// The produced phase.
    pub phase: Phase,
    /// Specific gravity (oil/water: water = 1; gas: air = 1).
    pub specific_gravity: f64,
    /// Molecular weight, lbm/lb-mol.
    pub molecular_weight: f64,
}

impl ProducedFluid {
    /// Validate the descriptor.
    pub fn validate(&self) -> Result<(), WellError> {
        for (label, v) in [
            ("specific gravity", self.specific_gravity),
            ("molecular weight", self.molecular_weight),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(WellError::UnsupportedFluid {
                    reason: format!("'{}': {label} {v} must be finite and positive", self.name),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn co2() -> InjectedFluid {
        InjectedFluid {
            name: "CO2".to_string(),
            phase: Phase::Gas,
            specific_gravity: 0.818,
            molecular_weight: 44.0,
            viscosity: 0.05,
            density: 35.0,
            minimum_miscibility_pressure: 2200.0,
            todd_longstaff_omega: 0.67,
            is_miscible: true,
            concentration: 1.0,
        }
    }

    #[test]
    fn valid_gas_injectant_passes() {
        assert!(co2().validate().is_ok());
    }

    #[test]
    fn oil_injection_rejected() {
        let mut fluid = co2();
        fluid.phase = Phase::Oil;
        assert!(matches!(
            fluid.validate(),
            Err(WellError::UnsupportedFluid { .. })
        ));
    }

    #[test]
    fn miscible_fluid_needs_mmp() {
        let mut fluid = co2();
        fluid.minimum_miscibility_pressure = 0.0;
        assert!(fluid.validate().is_err());
    }
}
