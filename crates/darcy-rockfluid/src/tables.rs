//! The assembled rock-fluid table set consumed by the engine.

use crate::capillary::CapillaryPressureModel;
use crate::corey::CoreyCurve;
use crate::error::RockFluidError;
use crate::mixing::{MixingInputs, OilMixingRule};

/// Which phase preferentially wets the rock.
///
/// Flips the sign convention of the oil-water capillary curve: water-wet
/// rock has `po − pw = Pc ≥ 0`, oil-wet rock the opposite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wettability {
    /// Water preferentially wets the rock (most sandstones).
    WaterWet,
    /// Oil preferentially wets the rock (many carbonates).
    OilWet,
}

/// Relative permeabilities for the three phases at one saturation state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelPerm {
    /// Oil relative permeability.
    pub oil: f64,
    /// Water relative permeability.
    pub water: f64,
    /// Gas relative permeability.
    pub gas: f64,
}

/// The complete rock-fluid model: two-phase curves, a three-phase
/// mixing rule, capillary pressure, and wettability.
///
/// Read-only for the duration of a run. Self-contained: each instance
/// carries its own mixing rule, so reproducibility does not depend on
/// process-wide state.
#[derive(Debug)]
pub struct RockFluidTables {
    water: CoreyCurve,
    oil_in_water: CoreyCurve,
    oil_in_gas: CoreyCurve,
    gas: CoreyCurve,
    mixing: Box<dyn OilMixingRule>,
    pc_ow: CapillaryPressureModel,
    pc_go: CapillaryPressureModel,
    wettability: Wettability,
}

impl RockFluidTables {
    /// Assemble a table set from validated curves and a mixing rule.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        water: CoreyCurve,
        oil_in_water: CoreyCurve,
        oil_in_gas: CoreyCurve,
        gas: CoreyCurve,
        mixing: Box<dyn OilMixingRule>,
        oil_water_pc: CapillaryPressureModel,
        gas_oil_pc: CapillaryPressureModel,
        wettability: Wettability,
    ) -> Result<Self, RockFluidError> {
        // Curves validate themselves at construction; here only the
        // cross-curve constraint matters: connate water plus residual
        // oil must leave a mobile span for the oil bank.
        let sum = water.residual() + oil_in_water.residual();
        if sum >= 1.0 {
            return Err(RockFluidError::NoMobileSpan { sum });
        }
        Ok(Self {
            water,
            oil_in_water,
            oil_in_gas,
            gas,
            mixing,
            pc_ow: oil_water_pc,
            pc_go: gas_oil_pc,
            wettability,
        })
    }

    /// The configured wettability.
    pub fn wettability(&self) -> Wettability {
        self.wettability
    }

    /// The name of the injected three-phase mixing rule.
    pub fn mixing_rule_name(&self) -> &str {
        self.mixing.name()
    }

    /// Connate (irreducible) water saturation.
    pub fn connate_water_saturation(&self) -> f64 {
        self.water.residual()
    }

    /// Residual gas saturation.
    pub fn residual_gas_saturation(&self) -> f64 {
        self.gas.residual()
    }

    /// Three-phase relative permeabilities at `(sw, so, sg)`.
    ///
    /// Saturations must each lie in [0, 1]; out-of-range values are a
    /// programming error in the caller (the saturation updater owns the
    /// clamping) and are rejected by debug assertions.
    pub fn relative_permeability(&self, sw: f64, so: f64, sg: f64) -> RelPerm {
        debug_assert!(
            (0.0..=1.0).contains(&sw) && (0.0..=1.0).contains(&so) && (0.0..=1.0).contains(&sg),
            "saturations ({sw}, {so}, {sg}) outside [0, 1] reached rock-fluid tables"
        );
        let krow = self.oil_in_water.kr(so);
        let krog = self.oil_in_gas.kr(so);
        let kro = self.mixing.kro(MixingInputs {
            krow,
            krog,
            sw,
            sg,
            swc: self.water.residual(),
        });
        RelPerm {
            oil: kro,
            water: self.water.kr(sw),
            gas: self.gas.kr(sg),
        }
    }

    /// Oil-water capillary pressure `po − pw` at water saturation `sw`,
    /// signed per the configured wettability, psi.
    pub fn oil_water_pc(&self, sw: f64) -> f64 {
        let pc = self.pc_ow.pc(sw);
        match self.wettability {
            Wettability::WaterWet => pc,
            Wettability::OilWet => -pc,
        }
    }

    /// Gas-oil capillary pressure `pg − po` at gas saturation `sg`, psi.
    ///
    /// The wetting phase of the gas-oil pair is the liquid, so the curve
    /// is evaluated at the liquid saturation `1 − sg`.
    pub fn gas_oil_pc(&self, sg: f64) -> f64 {
        debug_assert!((0.0..=1.0).contains(&sg));
        self.pc_go.pc(1.0 - sg)
    }
}
