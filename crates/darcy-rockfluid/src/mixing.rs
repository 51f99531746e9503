//! Three-phase oil relative-permeability mixing rules.
//!
//! Two-phase tables give `krow` (oil vs. water) and `krog` (oil vs.
//! gas); in three-phase flow the oil curve must blend the two. The rule
//! is injected as a trait object at table construction, so alternative
//! blends are substitutable without touching the rest of the model.

use std::fmt;

/// Inputs to a three-phase oil mixing rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MixingInputs {
    /// Oil relative permeability from the water-oil curve.
    pub krow: f64,
    /// Oil relative permeability from the gas-oil curve.
    pub krog: f64,
    /// Water saturation.
    pub sw: f64,
    /// Gas saturation.
    pub sg: f64,
    /// Connate (irreducible) water saturation.
    pub swc: f64,
}

/// A three-phase oil relative-permeability blending rule.
///
/// Implementations must be deterministic pure functions of their inputs
/// and return a value in [0, 1].
pub trait OilMixingRule: Send + Sync {
    /// Rule name, for diagnostics.
    fn name(&self) -> &str;

    /// Blend the two-phase oil curves into a three-phase value.
    fn kro(&self, inputs: MixingInputs) -> f64;
}

impl fmt::Debug for dyn OilMixingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OilMixingRule({})", self.name())
    }
}

/// Baker's saturation-weighted linear interpolation.
///
/// `kro = ((Sw − Swc) · krow + Sg · krog) / ((Sw − Swc) + Sg)`, falling
/// back to the smaller of the two curves when both weights vanish.
#[derive(Clone, Copy, Debug, Default)]
pub struct BakerLinear;

impl OilMixingRule for BakerLinear {
    fn name(&self) -> &str {
        "baker_linear"
    }

    fn kro(&self, inputs: MixingInputs) -> f64 {
        let ww = (inputs.sw - inputs.swc).max(0.0);
        let wg = inputs.sg.max(0.0);
        let total = ww + wg;
        if total <= f64::EPSILON {
            return inputs.krow.min(inputs.krog);
        }
        ((ww * inputs.krow + wg * inputs.krog) / total).clamp(0.0, 1.0)
    }
}

/// Stone's second model (normalized form).
///
/// `kro = (krow + krw')·(krog + krg') − (krw' + krg')` with the
/// convention that the water/gas contributions are folded into the
/// two-phase curves; negative results clamp to zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoneTwo;

impl OilMixingRule for StoneTwo {
    fn name(&self) -> &str {
        "stone_ii"
    }

    fn kro(&self, inputs: MixingInputs) -> f64 {
        // Water and gas weights approximate krw/krg near the oil bank.
        let ww = (inputs.sw - inputs.swc).max(0.0);
        let wg = inputs.sg.max(0.0);
        let kro = (inputs.krow + ww) * (inputs.krog + wg) - (ww + wg);
        kro.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(krow: f64, krog: f64, sw: f64, sg: f64) -> MixingInputs {
        MixingInputs {
            krow,
            krog,
            sw,
            sg,
            swc: 0.2,
        }
    }

    #[test]
    fn baker_reduces_to_two_phase_limits() {
        let rule = BakerLinear;
        // No free gas: pure water-oil system.
        assert_eq!(rule.kro(inputs(0.4, 0.9, 0.5, 0.0)), 0.4);
        // Water at connate: pure gas-oil system.
        assert_eq!(rule.kro(inputs(0.9, 0.3, 0.2, 0.3)), 0.3);
    }

    #[test]
    fn baker_interpolates_between_curves() {
        let rule = BakerLinear;
        let kro = rule.kro(inputs(0.6, 0.2, 0.4, 0.2));
        assert!(kro > 0.2 && kro < 0.6, "kro = {kro}");
    }

    #[test]
    fn stone_two_clamps_to_physical_range() {
        let rule = StoneTwo;
        let kro = rule.kro(inputs(0.05, 0.05, 0.7, 0.25));
        assert!((0.0..=1.0).contains(&kro));
    }

    #[test]
    fn rules_are_substitutable() {
        let rules: Vec<Box<dyn OilMixingRule>> = vec![Box::new(BakerLinear), Box::new(StoneTwo)];
        for rule in &rules {
            let kro = rule.kro(inputs(0.5, 0.5, 0.4, 0.1));
            assert!((0.0..=1.0).contains(&kro), "{} out of range", rule.name());
        }
    }
}
