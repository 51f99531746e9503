//! Corey-type two-phase relative permeability curves.

use crate::error::RockFluidError;

/// One phase's Corey relative-permeability curve.
///
/// `kr(S) = kr_end · ((S − S_r) / (1 − S_r − S_cr))^n` for `S > S_r`,
/// zero at or below the residual saturation `S_r`. `S_cr` is the sum of
/// the competing phases' immobile saturations, which fixes the mobile
/// span's upper end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoreyCurve {
    residual: f64,
    competing_residual: f64,
    endpoint_kr: f64,
    exponent: f64,
}

impl CoreyCurve {
    /// Build a curve, validating endpoints and parameters.
    pub fn new(
        residual: f64,
        competing_residual: f64,
        endpoint_kr: f64,
        exponent: f64,
    ) -> Result<Self, RockFluidError> {
        for (name, value) in [
            ("residual", residual),
            ("competing residual", competing_residual),
        ] {
            if !value.is_finite() || !(0.0..1.0).contains(&value) {
                return Err(RockFluidError::InvalidEndpoint { name, value });
            }
        }
        let sum = residual + competing_residual;
        if sum >= 1.0 {
            return Err(RockFluidError::NoMobileSpan { sum });
        }
        if !endpoint_kr.is_finite() || endpoint_kr <= 0.0 || endpoint_kr > 1.0 {
            return Err(RockFluidError::InvalidParameter {
                reason: format!("endpoint kr {endpoint_kr} outside (0, 1]"),
            });
        }
        if !exponent.is_finite() || exponent < 1.0 {
            return Err(RockFluidError::InvalidParameter {
                reason: format!("Corey exponent {exponent} must be >= 1"),
            });
        }
        Ok(Self {
            residual,
            competing_residual,
            endpoint_kr,
            exponent,
        })
    }

    /// The phase's residual (irreducible) saturation.
    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Relative permeability at saturation `s`.
    ///
    /// `s` must lie in [0, 1]; values outside are a programming error in
    /// the caller and rejected by a debug assertion.
    pub fn kr(&self, s: f64) -> f64 {
        debug_assert!(
            (0.0..=1.0).contains(&s),
            "saturation {s} outside [0, 1] reached relative permeability"
        );
        if s <= self.residual {
            return 0.0;
        }
        let span = 1.0 - self.residual - self.competing_residual;
        let normalized = ((s - self.residual) / span).min(1.0);
        self.endpoint_kr * normalized.powf(self.exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn water_curve() -> CoreyCurve {
        CoreyCurve::new(0.2, 0.3, 0.6, 2.0).unwrap()
    }

    #[test]
    fn zero_below_residual() {
        let c = water_curve();
        assert_eq!(c.kr(0.0), 0.0);
        assert_eq!(c.kr(0.2), 0.0);
        assert!(c.kr(0.21) > 0.0);
    }

    #[test]
    fn endpoint_reached_at_full_span() {
        let c = water_curve();
        // Mobile span ends at 1 - 0.3 = 0.7.
        assert!((c.kr(0.7) - 0.6).abs() < 1.0e-12);
        // Beyond the span the value saturates at the endpoint.
        assert!((c.kr(0.9) - 0.6).abs() < 1.0e-12);
    }

    #[test]
    fn overlapping_endpoints_rejected() {
        assert!(matches!(
            CoreyCurve::new(0.6, 0.4, 0.8, 2.0),
            Err(RockFluidError::NoMobileSpan { .. })
        ));
    }

    #[test]
    fn bad_exponent_rejected() {
        assert!(CoreyCurve::new(0.2, 0.3, 0.6, 0.5).is_err());
        assert!(CoreyCurve::new(0.2, 0.3, 0.6, f64::NAN).is_err());
    }

    proptest! {
        /// kr is monotone non-decreasing and bounded by the endpoint.
        #[test]
        fn kr_monotone_and_bounded(s1 in 0.0f64..1.0, ds in 0.0f64..0.5) {
            let c = water_curve();
            let s2 = (s1 + ds).min(1.0);
            prop_assert!(c.kr(s2) + 1.0e-12 >= c.kr(s1));
            prop_assert!(c.kr(s2) <= 0.6 + 1.0e-12);
        }
    }
}
