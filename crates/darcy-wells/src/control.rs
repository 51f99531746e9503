//! Well operating controls and their per-step resolution.

use crate::error::WellError;
use darcy_core::{PerPhase, Phase};

/// Injectivity below which a phase is treated as unable to flow at the
/// well, making an implied BHP meaningless.
const MIN_INJECTIVITY: f64 = 1.0e-12;

/// One phase's rate target with its bottom-hole-pressure limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseRateControl {
    /// Target volumetric rate, ft³/day. Negative produces, positive injects.
    pub target_rate: f64,
    /// Bottom-hole-pressure limit, psia. Floor for producers, ceiling
    /// for injectors.
    pub bhp_limit: f64,
}

/// How a primary-phase control bounds the phases it does not cover.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SecondaryClamp {
    /// Cap each uncovered phase's rate magnitude at a fraction of the
    /// primary phase's realized rate magnitude (e.g. a water-cut cap).
    FractionOfPrimary {
        /// Maximum |secondary| / |primary| ratio.
        max_fraction: f64,
    },
    /// Uncovered phases do not flow at all.
    Shut,
}

/// A well's operating policy: a closed set of tagged variants with one
/// resolution operation.
///
/// Each variant maps, via [`WellControl::resolve`], to a concrete
/// operating point — per-phase rates plus the bottom-hole pressure they
/// imply — given the current near-well conditions. Resolution happens
/// every step because the resolved mode may change step to step.
#[derive(Clone, Debug, PartialEq)]
pub enum WellControl {
    /// Fixed total volumetric rate, distributed over phases by mobility
    /// (producers) or delivered entirely as the injected phase.
    ConstantRate {
        /// Total rate, ft³/day. Negative produces, positive injects.
        rate: f64,
    },
    /// Rate target on one phase, falling back to the BHP limit whenever
    /// sustaining the target would cross it.
    AdaptiveBhpRate {
        /// The driven phase.
        phase: Phase,
        /// Target rate for that phase, ft³/day.
        target_rate: f64,
        /// BHP limit, psia.
        bhp_limit: f64,
    },
    /// Independent per-phase sub-controls. Simultaneously binding limits
    /// resolve to whichever constraint is most restrictive to total
    /// well rate.
    MultiPhaseRate {
        /// Oil sub-control.
        oil: Option<PhaseRateControl>,
        /// Water sub-control.
        water: Option<PhaseRateControl>,
        /// Gas sub-control.
        gas: Option<PhaseRateControl>,
    },
    /// Drive on one phase; a clamp bounds every phase the primary
    /// control does not cover.
    PrimaryPhaseRate {
        /// The driven phase.
        phase: Phase,
        /// The primary sub-control.
        control: PhaseRateControl,
        /// Bound on uncovered phases.
        clamp: SecondaryClamp,
    },
}

/// Which constraint a resolved well is currently operating on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WellMode {
    /// The configured rate target is achievable within the BHP limit.
    RateTarget,
    /// The BHP limit binds; rates are whatever the limit implies.
    BhpLimited,
}

/// A well's concrete operating point for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedWell {
    /// Operating mode after constraint resolution.
    pub mode: WellMode,
    /// Bottom-hole pressure, psia.
    pub bhp: f64,
    /// Realized per-phase rates, ft³/day. Negative produces.
    pub rates: PerPhase<f64>,
}

/// Near-well reservoir conditions feeding control resolution.
///
/// `injectivity[φ] = Σ_perforations WI · λ_φ` couples the well to the
/// reservoir: `q_φ = injectivity[φ] · (BHP − p̄)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WellConditions {
    /// Perforation-averaged reservoir pressure, psia.
    pub average_pressure: f64,
    /// Per-phase injectivity, ft³/day/psi.
    pub injectivity: PerPhase<f64>,
}

impl WellConditions {
    fn total_injectivity(&self) -> f64 {
        self.injectivity.total()
    }
}

impl WellControl {
    /// Validate the control for a well of the given direction.
    ///
    /// `producing` wells need negative targets, injectors positive; BHP
    /// limits must be finite and positive; a multi-phase set needs at
    /// least one sub-control; clamp fractions lie in [0, 1].
    pub fn validate(&self, producing: bool) -> Result<(), WellError> {
        let check_rate = |rate: f64| -> Result<(), WellError> {
            if !rate.is_finite() || rate == 0.0 {
                return Err(WellError::InvalidControl {
                    reason: format!("target rate {rate} must be finite and non-zero"),
                });
            }
            if producing && rate > 0.0 || !producing && rate < 0.0 {
                return Err(WellError::InvalidControl {
                    reason: format!(
                        "target rate {rate} has the wrong sign for a {} well",
                        if producing { "production" } else { "injection" }
                    ),
                });
            }
            Ok(())
        };
        let check_limit = |limit: f64| -> Result<(), WellError> {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(WellError::InvalidControl {
                    reason: format!("BHP limit {limit} must be finite and positive"),
                });
            }
            Ok(())
        };
        match self {
            Self::ConstantRate { rate } => check_rate(*rate),
            Self::AdaptiveBhpRate {
                target_rate,
                bhp_limit,
                ..
            } => {
                check_rate(*target_rate)?;
                check_limit(*bhp_limit)
            }
            Self::MultiPhaseRate { oil, water, gas } => {
                let controls = [oil, water, gas];
                if controls.iter().all(|c| c.is_none()) {
                    return Err(WellError::InvalidControl {
                        reason: "multi-phase control needs at least one sub-control".to_string(),
                    });
                }
                for control in controls.into_iter().flatten() {
                    check_rate(control.target_rate)?;
                    check_limit(control.bhp_limit)?;
                }
                Ok(())
            }
            Self::PrimaryPhaseRate { control, clamp, .. } => {
                check_rate(control.target_rate)?;
                check_limit(control.bhp_limit)?;
                if let SecondaryClamp::FractionOfPrimary { max_fraction } = clamp {
                    if !max_fraction.is_finite() || !(0.0..=1.0).contains(max_fraction) {
                        return Err(WellError::InvalidControl {
                            reason: format!("clamp fraction {max_fraction} outside [0, 1]"),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    /// Resolve the control into a concrete operating point.
    ///
    /// `injected_phase` is `Some` for injection wells; injectors deliver
    /// into that phase only and never flow the others backward.
    pub fn resolve(
        &self,
        cond: &WellConditions,
        injected_phase: Option<Phase>,
    ) -> ResolvedWell {
        match self {
            Self::ConstantRate { rate } => Self::resolve_constant(*rate, cond, injected_phase),
            Self::AdaptiveBhpRate {
                phase,
                target_rate,
                bhp_limit,
            } => Self::resolve_adaptive(*phase, *target_rate, *bhp_limit, cond, injected_phase),
            Self::MultiPhaseRate { oil, water, gas } => {
                Self::resolve_multi(*oil, *water, *gas, cond, injected_phase)
            }
            Self::PrimaryPhaseRate {
                phase,
                control,
                clamp,
            } => {
                let mut resolved = Self::resolve_adaptive(
                    *phase,
                    control.target_rate,
                    control.bhp_limit,
                    cond,
                    injected_phase,
                );
                let primary_magnitude = resolved.rates[*phase].abs();
                for other in Phase::ALL {
                    if other == *phase {
                        continue;
                    }
                    match clamp {
                        SecondaryClamp::Shut => resolved.rates[other] = 0.0,
                        SecondaryClamp::FractionOfPrimary { max_fraction } => {
                            let cap = max_fraction * primary_magnitude;
                            let q = resolved.rates[other];
                            resolved.rates[other] = q.clamp(-cap, cap);
                        }
                    }
                }
                resolved
            }
        }
    }

    fn resolve_constant(
        rate: f64,
        cond: &WellConditions,
        injected_phase: Option<Phase>,
    ) -> ResolvedWell {
        let total = cond.total_injectivity();
        if total <= MIN_INJECTIVITY {
            return ResolvedWell {
                mode: WellMode::RateTarget,
                bhp: cond.average_pressure,
                rates: PerPhase::ZERO,
            };
        }
        let bhp = cond.average_pressure + rate / total;
        let mut rates = PerPhase::ZERO;
        match injected_phase {
            Some(phase) => rates[phase] = rate,
            None => {
                // Producers split the total by fractional mobility.
                for phase in Phase::ALL {
                    rates[phase] = rate * cond.injectivity[phase] / total;
                }
            }
        }
        ResolvedWell {
            mode: WellMode::RateTarget,
            bhp,
            rates,
        }
    }

    fn resolve_adaptive(
        phase: Phase,
        target_rate: f64,
        bhp_limit: f64,
        cond: &WellConditions,
        injected_phase: Option<Phase>,
    ) -> ResolvedWell {
        let j_phase = cond.injectivity[phase];
        if j_phase <= MIN_INJECTIVITY {
            // Phase cannot flow at the well: nothing to drive.
            return ResolvedWell {
                mode: WellMode::RateTarget,
                bhp: cond.average_pressure,
                rates: PerPhase::ZERO,
            };
        }
        let producing = target_rate < 0.0;
        let implied_bhp = cond.average_pressure + target_rate / j_phase;
        let limited = if producing {
            implied_bhp < bhp_limit
        } else {
            implied_bhp > bhp_limit
        };
        let (mode, bhp) = if limited {
            (WellMode::BhpLimited, bhp_limit)
        } else {
            (WellMode::RateTarget, implied_bhp)
        };
        let mut rates = PerPhase::ZERO;
        let drawdown = bhp - cond.average_pressure;
        match injected_phase {
            Some(injected) => {
                // Injectors deliver into their fluid's phase only, and
                // never flow backward: a limit below reservoir pressure
                // shuts the well in.
                rates[injected] = if limited {
                    (cond.injectivity[injected] * drawdown).max(0.0)
                } else {
                    target_rate
                };
            }
            None => {
                // Producers shut in rather than backflow when the BHP
                // floor sits above reservoir pressure.
                if !(producing && drawdown > 0.0) {
                    for p in Phase::ALL {
                        rates[p] = cond.injectivity[p] * drawdown;
                    }
                    if !limited {
                        // The driven phase hits its target exactly.
                        rates[phase] = target_rate;
                    }
                }
            }
        }
        ResolvedWell { mode, bhp, rates }
    }

    fn resolve_multi(
        oil: Option<PhaseRateControl>,
        water: Option<PhaseRateControl>,
        gas: Option<PhaseRateControl>,
        cond: &WellConditions,
        injected_phase: Option<Phase>,
    ) -> ResolvedWell {
        let mut controls: PerPhase<Option<PhaseRateControl>> = PerPhase::new(oil, water, gas);
        // Drop sub-controls for phases that cannot flow at the well.
        for phase in Phase::ALL {
            if cond.injectivity[phase] <= MIN_INJECTIVITY {
                controls[phase] = None;
            }
        }
        let configured: Vec<(Phase, PhaseRateControl)> = Phase::ALL
            .into_iter()
            .filter_map(|p| controls[p].map(|c| (p, c)))
            .collect();
        if configured.is_empty() {
            return ResolvedWell {
                mode: WellMode::RateTarget,
                bhp: cond.average_pressure,
                rates: PerPhase::ZERO,
            };
        }
        let producing = configured[0].1.target_rate < 0.0;

        let implied = |phase: Phase, c: &PhaseRateControl| {
            cond.average_pressure + c.target_rate / cond.injectivity[phase]
        };
        let binding: Vec<(Phase, PhaseRateControl)> = configured
            .iter()
            .filter(|(p, c)| {
                let bhp = implied(*p, c);
                if producing {
                    bhp < c.bhp_limit
                } else {
                    bhp > c.bhp_limit
                }
            })
            .copied()
            .collect();

        if binding.is_empty() {
            // Every sub-target is achievable: honor all of them. The
            // reported BHP is the most demanding implied pressure.
            let mut rates = PerPhase::ZERO;
            let mut bhp = cond.average_pressure;
            for (phase, c) in &configured {
                rates[*phase] = c.target_rate;
                let b = implied(*phase, c);
                bhp = if producing { bhp.min(b) } else { bhp.max(b) };
            }
            return ResolvedWell {
                mode: WellMode::RateTarget,
                bhp,
                rates,
            };
        }

        // One or more limits bind. The most restrictive constraint on
        // total rate wins: for a producer that is the highest limit
        // pressure (least drawdown), for an injector the lowest.
        let bhp = binding
            .iter()
            .map(|(_, c)| c.bhp_limit)
            .fold(if producing { f64::MIN } else { f64::MAX }, |acc, b| {
                if producing {
                    acc.max(b)
                } else {
                    acc.min(b)
                }
            });
        let drawdown = bhp - cond.average_pressure;
        let mut rates = PerPhase::ZERO;
        for (phase, c) in &configured {
            let implied_rate = cond.injectivity[*phase] * drawdown;
            // Phases whose target is still achievable at the chosen BHP
            // stay on target; the rest take what the pressure implies.
            // No backflow in either direction: a limit on the wrong side
            // of reservoir pressure shuts the phase in.
            rates[*phase] = if producing {
                implied_rate.max(c.target_rate).min(0.0)
            } else {
                implied_rate.min(c.target_rate).max(0.0)
            };
        }
        if let Some(injected) = injected_phase {
            // No backflow on uncovered phases for injectors.
            for phase in Phase::ALL {
                if phase != injected {
                    rates[phase] = 0.0;
                }
            }
        }
        ResolvedWell {
            mode: WellMode::BhpLimited,
            bhp,
            rates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producer_conditions() -> WellConditions {
        WellConditions {
            average_pressure: 1000.0,
            injectivity: PerPhase::new(1.0, 0.25, 0.5),
        }
    }

    #[test]
    fn adaptive_rate_target_honored_when_achievable() {
        // Implied BHP = 1000 + (-150)/1.0 = 850 >= limit 800.
        let control = WellControl::AdaptiveBhpRate {
            phase: Phase::Oil,
            target_rate: -150.0,
            bhp_limit: 800.0,
        };
        let r = control.resolve(&producer_conditions(), None);
        assert_eq!(r.mode, WellMode::RateTarget);
        assert_eq!(r.bhp, 850.0);
        assert_eq!(r.rates.oil, -150.0);
        // Other phases co-produce by mobility at the implied drawdown.
        assert_eq!(r.rates.water, 0.25 * (850.0 - 1000.0));
    }

    #[test]
    fn adaptive_switches_to_bhp_limit() {
        // Implied BHP = 1000 - 300 = 700 < limit 800: limit binds.
        let control = WellControl::AdaptiveBhpRate {
            phase: Phase::Oil,
            target_rate: -300.0,
            bhp_limit: 800.0,
        };
        let r = control.resolve(&producer_conditions(), None);
        assert_eq!(r.mode, WellMode::BhpLimited);
        assert_eq!(r.bhp, 800.0);
        // Realized rate is strictly less extreme than the target.
        assert_eq!(r.rates.oil, -200.0);
        assert!(r.rates.oil.abs() < 300.0);
    }

    #[test]
    fn adaptive_returns_to_rate_target_when_constraint_clears() {
        let control = WellControl::AdaptiveBhpRate {
            phase: Phase::Oil,
            target_rate: -300.0,
            bhp_limit: 800.0,
        };
        // Higher reservoir pressure: implied BHP = 1200 - 300 = 900 > 800.
        let cond = WellConditions {
            average_pressure: 1200.0,
            injectivity: PerPhase::new(1.0, 0.25, 0.5),
        };
        let r = control.resolve(&cond, None);
        assert_eq!(r.mode, WellMode::RateTarget);
        assert_eq!(r.rates.oil, -300.0);
    }

    #[test]
    fn injector_limit_caps_injection_pressure() {
        let control = WellControl::AdaptiveBhpRate {
            phase: Phase::Gas,
            target_rate: 400.0,
            bhp_limit: 1500.0,
        };
        // Implied BHP = 1000 + 400/0.5 = 1800 > 1500: limit binds.
        let r = control.resolve(&producer_conditions(), Some(Phase::Gas));
        assert_eq!(r.mode, WellMode::BhpLimited);
        assert_eq!(r.bhp, 1500.0);
        assert_eq!(r.rates.gas, 0.5 * 500.0);
        assert_eq!(r.rates.oil, 0.0);
        assert_eq!(r.rates.water, 0.0);
    }

    #[test]
    fn constant_rate_splits_by_mobility() {
        let control = WellControl::ConstantRate { rate: -350.0 };
        let r = control.resolve(&producer_conditions(), None);
        assert_eq!(r.mode, WellMode::RateTarget);
        // Total injectivity 1.75; oil fraction 1.0/1.75.
        assert!((r.rates.total() + 350.0).abs() < 1.0e-9);
        assert!((r.rates.oil - (-350.0 / 1.75)).abs() < 1.0e-9);
        assert_eq!(r.bhp, 1000.0 - 350.0 / 1.75);
    }

    #[test]
    fn producer_shuts_in_below_its_bhp_floor() {
        // Reservoir pressure under the floor: flowing would mean
        // backflow, so the well stops instead.
        let control = WellControl::AdaptiveBhpRate {
            phase: Phase::Oil,
            target_rate: -300.0,
            bhp_limit: 800.0,
        };
        let cond = WellConditions {
            average_pressure: 790.0,
            injectivity: PerPhase::new(1.0, 0.25, 0.5),
        };
        let r = control.resolve(&cond, None);
        assert_eq!(r.mode, WellMode::BhpLimited);
        assert_eq!(r.bhp, 800.0);
        assert_eq!(r.rates, PerPhase::ZERO);
    }

    #[test]
    fn zero_mobility_well_does_not_flow() {
        let control = WellControl::AdaptiveBhpRate {
            phase: Phase::Oil,
            target_rate: -300.0,
            bhp_limit: 800.0,
        };
        let cond = WellConditions {
            average_pressure: 1000.0,
            injectivity: PerPhase::ZERO,
        };
        let r = control.resolve(&cond, None);
        assert_eq!(r.rates, PerPhase::ZERO);
        assert_eq!(r.bhp, 1000.0);
    }

    #[test]
    fn multi_phase_honors_all_targets_when_unconstrained() {
        let control = WellControl::MultiPhaseRate {
            oil: Some(PhaseRateControl {
                target_rate: -100.0,
                bhp_limit: 500.0,
            }),
            water: Some(PhaseRateControl {
                target_rate: -10.0,
                bhp_limit: 500.0,
            }),
            gas: None,
        };
        let r = control.resolve(&producer_conditions(), None);
        assert_eq!(r.mode, WellMode::RateTarget);
        assert_eq!(r.rates.oil, -100.0);
        assert_eq!(r.rates.water, -10.0);
        assert_eq!(r.rates.gas, 0.0);
        // Most demanding implied pressure: oil needs 900, water 960.
        assert_eq!(r.bhp, 900.0);
    }

    #[test]
    fn multi_phase_most_restrictive_limit_wins() {
        // Oil implies 700 (< limit 750, binds); water implies
        // 1000 - 10/0.25 = 960 with limit 900 (not binding).
        let control = WellControl::MultiPhaseRate {
            oil: Some(PhaseRateControl {
                target_rate: -300.0,
                bhp_limit: 750.0,
            }),
            water: Some(PhaseRateControl {
                target_rate: -10.0,
                bhp_limit: 900.0,
            }),
            gas: Some(PhaseRateControl {
                target_rate: -400.0,
                bhp_limit: 850.0,
            }),
        };
        // Gas: implied 1000 - 400/0.5 = 200 < 850, also binding.
        // Binding limits {750, 850}: producer → the higher one (850)
        // is more restrictive to total rate.
        let r = control.resolve(&producer_conditions(), None);
        assert_eq!(r.mode, WellMode::BhpLimited);
        assert_eq!(r.bhp, 850.0);
        // Oil at 850: 1.0 × (850−1000) = −150, less extreme than target.
        assert_eq!(r.rates.oil, -150.0);
        // Water target −10 is still achievable (−37.5 implied): stays.
        assert_eq!(r.rates.water, -10.0);
        // Gas takes what the pressure implies: 0.5 × −150 = −75.
        assert_eq!(r.rates.gas, -75.0);
    }

    #[test]
    fn primary_phase_clamp_caps_water_cut() {
        let control = WellControl::PrimaryPhaseRate {
            phase: Phase::Oil,
            control: PhaseRateControl {
                target_rate: -150.0,
                bhp_limit: 500.0,
            },
            clamp: SecondaryClamp::FractionOfPrimary { max_fraction: 0.1 },
        };
        let r = control.resolve(&producer_conditions(), None);
        assert_eq!(r.rates.oil, -150.0);
        // Unclamped water would be 0.25 × (850−1000) = −37.5; cap is 15.
        assert_eq!(r.rates.water, -15.0);
    }

    #[test]
    fn primary_phase_shut_clamp_zeroes_secondaries() {
        let control = WellControl::PrimaryPhaseRate {
            phase: Phase::Gas,
            control: PhaseRateControl {
                target_rate: 200.0,
                bhp_limit: 2000.0,
            },
            clamp: SecondaryClamp::Shut,
        };
        let r = control.resolve(&producer_conditions(), Some(Phase::Gas));
        assert_eq!(r.rates.oil, 0.0);
        assert_eq!(r.rates.water, 0.0);
        assert_eq!(r.rates.gas, 200.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// An adaptive producer never reports a BHP below its limit
            /// and never exceeds its target rate magnitude.
            #[test]
            fn adaptive_producer_respects_limit_and_target(
                target in -1000.0f64..-1.0,
                limit in 100.0f64..900.0,
                pressure in 1000.0f64..3000.0,
                j_oil in 0.01f64..10.0,
            ) {
                let control = WellControl::AdaptiveBhpRate {
                    phase: Phase::Oil,
                    target_rate: target,
                    bhp_limit: limit,
                };
                let cond = WellConditions {
                    average_pressure: pressure,
                    injectivity: PerPhase::new(j_oil, 0.0, 0.0),
                };
                let r = control.resolve(&cond, None);
                prop_assert!(r.bhp >= limit - 1.0e-9, "bhp {} below limit {limit}", r.bhp);
                prop_assert!(r.rates.oil.abs() <= target.abs() + 1.0e-9);
                match r.mode {
                    WellMode::RateTarget => prop_assert_eq!(r.rates.oil, target),
                    WellMode::BhpLimited => {
                        prop_assert!(r.rates.oil.abs() < target.abs());
                    }
                }
            }
        }
    }

    #[test]
    fn validation_rejects_wrong_sign_and_empty_sets() {
        assert!(WellControl::ConstantRate { rate: 100.0 }
            .validate(true)
            .is_err());
        assert!(WellControl::ConstantRate { rate: -100.0 }
            .validate(true)
            .is_ok());
        assert!(WellControl::MultiPhaseRate {
            oil: None,
            water: None,
            gas: None
        }
        .validate(true)
        .is_err());
        assert!(WellControl::AdaptiveBhpRate {
            phase: Phase::Oil,
            target_rate: -100.0,
            bhp_limit: -5.0
        }
        .validate(true)
        .is_err());
    }
}
