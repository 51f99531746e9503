//! Explicit saturation update with stability checks.

use crate::boundary::{BoundaryCondition, BoundarySet, Face};
use crate::config::SolverConfig;
use crate::mesh::{self, Connection};
use crate::properties::PropertyField;
use crate::wellflow::ActiveWell;
use darcy_core::{Phase, StepRejection};
use darcy_grid::{RateGrids, ReservoirModel};
use darcy_wells::WellKind;

/// Result of advancing saturations over one trial step.
#[derive(Clone, Debug)]
pub(crate) struct SaturationOutcome {
    /// New water saturation per cell.
    pub water: Vec<f64>,
    /// New oil saturation per cell (closure phase).
    pub oil: Vec<f64>,
    /// New gas saturation per cell.
    pub gas: Vec<f64>,
    /// Per-phase injection rates for the step, ft³/day (positive).
    pub injection: RateGrids,
    /// Per-phase production rates for the step, ft³/day (negative).
    pub production: RateGrids,
    /// Realized CFL number (max throughput over pore volume).
    pub realized_cfl: f64,
    /// Largest per-cell gas-saturation change.
    pub max_gas_change: f64,
    /// Total saturation clamped back into the physical range.
    pub clamped: f64,
}

/// Per-cell net volumetric rates accumulated during the sweep.
struct FlowTally {
    net_water: Vec<f64>,
    net_gas: Vec<f64>,
    outflux: Vec<f64>,
}

impl FlowTally {
    fn new(n: usize) -> Self {
        Self {
            net_water: vec![0.0; n],
            net_gas: vec![0.0; n],
            outflux: vec![0.0; n],
        }
    }

    /// Record a phase flow of `q` from `from` into `to` (q >= 0).
    fn transfer(&mut self, phase: Phase, from: usize, to: usize, q: f64) {
        debug_assert!(q >= 0.0);
        match phase {
            Phase::Water => {
                self.net_water[from] -= q;
                self.net_water[to] += q;
            }
            Phase::Gas => {
                self.net_gas[from] -= q;
                self.net_gas[to] += q;
            }
            Phase::Oil => {}
        }
        self.outflux[from] += q;
    }

    /// Record an external source (`q > 0`) or sink (`q < 0`).
    ///
    /// Either direction moves fluid through the cell, so the magnitude
    /// counts toward the CFL throughput.
    fn external(&mut self, phase: Phase, rank: usize, q: f64) {
        match phase {
            Phase::Water => self.net_water[rank] += q,
            Phase::Gas => self.net_gas[rank] += q,
            Phase::Oil => {}
        }
        self.outflux[rank] += q.abs();
    }
}

/// Advance water and gas saturations explicitly; oil closes the system.
///
/// Fluxes use the newly solved pressure with donor-cell (upwind) phase
/// mobilities; each phase upwinds on its own potential, including the
/// capillary offset when capillary effects are enabled.
#[allow(clippy::too_many_arguments)]
pub(crate) fn update(
    model: &ReservoirModel,
    props: &PropertyField,
    connections: &[Connection],
    wells: &[ActiveWell<'_>],
    boundaries: &BoundarySet,
    config: &SolverConfig,
    max_cfl: f64,
    dt_days: f64,
    pressure: &[f64],
) -> Result<SaturationOutcome, StepRejection> {
    let shape = model.shape();
    let n = shape.cell_count();
    let fluid = model.fluid();
    let mut tally = FlowTally::new(n);
    let mut injection = RateGrids::zeros(shape);
    let mut production = RateGrids::zeros(shape);

    let cap = if config.capillary_effects {
        config.capillary_strength
    } else {
        0.0
    };

    // Inter-cell phase fluxes.
    for conn in connections {
        let (a, b) = (conn.a, conn.b);
        for phase in Phase::ALL {
            let (offset_a, offset_b) = match phase {
                Phase::Oil => (0.0, 0.0),
                Phase::Water => (-cap * props.pc_ow[a], -cap * props.pc_ow[b]),
                Phase::Gas => (cap * props.pc_go[a], cap * props.pc_go[b]),
            };
            let potential = (pressure[a] + offset_a) - (pressure[b] + offset_b);
            let (donor, receiver, drop) = if potential >= 0.0 {
                (a, b, potential)
            } else {
                (b, a, -potential)
            };
            let mobility = match phase {
                Phase::Oil => props.mobility_oil[donor],
                Phase::Water => props.mobility_water[donor],
                Phase::Gas => props.mobility_gas[donor],
            };
            let q = conn.transmissibility * mobility * drop;
            if q > 0.0 {
                tally.transfer(phase, donor, receiver, q);
            }
        }
    }

    // Well source/sink volumes, distributed over perforations.
    for active in wells {
        match active.well.kind() {
            WellKind::Injector(_) => {
                let phase = active.injected_phase.expect("injector has a phase");
                let rate = active.resolved.rates[phase];
                if rate <= 0.0 {
                    continue;
                }
                let weights = crate::pressure::perforation_weights(active, props);
                for (perf, w) in active.perforations.iter().zip(&weights) {
                    let q = rate * w;
                    tally.external(phase, perf.rank, q);
                    let grid = injection.phase_mut(phase);
                    grid.set(perf.rank, grid.at(perf.rank) + q);
                }
            }
            WellKind::Producer(_) => {
                for phase in Phase::ALL {
                    let rate = active.resolved.rates[phase];
                    if rate >= 0.0 {
                        continue;
                    }
                    let weights = phase_weights(active, props, phase);
                    for (perf, w) in active.perforations.iter().zip(&weights) {
                        let q = rate * w;
                        tally.external(phase, perf.rank, q);
                        let grid = production.phase_mut(phase);
                        grid.set(perf.rank, grid.at(perf.rank) + q);
                    }
                }
            }
        }
    }

    // Boundary fluxes.
    for face in Face::ALL {
        match boundaries.face(face) {
            BoundaryCondition::NoFlow | BoundaryCondition::Periodic => {}
            BoundaryCondition::ConstantPressure { pressure: pb } => {
                for (rank, t_half) in mesh::boundary_cells(model, face) {
                    let total = props.total_mobility(rank);
                    if total <= 0.0 {
                        continue;
                    }
                    let q_total = t_half * total * (pb - pressure[rank]);
                    // Split across phases by fractional mobility.
                    for phase in Phase::ALL {
                        let mobility = match phase {
                            Phase::Oil => props.mobility_oil[rank],
                            Phase::Water => props.mobility_water[rank],
                            Phase::Gas => props.mobility_gas[rank],
                        };
                        tally.external(phase, rank, q_total * mobility / total);
                    }
                }
            }
            BoundaryCondition::Aquifer {
                pressure: pb,
                productivity_index,
            } => {
                for (rank, _) in mesh::boundary_cells(model, face) {
                    tally.external(Phase::Water, rank, productivity_index * (pb - pressure[rank]));
                }
            }
        }
    }

    // Advance, clamp, and re-close the saturation triple.
    let mut water = fluid.water_saturation.as_slice().to_vec();
    let mut gas = fluid.gas_saturation.as_slice().to_vec();
    let mut oil = fluid.oil_saturation.as_slice().to_vec();
    let mut realized_cfl = 0.0f64;
    let mut max_gas_change = 0.0f64;
    let mut clamped = 0.0f64;

    for rank in 0..n {
        if !model.is_active(rank) {
            continue;
        }
        let pore_volume = model.pore_volume(rank);
        if pore_volume <= 0.0 {
            continue;
        }
        realized_cfl = realized_cfl.max(dt_days * tally.outflux[rank] / pore_volume);

        let sw_raw = water[rank] + dt_days * tally.net_water[rank] / pore_volume;
        let sg_raw = gas[rank] + dt_days * tally.net_gas[rank] / pore_volume;
        max_gas_change = max_gas_change.max((sg_raw - gas[rank]).abs());

        let sw = sw_raw.clamp(0.0, 1.0);
        let sg = sg_raw.clamp(0.0, 1.0);
        clamped += (sw_raw - sw).abs() + (sg_raw - sg).abs();

        let so_raw = 1.0 - sw - sg;
        let so = so_raw.clamp(0.0, 1.0);
        clamped += (so_raw - so).abs();

        // Renormalize so the triple sums to one exactly.
        let total = sw + sg + so;
        water[rank] = sw / total;
        gas[rank] = sg / total;
        oil[rank] = so / total;
    }

    if realized_cfl > max_cfl {
        return Err(StepRejection::CflExceeded {
            cfl: realized_cfl,
            limit: max_cfl,
        });
    }
    if max_gas_change > config.max_gas_saturation_change {
        return Err(StepRejection::GasSaturationChange {
            change: max_gas_change,
            limit: config.max_gas_saturation_change,
        });
    }
    if clamped > config.saturation_clamp_tolerance {
        return Err(StepRejection::SaturationClamp {
            clamped,
            tolerance: config.saturation_clamp_tolerance,
        });
    }

    Ok(SaturationOutcome {
        water,
        oil,
        gas,
        injection,
        production,
        realized_cfl,
        max_gas_change,
        clamped,
    })
}

/// Distribution weights for one produced phase over the perforations,
/// proportional to well index × that phase's mobility.
fn phase_weights(active: &ActiveWell<'_>, props: &PropertyField, phase: Phase) -> Vec<f64> {
    let raw: Vec<f64> = active
        .perforations
        .iter()
        .map(|perf| {
            let mobility = match phase {
                Phase::Oil => props.mobility_oil[perf.rank],
                Phase::Water => props.mobility_water[perf.rank],
                Phase::Gas => props.mobility_gas[perf.rank],
            };
            perf.well_index * mobility
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    if sum <= 0.0 {
        let even = 1.0 / raw.len().max(1) as f64;
        return vec![even; raw.len()];
    }
    raw.into_iter().map(|w| w / sum).collect()
}
