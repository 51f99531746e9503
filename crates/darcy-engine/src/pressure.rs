//! Pressure-equation assembly and solve.

use crate::boundary::{BoundaryCondition, BoundarySet, Face};
use crate::config::SolverConfig;
use crate::mesh::{self, Connection};
use crate::properties::PropertyField;
use crate::wellflow::ActiveWell;
use crate::StepFailure;
use darcy_core::{RunError, StepRejection};
use darcy_grid::ReservoirModel;
use darcy_solver::{CachedPreconditioner, TripletBuilder};
use darcy_wells::WellMode;

/// Result of one pressure update (implicit or explicit).
#[derive(Clone, Debug)]
pub(crate) struct PressureSolution {
    /// New pressure per cell rank; inactive cells keep their old value.
    pub pressure: Vec<f64>,
    /// Linear iterations spent (zero for the explicit scheme).
    pub iterations: u32,
    /// Final relative residual (zero for the explicit scheme).
    pub residual: f64,
}

/// Face total mobility with donor-cell upwinding by current pressure.
///
/// Under the pseudo-pressure option the gas term is scaled by the ratio
/// of the squared-pressure face average to the donor pressure, which
/// linearizes gas compressibility at low pressure.
fn face_total_mobility(
    props: &PropertyField,
    p: &[f64],
    a: usize,
    b: usize,
    pseudo_pressure: bool,
) -> f64 {
    let donor = if p[a] >= p[b] { a } else { b };
    let mut lambda = props.mobility_oil[donor] + props.mobility_water[donor];
    let mut gas = props.mobility_gas[donor];
    if pseudo_pressure && gas > 0.0 && p[donor] > 0.0 {
        let p_sq = ((p[a] * p[a] + p[b] * p[b]) / 2.0).sqrt();
        gas *= p_sq / p[donor];
    }
    lambda += gas;
    lambda
}

/// Capillary contribution to the total-flow RHS across one face, as
/// seen from cell `a` (negate for `b`).
fn face_capillary_rhs(
    props: &PropertyField,
    p: &[f64],
    conn: &Connection,
    strength: f64,
) -> f64 {
    let (a, b) = (conn.a, conn.b);
    let donor = if p[a] >= p[b] { a } else { b };
    let lw = props.mobility_water[donor];
    let lg = props.mobility_gas[donor];
    strength
        * conn.transmissibility
        * (lw * (props.pc_ow[a] - props.pc_ow[b]) + lg * (props.pc_go[b] - props.pc_go[a]))
}

/// Assemble and solve the implicit (IMPES) pressure system.
#[allow(clippy::too_many_arguments)]
pub(crate) fn solve_implicit(
    model: &ReservoirModel,
    props: &PropertyField,
    connections: &[Connection],
    wells: &[ActiveWell<'_>],
    boundaries: &BoundarySet,
    config: &SolverConfig,
    dt_days: f64,
    precond: &mut CachedPreconditioner,
) -> Result<PressureSolution, StepFailure> {
    let n = model.shape().cell_count();
    let old_pressure: Vec<f64> = model.fluid().pressure.as_slice().to_vec();

    // Equation numbering over active cells only.
    let mut eq_of = vec![usize::MAX; n];
    let mut rank_of = Vec::new();
    for rank in 0..n {
        if model.is_active(rank) {
            eq_of[rank] = rank_of.len();
            rank_of.push(rank);
        }
    }
    let n_eq = rank_of.len();

    let mut builder = TripletBuilder::new(n_eq);
    let mut rhs = vec![0.0; n_eq];

    // Accumulation: V_p c_t / Δt on the diagonal, anchored to the old
    // pressure on the right-hand side.
    for (&rank, eq) in rank_of.iter().zip(0..n_eq) {
        let acc = model.pore_volume(rank) * model.total_compressibility(rank) / dt_days;
        builder.add(eq, eq, acc);
        rhs[eq] += acc * old_pressure[rank];
    }

    // Inter-cell flow terms.
    for conn in connections {
        let lambda = face_total_mobility(props, &old_pressure, conn.a, conn.b, config.pseudo_pressure);
        let t = conn.transmissibility * lambda;
        if t <= 0.0 {
            continue;
        }
        let (ea, eb) = (eq_of[conn.a], eq_of[conn.b]);
        builder.add(ea, ea, t);
        builder.add(eb, eb, t);
        builder.add(ea, eb, -t);
        builder.add(eb, ea, -t);
        if config.capillary_effects {
            let cap = face_capillary_rhs(props, &old_pressure, conn, config.capillary_strength);
            rhs[ea] += cap;
            rhs[eb] -= cap;
        }
    }

    // Well terms: rate wells load the right-hand side, BHP-limited
    // wells couple implicitly through their injectivity.
    for active in wells {
        match active.resolved.mode {
            WellMode::RateTarget => {
                let total = active.resolved.rates.total();
                let weights = perforation_weights(active, props);
                for (perf, w) in active.perforations.iter().zip(&weights) {
                    rhs[eq_of[perf.rank]] += total * w;
                }
            }
            WellMode::BhpLimited => {
                // A shut-in well (limit on the wrong side of reservoir
                // pressure) contributes nothing to the system.
                if active.resolved.rates.total() == 0.0 {
                    continue;
                }
                let bhp = active.resolved.bhp;
                for perf in active.perforations {
                    let j = perf.well_index * props.total_mobility(perf.rank);
                    let eq = eq_of[perf.rank];
                    builder.add(eq, eq, j);
                    rhs[eq] += j * bhp;
                }
            }
        }
    }

    // Boundary contributions.
    for face in Face::ALL {
        match boundaries.face(face) {
            BoundaryCondition::NoFlow | BoundaryCondition::Periodic => {}
            BoundaryCondition::ConstantPressure { pressure } => {
                for (rank, t_half) in mesh::boundary_cells(model, face) {
                    let t = t_half * props.total_mobility(rank);
                    let eq = eq_of[rank];
                    builder.add(eq, eq, t);
                    rhs[eq] += t * pressure;
                }
            }
            BoundaryCondition::Aquifer {
                pressure,
                productivity_index,
            } => {
                for (rank, _) in mesh::boundary_cells(model, face) {
                    let eq = eq_of[rank];
                    builder.add(eq, eq, productivity_index);
                    rhs[eq] += productivity_index * pressure;
                }
            }
        }
    }

    let matrix = builder.build();
    let preconditioner = precond
        .get(&matrix)
        .map_err(|e| StepFailure::Fatal(RunError::LinearSolverFailure { reason: e.to_string() }))?;

    // Warm start from the previous pressure field.
    let mut x: Vec<f64> = rank_of.iter().map(|&r| old_pressure[r]).collect();
    let report = darcy_solver::solve(
        config.method,
        &matrix,
        &rhs,
        &mut x,
        preconditioner,
        config.pressure_convergence_tolerance,
        config.max_iterations,
    )
    .map_err(|e| StepFailure::Fatal(RunError::LinearSolverFailure { reason: e.to_string() }))?;

    if !report.converged {
        return Err(StepFailure::Reject(StepRejection::NonConvergence {
            iterations: report.iterations,
            residual: report.residual,
        }));
    }

    let mut pressure = old_pressure;
    for (&rank, &value) in rank_of.iter().zip(&x) {
        pressure[rank] = value;
    }
    Ok(PressureSolution {
        pressure,
        iterations: report.iterations,
        residual: report.residual,
    })
}

/// Fully explicit pressure update: one flux-divergence sweep.
pub(crate) fn solve_explicit(
    model: &ReservoirModel,
    props: &PropertyField,
    connections: &[Connection],
    wells: &[ActiveWell<'_>],
    boundaries: &BoundarySet,
    config: &SolverConfig,
    dt_days: f64,
) -> PressureSolution {
    let n = model.shape().cell_count();
    let old_pressure: Vec<f64> = model.fluid().pressure.as_slice().to_vec();
    let mut net = vec![0.0; n];

    for conn in connections {
        let lambda =
            face_total_mobility(props, &old_pressure, conn.a, conn.b, config.pseudo_pressure);
        let mut q = conn.transmissibility * lambda * (old_pressure[conn.b] - old_pressure[conn.a]);
        if config.capillary_effects {
            q += face_capillary_rhs(props, &old_pressure, conn, config.capillary_strength);
        }
        net[conn.a] += q;
        net[conn.b] -= q;
    }

    for active in wells {
        match active.resolved.mode {
            WellMode::RateTarget => {
                let total = active.resolved.rates.total();
                let weights = perforation_weights(active, props);
                for (perf, w) in active.perforations.iter().zip(&weights) {
                    net[perf.rank] += total * w;
                }
            }
            WellMode::BhpLimited => {
                if active.resolved.rates.total() == 0.0 {
                    continue;
                }
                let bhp = active.resolved.bhp;
                for perf in active.perforations {
                    let j = perf.well_index * props.total_mobility(perf.rank);
                    net[perf.rank] += j * (bhp - old_pressure[perf.rank]);
                }
            }
        }
    }

    for face in Face::ALL {
        match boundaries.face(face) {
            BoundaryCondition::NoFlow | BoundaryCondition::Periodic => {}
            BoundaryCondition::ConstantPressure { pressure } => {
                for (rank, t_half) in mesh::boundary_cells(model, face) {
                    let t = t_half * props.total_mobility(rank);
                    net[rank] += t * (pressure - old_pressure[rank]);
                }
            }
            BoundaryCondition::Aquifer {
                pressure,
                productivity_index,
            } => {
                for (rank, _) in mesh::boundary_cells(model, face) {
                    net[rank] += productivity_index * (pressure - old_pressure[rank]);
                }
            }
        }
    }

    let mut pressure = old_pressure;
    for rank in 0..n {
        if !model.is_active(rank) {
            continue;
        }
        let acc = model.pore_volume(rank) * model.total_compressibility(rank);
        if acc > 0.0 {
            pressure[rank] += dt_days * net[rank] / acc;
        }
    }
    PressureSolution {
        pressure,
        iterations: 0,
        residual: 0.0,
    }
}

/// Distribution weights of a well's total rate over its perforations,
/// proportional to well index × total mobility.
pub(crate) fn perforation_weights(active: &ActiveWell<'_>, props: &PropertyField) -> Vec<f64> {
    let raw: Vec<f64> = active
        .perforations
        .iter()
        .map(|perf| perf.well_index * props.total_mobility(perf.rank))
        .collect();
    let sum: f64 = raw.iter().sum();
    if sum <= 0.0 {
        let even = 1.0 / raw.len().max(1) as f64;
        return vec![even; raw.len()];
    }
    raw.into_iter().map(|w| w / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Miscibility;
    use crate::properties;
    use darcy_solver::PreconditionerKind;
    use darcy_test_utils::{
        correlation_pvt, rate_producer, standard_tables, uniform_model, water_injector,
    };
    use darcy_wells::Wells;

    fn setup(
        model: &ReservoirModel,
        wells: &Wells,
    ) -> (PropertyField, Vec<Vec<crate::wellflow::Perforation>>) {
        let props = properties::evaluate(
            model,
            &standard_tables(),
            &correlation_pvt(),
            properties::miscible_blend(Miscibility::Immiscible, wells),
        )
        .unwrap();
        let indices = crate::wellflow::well_indices(model, wells).unwrap();
        (props, indices)
    }

    #[test]
    fn no_wells_no_flux_pressure_is_stationary() {
        let model = uniform_model((3, 3, 1));
        let wells = Wells::default();
        let (props, indices) = setup(&model, &wells);
        let active = crate::wellflow::resolve_wells(&model, &props, &wells, &indices).unwrap();
        let connections = mesh::connections(&model, &BoundarySet::closed());
        let config = SolverConfig::default();
        let mut precond = CachedPreconditioner::new(PreconditionerKind::Ilu0, 10, 0.3);
        let solution = solve_implicit(
            &model,
            &props,
            &connections,
            &active,
            &BoundarySet::closed(),
            &config,
            1.0,
            &mut precond,
        )
        .unwrap();
        for &p in &solution.pressure {
            assert!((p - 3000.0).abs() < 1.0e-6, "p = {p}");
        }
    }

    #[test]
    fn injection_raises_and_production_lowers_pressure() {
        let model = uniform_model((4, 1, 1));
        let wells = Wells::new(
            vec![water_injector("I-1", (0, 0, 0), 2000.0)],
            vec![rate_producer("P-1", (3, 0, 0), -2000.0)],
        )
        .unwrap();
        let (props, indices) = setup(&model, &wells);
        let active = crate::wellflow::resolve_wells(&model, &props, &wells, &indices).unwrap();
        let connections = mesh::connections(&model, &BoundarySet::closed());
        let config = SolverConfig::default();
        let mut precond = CachedPreconditioner::new(PreconditionerKind::Ilu0, 10, 0.3);
        let solution = solve_implicit(
            &model,
            &props,
            &connections,
            &active,
            &BoundarySet::closed(),
            &config,
            0.5,
            &mut precond,
        )
        .unwrap();
        let shape = model.shape();
        assert!(solution.pressure[shape.rank((0, 0, 0))] > 3000.0);
        assert!(solution.pressure[shape.rank((3, 0, 0))] < 3000.0);
    }

    #[test]
    fn constant_pressure_boundary_anchors_the_field() {
        let model = uniform_model((3, 1, 1));
        let wells = Wells::new(vec![], vec![rate_producer("P-1", (1, 0, 0), -1000.0)]).unwrap();
        let (props, indices) = setup(&model, &wells);
        let active = crate::wellflow::resolve_wells(&model, &props, &wells, &indices).unwrap();
        let boundaries = BoundarySet::closed().with_face(
            Face::XMin,
            BoundaryCondition::ConstantPressure { pressure: 3000.0 },
        );
        let connections = mesh::connections(&model, &boundaries);
        let config = SolverConfig::default();
        let mut precond = CachedPreconditioner::new(PreconditionerKind::Diagonal, 10, 0.3);
        let solution = solve_implicit(
            &model,
            &props,
            &connections,
            &active,
            &boundaries,
            &config,
            1.0,
            &mut precond,
        )
        .unwrap();
        // The supported edge sits closer to the boundary pressure than
        // the produced interior.
        let shape = model.shape();
        let edge = solution.pressure[shape.rank((0, 0, 0))];
        let middle = solution.pressure[shape.rank((1, 0, 0))];
        assert!(edge > middle, "edge {edge} vs middle {middle}");
    }

    #[test]
    fn tiny_iteration_budget_rejects_the_step() {
        let model = uniform_model((6, 6, 1));
        let wells = Wells::new(vec![water_injector("I-1", (0, 0, 0), 5000.0)], vec![]).unwrap();
        let (props, indices) = setup(&model, &wells);
        let active = crate::wellflow::resolve_wells(&model, &props, &wells, &indices).unwrap();
        let connections = mesh::connections(&model, &BoundarySet::closed());
        let mut config = SolverConfig::default();
        config.max_iterations = 1;
        config.pressure_convergence_tolerance = 1.0e-12;
        config.preconditioner = PreconditionerKind::None;
        let mut precond = CachedPreconditioner::new(PreconditionerKind::None, 10, 0.3);
        let result = solve_implicit(
            &model,
            &props,
            &connections,
            &active,
            &BoundarySet::closed(),
            &config,
            1.0,
            &mut precond,
        );
        assert!(matches!(
            result,
            Err(StepFailure::Reject(StepRejection::NonConvergence { .. }))
        ));
    }
}
