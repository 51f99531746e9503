//! Exhausting the consecutive-rejection budget is fatal.
//!
//! A deliberately impossible pressure solve (one iteration against a
//! 1e-16 tolerance, no preconditioner) rejects every trial. With
//! `max_rejects = 3` and a minimum step size that cannot help, the run
//! must terminate with `RejectBudgetExhausted` after exactly three
//! consecutive rejections, and the sequence must end there.

use darcy_core::{RunError, StepRejection, Time};
use darcy_engine::{BoundarySet, RunConfig, Simulation, SolverConfig, TimerConfig};
use darcy_solver::{LinearSolver, PreconditionerKind};
use darcy_test_utils::{correlation_pvt, standard_tables, uniform_model, water_injector};
use darcy_wells::{WellSchedules, Wells};

fn doomed_run(max_rejects: u32) -> Simulation {
    let mut solver = SolverConfig::default();
    solver.method = LinearSolver::BiCgStab;
    solver.preconditioner = PreconditionerKind::None;
    solver.max_iterations = 1;
    solver.pressure_convergence_tolerance = 1.0e-16;
    // A well keeps the right-hand side off the warm start, so the
    // starved solve can never be satisfied.
    let wells = Wells::new(vec![water_injector("I-1", (0, 0, 0), 1000.0)], vec![]).unwrap();
    Simulation::new(RunConfig {
        model: uniform_model((4, 4, 1)),
        wells,
        rock_fluid: standard_tables(),
        pvt: correlation_pvt(),
        solver,
        timer: TimerConfig {
            initial_step_size: Time::seconds_f64(1.0),
            min_step_size: Time::seconds_f64(1.0),
            max_step_size: Time::days(1.0),
            simulation_time: Time::days(10.0),
            max_cfl_number: 0.9,
            ramp_up_factor: 1.2,
            backoff_factor: 0.5,
            aggressive_backoff_factor: 0.25,
            max_rejects,
        },
        boundaries: BoundarySet::closed(),
        schedules: WellSchedules::new(),
    })
    .expect("configuration itself is valid")
}

#[test]
fn run_fails_after_exactly_three_rejections() {
    let mut sim = doomed_run(3);
    match sim.next() {
        Some(Err(RunError::RejectBudgetExhausted { rejects, last_cause })) => {
            assert_eq!(rejects, 3);
            assert!(
                matches!(last_cause, StepRejection::NonConvergence { .. }),
                "expected a non-convergence cause, got {last_cause:?}"
            );
        }
        other => panic!("expected RejectBudgetExhausted, got {other:?}"),
    }
    // The sequence is over; nothing was ever emitted.
    assert!(sim.next().is_none());
    assert!(sim.is_finished());
    assert!(sim.last_state().is_none());
    assert_eq!(sim.timer().steps_accepted(), 0);
}

#[test]
fn budget_of_one_fails_on_the_first_rejection() {
    let mut sim = doomed_run(1);
    match sim.next() {
        Some(Err(RunError::RejectBudgetExhausted { rejects, .. })) => assert_eq!(rejects, 1),
        other => panic!("expected RejectBudgetExhausted, got {other:?}"),
    }
}

#[test]
fn last_state_survives_a_late_fatal_error() {
    // A healthy run first: default solver, same wells.
    let wells = Wells::new(vec![water_injector("I-1", (0, 0, 0), 1000.0)], vec![]).unwrap();
    let mut sim = Simulation::new(RunConfig {
        model: uniform_model((4, 4, 1)),
        wells,
        rock_fluid: standard_tables(),
        pvt: correlation_pvt(),
        solver: SolverConfig::default(),
        timer: TimerConfig {
            initial_step_size: Time::days(1.0),
            min_step_size: Time::hours(1.0),
            max_step_size: Time::days(1.0),
            simulation_time: Time::days(5.0),
            max_cfl_number: 0.9,
            ramp_up_factor: 1.2,
            backoff_factor: 0.5,
            aggressive_backoff_factor: 0.25,
            max_rejects: 3,
        },
        boundaries: BoundarySet::closed(),
        schedules: WellSchedules::new(),
    })
    .unwrap();

    let first = sim.next().expect("a first step").expect("step succeeds");
    assert_eq!(first.step.0, 1);
    // Whatever happens afterwards, the emitted state stays addressable.
    let held = sim.last_state().expect("retained").clone();
    assert_eq!(held.step, first.step);
    assert_eq!(
        held.model.fluid().pressure.as_slice(),
        first.model.fluid().pressure.as_slice()
    );
}
