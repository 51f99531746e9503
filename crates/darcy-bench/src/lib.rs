//! Benchmark profiles for the Darcy reservoir simulator.
//!
//! Provides pre-built [`RunConfig`] profiles:
//!
//! - [`reference_profile`]: 20×20×3 grid (1.2K cells) with a five-spot
//!   well pattern
//! - [`stress_profile`]: 50×50×10 grid (25K cells), same pattern

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use darcy_core::Time;
use darcy_engine::{BoundarySet, RunConfig, SolverConfig, TimerConfig};
use darcy_test_utils::{correlation_pvt, rate_producer, standard_tables, uniform_model, water_injector};
use darcy_wells::{WellSchedules, Wells};

/// A five-spot pattern on an `nx × ny × nz` uniform box: four corner
/// injectors and one center producer, rate-balanced.
fn five_spot(dims: (usize, usize, usize), rate: f64) -> Wells {
    let (nx, ny, _) = dims;
    let corner = |i, j, n| water_injector(&format!("I-{n}"), (i, j, 0), rate / 4.0);
    Wells::new(
        vec![
            corner(0, 0, 1),
            corner(nx - 1, 0, 2),
            corner(0, ny - 1, 3),
            corner(nx - 1, ny - 1, 4),
        ],
        vec![rate_producer("P-1", (nx / 2, ny / 2, 0), -rate)],
    )
    .expect("valid five-spot")
}

fn profile(dims: (usize, usize, usize), horizon_days: f64) -> RunConfig {
    RunConfig {
        model: uniform_model(dims),
        wells: five_spot(dims, 2000.0),
        rock_fluid: standard_tables(),
        pvt: correlation_pvt(),
        solver: SolverConfig::default(),
        timer: TimerConfig {
            initial_step_size: Time::hours(12.0),
            min_step_size: Time::hours(1.0),
            max_step_size: Time::days(2.0),
            simulation_time: Time::days(horizon_days),
            max_cfl_number: 0.9,
            ramp_up_factor: 1.2,
            backoff_factor: 0.5,
            aggressive_backoff_factor: 0.25,
            max_rejects: 10,
        },
        boundaries: BoundarySet::closed(),
        schedules: WellSchedules::new(),
    }
}

/// Reference benchmark profile: 20×20×3 grid, five-spot pattern.
pub fn reference_profile() -> RunConfig {
    profile((20, 20, 3), 30.0)
}

/// Stress benchmark profile: 50×50×10 grid, five-spot pattern.
pub fn stress_profile() -> RunConfig {
    profile((50, 50, 10), 10.0)
}
