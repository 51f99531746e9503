//! The simulation loop: trial steps, retries, and state emission.

use std::time::Instant;

use crate::boundary::BoundarySet;
use crate::config::{ConfigError, Scheme, SolverConfig};
use crate::mesh::{self, Connection};
use crate::metrics::StepMetrics;
use crate::pressure::{self, PressureSolution};
use crate::properties::{self, MiscibleBlend};
use crate::saturation::{self, SaturationOutcome};
use crate::state::{SimulationState, WellReport};
use crate::timer::{Timer, TimerConfig};
use crate::wellflow::{self, Perforation};
use crate::StepFailure;
use darcy_core::constants::SECONDS_PER_DAY;
use darcy_core::{RunError, StepId};
use darcy_grid::{CellGrid, FluidProperties, ReservoirModel};
use darcy_pvt::PvtModel;
use darcy_rockfluid::RockFluidTables;
use darcy_solver::CachedPreconditioner;
use darcy_wells::{WellSchedules, Wells};

/// Complete input bundle for a run.
///
/// Consumed by [`Simulation::new`], which validates every part up
/// front: invalid input is fatal at construction, never corrected.
pub struct RunConfig {
    /// Initial reservoir snapshot.
    pub model: ReservoirModel,
    /// Wells collection.
    pub wells: Wells,
    /// Rock-fluid tables.
    pub rock_fluid: RockFluidTables,
    /// PVT strategy.
    pub pvt: PvtModel,
    /// Solver configuration.
    pub solver: SolverConfig,
    /// Step-controller configuration.
    pub timer: TimerConfig,
    /// Boundary conditions (closed box by default).
    pub boundaries: BoundarySet,
    /// Time-triggered well events.
    pub schedules: WellSchedules,
}

/// The time-marching engine.
///
/// Strictly sequential: each accepted step's output is the next step's
/// input, and no state is emitted for rejected trials. Drive it through
/// its [`Iterator`] implementation — a lazy, finite, forward-only
/// sequence of [`SimulationState`]s that ends at the horizon or with
/// one fatal error.
pub struct Simulation {
    model: ReservoirModel,
    wells: Wells,
    rock_fluid: RockFluidTables,
    pvt: PvtModel,
    config: SolverConfig,
    timer: Timer,
    boundaries: BoundarySet,
    schedules: WellSchedules,
    connections: Vec<Connection>,
    well_indices: Vec<Vec<Perforation>>,
    precond: CachedPreconditioner,
    blend: Option<MiscibleBlend>,
    schedule_cursor: f64,
    last_state: Option<SimulationState>,
    finished: bool,
}

/// Everything a successful trial produced, before acceptance.
struct TrialOutcome {
    pressure: PressureSolution,
    saturations: SaturationOutcome,
    well_reports: Vec<WellReport>,
    metrics: StepMetrics,
}

impl Simulation {
    /// Validate every input and build a ready-to-run engine.
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        config.solver.validate()?;
        config.boundaries.validate()?;
        let timer = Timer::new(config.timer)?;
        let well_indices = wellflow::well_indices(&config.model, &config.wells)?;
        config.schedules.validate_against(&config.wells)?;
        let connections = mesh::connections(&config.model, &config.boundaries);
        let precond = CachedPreconditioner::new(
            config.solver.preconditioner,
            config.solver.preconditioner_update_frequency,
            config.solver.preconditioner_recompute_threshold,
        );
        let blend = properties::miscible_blend(config.solver.miscibility, &config.wells);
        Ok(Self {
            model: config.model,
            wells: config.wells,
            rock_fluid: config.rock_fluid,
            pvt: config.pvt,
            config: config.solver,
            timer,
            boundaries: config.boundaries,
            schedules: config.schedules,
            connections,
            well_indices,
            precond,
            blend,
            schedule_cursor: f64::NEG_INFINITY,
            last_state: None,
            finished: false,
        })
    }

    /// The current (most recently accepted) reservoir model.
    pub fn model(&self) -> &ReservoirModel {
        &self.model
    }

    /// The wells as currently configured (schedules applied).
    pub fn wells(&self) -> &Wells {
        &self.wells
    }

    /// The step controller.
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// The solver configuration the run uses.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The last successfully emitted state, preserved across fatal
    /// termination.
    pub fn last_state(&self) -> Option<&SimulationState> {
        self.last_state.as_ref()
    }

    /// Whether the run has terminated (horizon reached or fatal error).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn advance(&mut self) -> Option<Result<SimulationState, RunError>> {
        if self.finished {
            return None;
        }
        if self.timer.is_finished() {
            self.finished = true;
            return None;
        }

        // Fire well-schedule events due at the current clock. A change
        // in well configuration invalidates the preconditioner cache.
        let elapsed = self.timer.elapsed();
        let before = self.wells.clone();
        if let Err(e) = self
            .schedules
            .apply_due(&mut self.wells, self.schedule_cursor, elapsed)
        {
            self.finished = true;
            return Some(Err(RunError::InvalidState {
                reason: format!("well schedule: {e}"),
            }));
        }
        self.schedule_cursor = elapsed;
        if before != self.wells {
            self.precond.invalidate();
        }

        let mut rejected_attempts = 0u32;
        loop {
            let dt_seconds = self.timer.next_step_size();
            match self.try_step(dt_seconds) {
                Ok(outcome) => {
                    return Some(self.accept(dt_seconds, outcome, rejected_attempts));
                }
                Err(StepFailure::Reject(cause)) => {
                    rejected_attempts += 1;
                    if let Err(fatal) = self.timer.reject(cause) {
                        self.finished = true;
                        return Some(Err(fatal));
                    }
                }
                Err(StepFailure::Fatal(error)) => {
                    self.finished = true;
                    return Some(Err(error));
                }
            }
        }
    }

    /// Run one trial step at the given size. Rejections leave `self`
    /// untouched: the trial state is discarded wholesale.
    fn try_step(&mut self, dt_seconds: f64) -> Result<TrialOutcome, StepFailure> {
        let dt_days = dt_seconds / SECONDS_PER_DAY;
        let attempt_start = Instant::now();
        let mut metrics = StepMetrics::default();

        let t = Instant::now();
        let props = properties::evaluate(&self.model, &self.rock_fluid, &self.pvt, self.blend)
            .map_err(StepFailure::Fatal)?;
        metrics.property_eval_us = t.elapsed().as_micros() as u64;

        let t = Instant::now();
        let active = wellflow::resolve_wells(&self.model, &props, &self.wells, &self.well_indices)
            .map_err(StepFailure::Fatal)?;
        metrics.well_resolve_us = t.elapsed().as_micros() as u64;

        let t = Instant::now();
        let pressure = match self.config.scheme {
            Scheme::Impes => pressure::solve_implicit(
                &self.model,
                &props,
                &self.connections,
                &active,
                &self.boundaries,
                &self.config,
                dt_days,
                &mut self.precond,
            )?,
            Scheme::Explicit => pressure::solve_explicit(
                &self.model,
                &props,
                &self.connections,
                &active,
                &self.boundaries,
                &self.config,
                dt_days,
            ),
        };
        metrics.pressure_solve_us = t.elapsed().as_micros() as u64;
        metrics.linear_iterations = pressure.iterations;
        metrics.linear_residual = pressure.residual;

        let t = Instant::now();
        let saturations = saturation::update(
            &self.model,
            &props,
            &self.connections,
            &active,
            &self.boundaries,
            &self.config,
            self.timer.config().max_cfl_number,
            dt_days,
            &pressure.pressure,
        )
        .map_err(StepFailure::Reject)?;
        metrics.saturation_update_us = t.elapsed().as_micros() as u64;

        metrics.realized_cfl = saturations.realized_cfl;
        metrics.max_gas_saturation_change = saturations.max_gas_change;
        metrics.clamped_saturation = saturations.clamped;
        metrics.preconditioner_rebuilds = self.precond.rebuild_count();
        metrics.total_us = attempt_start.elapsed().as_micros() as u64;

        let well_reports = active
            .iter()
            .map(|a| WellReport {
                name: a.well.name().to_string(),
                mode: a.resolved.mode,
                bhp: a.resolved.bhp,
                rates: a.resolved.rates,
            })
            .collect();

        Ok(TrialOutcome {
            pressure,
            saturations,
            well_reports,
            metrics,
        })
    }

    /// Commit an accepted trial: build the successor model, advance the
    /// clock, and emit the state.
    fn accept(
        &mut self,
        dt_seconds: f64,
        outcome: TrialOutcome,
        rejected_attempts: u32,
    ) -> Result<SimulationState, RunError> {
        let fluid = self
            .rebuild_fluid(&outcome.pressure.pressure, &outcome.saturations)
            .map_err(|e| {
                self.finished = true;
                e
            })?;
        let model = self.model.with_fluid(fluid).map_err(|e| {
            self.finished = true;
            RunError::InvalidState {
                reason: format!("accepted step produced an invalid model: {e}"),
            }
        })?;

        self.timer
            .accept(dt_seconds, outcome.saturations.realized_cfl);
        self.model = model.clone();

        let mut metrics = outcome.metrics;
        metrics.rejected_attempts = rejected_attempts;

        let state = SimulationState {
            step: StepId(self.timer.steps_accepted()),
            step_size: dt_seconds,
            time: self.timer.elapsed(),
            model,
            wells: self.wells.clone(),
            injection: outcome.saturations.injection,
            production: outcome.saturations.production,
            well_reports: outcome.well_reports,
            metrics,
        };
        self.last_state = Some(state.clone());
        Ok(state)
    }

    /// Build the successor fluid bundle: new pressure and saturations,
    /// PVT-derived grids re-evaluated at the new pressure so the
    /// emitted snapshot is self-consistent.
    fn rebuild_fluid(
        &self,
        pressure: &[f64],
        saturations: &SaturationOutcome,
    ) -> Result<FluidProperties, RunError> {
        let shape = self.model.shape();
        let n = shape.cell_count();
        let old = self.model.fluid();

        let mut fluid = FluidProperties {
            pressure: CellGrid::new(shape, pressure.to_vec()).map_err(|e| {
                RunError::InvalidState {
                    reason: e.to_string(),
                }
            })?,
            temperature: old.temperature.clone(),
            bubble_point_pressure: old.bubble_point_pressure.clone(),
            oil_saturation: CellGrid::new(shape, saturations.oil.clone()).expect("shape checked"),
            water_saturation: CellGrid::new(shape, saturations.water.clone())
                .expect("shape checked"),
            gas_saturation: CellGrid::new(shape, saturations.gas.clone()).expect("shape checked"),
            oil_viscosity: old.oil_viscosity.clone(),
            water_viscosity: old.water_viscosity.clone(),
            gas_viscosity: old.gas_viscosity.clone(),
            oil_fvf: old.oil_fvf.clone(),
            water_fvf: old.water_fvf.clone(),
            gas_fvf: old.gas_fvf.clone(),
            solution_gor: old.solution_gor.clone(),
            oil_specific_gravity: old.oil_specific_gravity.clone(),
            gas_specific_gravity: old.gas_specific_gravity.clone(),
            water_specific_gravity: old.water_specific_gravity.clone(),
            oil_compressibility: old.oil_compressibility.clone(),
            water_compressibility: old.water_compressibility.clone(),
            gas_compressibility: old.gas_compressibility.clone(),
        };

        for rank in 0..n {
            if !self.model.is_active(rank) {
                continue;
            }
            let p = fluid.pressure.at(rank);
            if !p.is_finite() || p <= 0.0 {
                return Err(RunError::InvalidState {
                    reason: format!("non-physical pressure {p} at cell {rank}"),
                });
            }
            let props = self
                .pvt
                .evaluate(p, fluid.temperature.at(rank), fluid.bubble_point_pressure.at(rank))
                .map_err(|e| RunError::InvalidState {
                    reason: format!("PVT at accepted pressure, cell {rank}: {e}"),
                })?;
            fluid.oil_viscosity.set(rank, props.oil_viscosity);
            fluid.water_viscosity.set(rank, props.water_viscosity);
            fluid.gas_viscosity.set(rank, props.gas_viscosity);
            fluid.oil_fvf.set(rank, props.oil_fvf);
            fluid.water_fvf.set(rank, props.water_fvf);
            fluid.gas_fvf.set(rank, props.gas_fvf);
            fluid.solution_gor.set(rank, props.solution_gor);
            fluid.oil_compressibility.set(rank, props.oil_compressibility);
            fluid
                .water_compressibility
                .set(rank, props.water_compressibility);
            fluid.gas_compressibility.set(rank, props.gas_compressibility);
        }

        Ok(fluid)
    }
}

impl Iterator for Simulation {
    type Item = Result<SimulationState, RunError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("steps_accepted", &self.timer.steps_accepted())
            .field("elapsed_s", &self.timer.elapsed())
            .field("finished", &self.finished)
            .field("wells", &self.wells.iter().count())
            .field("cells", &self.model.shape().cell_count())
            .finish()
    }
}
