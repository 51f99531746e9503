//! The per-step simulation state emitted to consumers.

use crate::metrics::StepMetrics;
use darcy_core::constants::{DAYS_PER_YEAR, SECONDS_PER_DAY};
use darcy_core::{PerPhase, StepId};
use darcy_grid::{RateGrids, ReservoirModel};
use darcy_wells::{WellMode, Wells};

/// One well's operating point during an accepted step.
#[derive(Clone, Debug, PartialEq)]
pub struct WellReport {
    /// Well name.
    pub name: String,
    /// Which constraint the well operated on.
    pub mode: WellMode,
    /// Bottom-hole pressure, psia.
    pub bhp: f64,
    /// Realized per-phase rates, ft³/day (negative produces).
    pub rates: PerPhase<f64>,
}

/// Everything a consumer needs about one accepted step.
///
/// Immutable once produced: the engine builds a fresh model per step and
/// never touches an emitted state again, so a `SimulationState` can be
/// handed to storage or analysis running concurrently with the next
/// step's computation.
#[derive(Clone, Debug)]
pub struct SimulationState {
    /// Accepted-step index, starting at 1.
    pub step: StepId,
    /// Step size used, seconds.
    pub step_size: f64,
    /// Cumulative simulation time at the end of this step, seconds.
    pub time: f64,
    /// The reservoir after this step.
    pub model: ReservoirModel,
    /// The wells as they operated during this step.
    pub wells: Wells,
    /// Per-phase injection rates during the step, ft³/day (positive).
    pub injection: RateGrids,
    /// Per-phase production rates during the step, ft³/day (negative).
    pub production: RateGrids,
    /// Operating point of every flowing well during the step.
    pub well_reports: Vec<WellReport>,
    /// Timing and quality metrics for the step.
    pub metrics: StepMetrics,
}

impl SimulationState {
    /// The report for one well by name, if it flowed this step.
    pub fn well_report(&self, name: &str) -> Option<&WellReport> {
        self.well_reports.iter().find(|r| r.name == name)
    }

    /// Elapsed time in days.
    pub fn time_in_days(&self) -> f64 {
        self.time / SECONDS_PER_DAY
    }

    /// Elapsed time in Julian years.
    pub fn time_in_years(&self) -> f64 {
        self.time / (DAYS_PER_YEAR * SECONDS_PER_DAY)
    }

    /// Total injection rate across phases and cells, ft³/day.
    pub fn total_injection_rate(&self) -> f64 {
        self.injection.total()
    }

    /// Total production rate across phases and cells, ft³/day
    /// (negative).
    pub fn total_production_rate(&self) -> f64 {
        self.production.total()
    }
}
