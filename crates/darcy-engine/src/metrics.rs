//! Per-step performance and quality metrics.
//!
//! [`StepMetrics`] captures timing, solver effort, and stability
//! diagnostics for a single accepted step. Consumers read them off the
//! emitted state; the step controller reads the realized CFL.

/// Metrics collected while computing one accepted step.
///
/// Durations are wall-clock microseconds and do not participate in any
/// numerical decision, so runs stay bit-for-bit reproducible.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the accepted attempt, in microseconds.
    pub total_us: u64,
    /// Time evaluating PVT and rock-fluid properties, in microseconds.
    pub property_eval_us: u64,
    /// Time resolving well controls, in microseconds.
    pub well_resolve_us: u64,
    /// Time assembling and solving the pressure system, in microseconds.
    pub pressure_solve_us: u64,
    /// Time advancing saturations, in microseconds.
    pub saturation_update_us: u64,
    /// Linear iterations spent by the pressure solve.
    pub linear_iterations: u32,
    /// Final relative residual of the pressure solve.
    pub linear_residual: f64,
    /// Realized CFL number for the step.
    pub realized_cfl: f64,
    /// Largest per-cell gas-saturation change in the step.
    pub max_gas_saturation_change: f64,
    /// Total saturation volume clamped back into [0, 1].
    pub clamped_saturation: f64,
    /// Cumulative preconditioner rebuilds so far in the run.
    pub preconditioner_rebuilds: u64,
    /// Rejected trial attempts before this step was accepted.
    pub rejected_attempts: u32,
}
