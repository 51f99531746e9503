//! Error taxonomy shared across the Darcy workspace.
//!
//! Two families matter at run time: [`StepRejection`] (recoverable, fully
//! contained inside the simulation loop's retry machinery) and
//! [`RunError`] (fatal, terminates the state sequence). Construction-time
//! validation errors live with their subsystems (`ModelError` in
//! `darcy-grid`, `WellError` in `darcy-wells`, and so on).

use std::error::Error;
use std::fmt;

/// Why a trial step was rejected.
///
/// Every variant is recoverable: the simulation loop discards the trial
/// state, asks the step controller for a smaller step size, and retries.
/// A rejection only becomes fatal when the consecutive-rejection budget
/// is exhausted (see [`RunError::RejectBudgetExhausted`]).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepRejection {
    /// The realized CFL number exceeded the configured maximum.
    CflExceeded {
        /// Realized CFL number for the trial step.
        cfl: f64,
        /// Configured maximum CFL number.
        limit: f64,
    },
    /// A cell's gas saturation changed by more than the configured cap.
    GasSaturationChange {
        /// Largest per-cell gas-saturation change in the trial step.
        change: f64,
        /// Configured per-step cap.
        limit: f64,
    },
    /// Saturation clamping exceeded the configured tolerance.
    SaturationClamp {
        /// Total clamped saturation volume fraction across cells.
        clamped: f64,
        /// Configured clamp tolerance.
        tolerance: f64,
    },
    /// The pressure solve did not converge within its iteration budget.
    NonConvergence {
        /// Iterations performed before giving up.
        iterations: u32,
        /// Relative residual norm at the last iteration.
        residual: f64,
    },
}

impl StepRejection {
    /// Whether this rejection came from the linear solve rather than a
    /// stability limit. Numerical failures take the steeper back-off path.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::NonConvergence { .. })
    }
}

impl fmt::Display for StepRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CflExceeded { cfl, limit } => {
                write!(f, "CFL {cfl:.4} exceeds limit {limit:.4}")
            }
            Self::GasSaturationChange { change, limit } => {
                write!(f, "gas saturation change {change:.4} exceeds cap {limit:.4}")
            }
            Self::SaturationClamp { clamped, tolerance } => {
                write!(
                    f,
                    "saturation clamp {clamped:.3e} exceeds tolerance {tolerance:.3e}"
                )
            }
            Self::NonConvergence {
                iterations,
                residual,
            } => {
                write!(
                    f,
                    "pressure solve stalled at residual {residual:.3e} after {iterations} iterations"
                )
            }
        }
    }
}

impl Error for StepRejection {}

/// Fatal run-level failures. Once yielded, the state sequence ends.
#[derive(Clone, Debug, PartialEq)]
pub enum RunError {
    /// Consecutive step rejections exceeded the configured budget.
    ///
    /// The last stable state remains accessible on the simulation after
    /// this is reported.
    RejectBudgetExhausted {
        /// Number of consecutive rejections observed.
        rejects: u32,
        /// The rejection that exhausted the budget.
        last_cause: StepRejection,
    },
    /// The linear solver failed structurally (not a convergence stall):
    /// singular preconditioner, dimension mismatch. Unrecoverable.
    LinearSolverFailure {
        /// Description of the failure.
        reason: String,
    },
    /// The engine produced a state that fails its own invariants
    /// (non-physical pressure, broken saturation closure after update).
    InvalidState {
        /// Description of the violated invariant.
        reason: String,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RejectBudgetExhausted { rejects, last_cause } => {
                write!(
                    f,
                    "step rejected {rejects} consecutive times, giving up: {last_cause}"
                )
            }
            Self::LinearSolverFailure { reason } => {
                write!(f, "linear solver failure: {reason}")
            }
            Self::InvalidState { reason } => write!(f, "invalid state: {reason}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RejectBudgetExhausted { last_cause, .. } => Some(last_cause),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_convergence_is_numerical() {
        let r = StepRejection::NonConvergence {
            iterations: 200,
            residual: 1.0e-3,
        };
        assert!(r.is_numerical());
        let r = StepRejection::CflExceeded {
            cfl: 1.4,
            limit: 0.9,
        };
        assert!(!r.is_numerical());
    }

    #[test]
    fn run_error_reports_cause() {
        let err = RunError::RejectBudgetExhausted {
            rejects: 3,
            last_cause: StepRejection::NonConvergence {
                iterations: 500,
                residual: 2.0e-2,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("3 consecutive"));
        assert!(msg.contains("500 iterations"));
        assert!(err.source().is_some());
    }
}
