//! The adaptive step controller.

use crate::config::ConfigError;
use darcy_core::{RunError, StepRejection, Time};

/// Step-size policy for a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimerConfig {
    /// First trial step size.
    pub initial_step_size: Time,
    /// Smallest step size the controller will try.
    pub min_step_size: Time,
    /// Largest step size the controller will grow to.
    pub max_step_size: Time,
    /// Total simulation horizon.
    pub simulation_time: Time,
    /// Target maximum CFL number; realized CFL below this grows the step.
    pub max_cfl_number: f64,
    /// Growth factor applied after a comfortable accepted step.
    pub ramp_up_factor: f64,
    /// Shrink factor after a stability rejection.
    pub backoff_factor: f64,
    /// Steeper shrink factor after a solver non-convergence rejection.
    pub aggressive_backoff_factor: f64,
    /// Consecutive rejections tolerated before the run fails.
    pub max_rejects: u32,
}

impl TimerConfig {
    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("initial_step_size", self.initial_step_size),
            ("min_step_size", self.min_step_size),
            ("max_step_size", self.max_step_size),
            ("simulation_time", self.simulation_time),
        ];
        // 1. All durations finite and positive.
        for (name, t) in sizes {
            if !t.seconds().is_finite() || t.seconds() <= 0.0 {
                return Err(ConfigError::InvalidTimer {
                    reason: format!("{name} {t} must be finite and positive"),
                });
            }
        }
        // 2. Ordering: min <= initial <= max.
        if self.min_step_size > self.initial_step_size
            || self.initial_step_size > self.max_step_size
        {
            return Err(ConfigError::InvalidTimer {
                reason: format!(
                    "need min <= initial <= max, got {} / {} / {}",
                    self.min_step_size, self.initial_step_size, self.max_step_size
                ),
            });
        }
        // 3. CFL target.
        if !self.max_cfl_number.is_finite() || self.max_cfl_number <= 0.0 {
            return Err(ConfigError::InvalidTimer {
                reason: format!("max CFL {} must be positive", self.max_cfl_number),
            });
        }
        // 4. Ramp-up grows, back-offs shrink, aggressive at least as hard.
        if !self.ramp_up_factor.is_finite() || self.ramp_up_factor < 1.0 {
            return Err(ConfigError::InvalidTimer {
                reason: format!("ramp-up factor {} must be >= 1", self.ramp_up_factor),
            });
        }
        for (name, f) in [
            ("backoff factor", self.backoff_factor),
            ("aggressive backoff factor", self.aggressive_backoff_factor),
        ] {
            if !f.is_finite() || f <= 0.0 || f >= 1.0 {
                return Err(ConfigError::InvalidTimer {
                    reason: format!("{name} {f} outside (0, 1)"),
                });
            }
        }
        if self.aggressive_backoff_factor > self.backoff_factor {
            return Err(ConfigError::InvalidTimer {
                reason: format!(
                    "aggressive backoff {} must not exceed backoff {}",
                    self.aggressive_backoff_factor, self.backoff_factor
                ),
            });
        }
        // 5. Rejection budget.
        if self.max_rejects == 0 {
            return Err(ConfigError::InvalidTimer {
                reason: "max_rejects must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// The step controller: owns the trial step size, the elapsed clock, and
/// the consecutive-rejection counter.
///
/// An explicit state machine rather than recursion: the simulation loop
/// asks for the next size, reports acceptance or rejection, and the
/// controller mutates itself between steps only.
#[derive(Clone, Debug)]
pub struct Timer {
    config: TimerConfig,
    step_size: f64,
    elapsed: f64,
    rejects: u32,
    steps_accepted: u64,
}

impl Timer {
    /// Build a controller from a validated configuration.
    pub fn new(config: TimerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            step_size: config.initial_step_size.seconds(),
            elapsed: 0.0,
            rejects: 0,
            steps_accepted: 0,
            config,
        })
    }

    /// The configuration this controller runs under.
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Elapsed simulation time, seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Accepted step count.
    pub fn steps_accepted(&self) -> u64 {
        self.steps_accepted
    }

    /// Consecutive rejections since the last accepted step.
    pub fn consecutive_rejects(&self) -> u32 {
        self.rejects
    }

    /// Whether the run has reached its horizon.
    ///
    /// A sub-nanosecond remainder counts as finished so float error in
    /// the elapsed sum cannot manufacture a final degenerate step.
    pub fn is_finished(&self) -> bool {
        self.remaining() <= 1.0e-9
    }

    fn remaining(&self) -> f64 {
        self.config.simulation_time.seconds() - self.elapsed
    }

    /// The next trial step size, seconds: the controller's current size,
    /// truncated so the run lands exactly on the horizon.
    pub fn next_step_size(&self) -> f64 {
        self.step_size.min(self.remaining())
    }

    /// Record an accepted step of `used` seconds with its realized CFL.
    ///
    /// Resets the rejection counter; grows the step by the ramp-up
    /// factor (capped at the maximum) when the realized CFL sat below
    /// the target.
    pub fn accept(&mut self, used: f64, realized_cfl: f64) {
        debug_assert!(used > 0.0);
        self.elapsed += used;
        self.steps_accepted += 1;
        self.rejects = 0;
        if realized_cfl < self.config.max_cfl_number {
            self.step_size = (self.step_size * self.config.ramp_up_factor)
                .min(self.config.max_step_size.seconds());
        }
    }

    /// Record a rejected trial step.
    ///
    /// Shrinks the step by the back-off factor — the steeper aggressive
    /// factor for solver non-convergence — clamped at the minimum step
    /// size. Returns the fatal [`RunError`] once the consecutive
    /// rejection budget is spent; a rejection at the clamped minimum
    /// still counts against the budget.
    pub fn reject(&mut self, cause: StepRejection) -> Result<(), RunError> {
        self.rejects += 1;
        if self.rejects >= self.config.max_rejects {
            return Err(RunError::RejectBudgetExhausted {
                rejects: self.rejects,
                last_cause: cause,
            });
        }
        let factor = if cause.is_numerical() {
            self.config.aggressive_backoff_factor
        } else {
            self.config.backoff_factor
        };
        self.step_size = (self.step_size * factor).max(self.config.min_step_size.seconds());
        Ok(())
    }
}
