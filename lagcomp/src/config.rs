use std::path::Path;

use lagcomp_diffeq::RungeKuttaMethods;
use serde::{Deserialize, Serialize};

use crate::error::CompensationErrors;

/// How much diagnostic output a compensator produces.
///
/// Levels are ordered, a level shows everything the levels below it show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verbosity {
    #[default]
    Off,
    /// One event per compensation with the status.
    Summary,
    /// State dumps before and after compensation.
    Debug,
    /// Timing of every send and receive, and every sub-step.
    Trace,
}

impl Verbosity {
    pub fn shows(&self, level: Verbosity) -> bool {
        level != Verbosity::Off && *self >= level
    }
}

/// Sub-stepping parameters of an integrating compensator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompensationParameters {
    /// Nominal sub-step duration (s).
    pub step_size: f64,
    /// Remaining time (s) below which the stepping loop stops.
    pub tolerance: f64,
}

impl Default for CompensationParameters {
    fn default() -> Self {
        Self {
            step_size: 0.01,
            tolerance: 1.0e-6,
        }
    }
}

impl CompensationParameters {
    pub fn new(step_size: f64, tolerance: f64) -> Self {
        Self {
            step_size,
            tolerance,
        }
    }

    /// Checks the relation the stepping loop relies on to terminate.
    pub fn validate(&self) -> Result<(), CompensationErrors> {
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(CompensationErrors::InvalidStepSize(self.step_size));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(CompensationErrors::InvalidTolerance(self.tolerance));
        }
        if self.tolerance >= self.step_size {
            return Err(CompensationErrors::ToleranceNotLessThanStep {
                step_size: self.step_size,
                tolerance: self.tolerance,
            });
        }
        Ok(())
    }

    /// Upper bound on the number of sub-steps to cover `interval` seconds.
    pub fn max_steps(&self, interval: f64) -> usize {
        if interval <= 0.0 {
            0
        } else {
            (interval / self.step_size).ceil() as usize
        }
    }
}

/// Configuration of one integrating compensator, usually read from a RON file.
///
/// ```ron
/// (
///     step_size: 0.05,
///     tolerance: 0.001,
///     method: Rk4,
///     verbosity: Summary,
/// )
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompensatorConfig {
    pub step_size: f64,
    pub tolerance: f64,
    pub method: RungeKuttaMethods,
    pub verbosity: Verbosity,
}

impl Default for CompensatorConfig {
    fn default() -> Self {
        let parameters = CompensationParameters::default();
        Self {
            step_size: parameters.step_size,
            tolerance: parameters.tolerance,
            method: RungeKuttaMethods::default(),
            verbosity: Verbosity::default(),
        }
    }
}

impl CompensatorConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, CompensationErrors> {
        Ok(ron::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CompensationErrors> {
        let s = std::fs::read_to_string(path)?;
        Self::from_ron_str(&s)
    }

    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_method(mut self, method: RungeKuttaMethods) -> Self {
        self.method = method;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn parameters(&self) -> CompensationParameters {
        CompensationParameters::new(self.step_size, self.tolerance)
    }
}
