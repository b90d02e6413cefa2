use serde::{Deserialize, Serialize};

const MICROS_PER_SECOND: f64 = 1.0e6;

/// A federation time interval in whole microseconds.
///
/// Lookahead is negotiated as an integer time so every federate sees the same
/// value; it only becomes a float when handed to the integrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LookaheadInterval(i64);

impl LookaheadInterval {
    pub const ZERO: Self = Self(0);

    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Rounds to the nearest microsecond.
    pub fn from_seconds(seconds: f64) -> Self {
        Self((seconds * MICROS_PER_SECOND).round() as i64)
    }

    pub fn micros(&self) -> i64 {
        self.0
    }

    pub fn seconds(&self) -> f64 {
        self.0 as f64 / MICROS_PER_SECOND
    }
}

/// Access to the federation's notion of time.
pub trait TimeManagement {
    /// Current scenario time (s).
    fn scenario_time(&self) -> f64;

    /// Current lookahead of this federate.
    fn lookahead(&self) -> LookaheadInterval;
}

/// A scenario clock driven by the owning federate's data cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FederationClock {
    scenario_time: f64,
    lookahead: LookaheadInterval,
}

impl FederationClock {
    pub fn new(scenario_time: f64, lookahead: LookaheadInterval) -> Self {
        Self {
            scenario_time,
            lookahead,
        }
    }

    pub fn advance(&mut self, dt: f64) {
        self.scenario_time += dt;
    }

    pub fn set_scenario_time(&mut self, scenario_time: f64) {
        self.scenario_time = scenario_time;
    }

    pub fn set_lookahead(&mut self, lookahead: LookaheadInterval) {
        self.lookahead = lookahead;
    }
}

impl TimeManagement for FederationClock {
    fn scenario_time(&self) -> f64 {
        self.scenario_time
    }

    fn lookahead(&self) -> LookaheadInterval {
        self.lookahead
    }
}
