use std::fmt::Write;

use crate::{
    config::Verbosity,
    driver,
    entity::{EntityId, EntityState, PhysicalEntity},
    error::CompensationErrors,
    state::{CompensationState, QuaternionRate},
    time::TimeManagement,
};

/// Outcome of one compensation call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompensationStatus {
    /// The state was propagated to the requested end time in `steps` sub-steps.
    Converged { steps: usize },
    /// Zero or negative interval, nothing to propagate.
    NoOp,
    /// Receive side only, no new state arrived this cycle.
    Skipped,
}

/// State and bookkeeping shared by every compensation scheme.
#[derive(Clone, Debug)]
pub struct LagCompBase {
    entity: EntityId,
    state: CompensationState,
    q_dot: QuaternionRate,
    compensate_dt: f64,
    verbosity: Verbosity,
}

impl LagCompBase {
    pub fn new(entity: EntityId, verbosity: Verbosity) -> Self {
        Self {
            entity,
            state: CompensationState::default(),
            q_dot: QuaternionRate::default(),
            compensate_dt: 0.0,
            verbosity,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn state(&self) -> &CompensationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CompensationState {
        &mut self.state
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// Time span of the last compensation request (s).
    pub fn compensate_dt(&self) -> f64 {
        self.compensate_dt
    }

    pub(crate) fn set_compensate_dt(&mut self, dt: f64) {
        self.compensate_dt = dt;
    }

    pub fn quaternion_rate(&self) -> QuaternionRate {
        self.q_dot
    }

    pub fn compute_quaternion_rate(&mut self) {
        self.q_dot = self.state.quaternion_rate();
    }

    /// Copy the entity's packing state into the compensation buffer.
    pub fn load(&mut self, entity: &dyn PhysicalEntity) {
        self.state = CompensationState::from(entity.packing_state());
    }

    /// Copy the compensation buffer into the entity's packing state.
    pub fn unload(&self, entity: &mut dyn PhysicalEntity) {
        *entity.packing_state_mut() = EntityState::from(&self.state);
    }

    /// Multi-line text of the buffer for diagnostics.
    pub fn dump(&self) -> String {
        let mut s = String::new();
        // writing to a String cannot fail
        let _ = writeln!(s, "lag compensation data for entity {}:", self.entity);
        let _ = writeln!(s, "{}", self.state);
        let _ = write!(s, "  attitude rate: {}", self.q_dot.0);
        s
    }
}

/// A latency compensation scheme for one entity.
///
/// `compensate` is the scheme specific part. The send and receive protocol is
/// shared by all schemes and provided here.
pub trait Compensator {
    fn base(&self) -> &LagCompBase;

    fn base_mut(&mut self) -> &mut LagCompBase;

    /// Validates the configuration. Must succeed before `compensate` will run.
    fn initialize(&mut self) -> Result<(), CompensationErrors>;

    /// Propagates the buffer, valid at `t_begin`, to `t_end` in place.
    fn compensate(
        &mut self,
        t_begin: f64,
        t_end: f64,
    ) -> Result<CompensationStatus, CompensationErrors>;

    /// Predict the state at the expected arrival time and put it in the packing data.
    fn send_lag_compensation(
        &mut self,
        entity: &mut dyn PhysicalEntity,
        time: &dyn TimeManagement,
    ) -> Result<CompensationStatus, CompensationErrors> {
        driver::send_lag_compensation(self, entity, time)
    }

    /// Bring a just received state up to the current scenario time and publish it.
    fn receive_lag_compensation(
        &mut self,
        entity: &mut dyn PhysicalEntity,
        time: &dyn TimeManagement,
    ) -> Result<CompensationStatus, CompensationErrors> {
        driver::receive_lag_compensation(self, entity, time)
    }
}
