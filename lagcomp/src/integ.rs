use lagcomp_diffeq::{ModelError, OdeModel, RungeKuttaSolver, StepIntegrator};

use crate::{
    base::{CompensationStatus, Compensator, LagCompBase},
    config::{CompensationParameters, CompensatorConfig, Verbosity},
    dynamics::EntityDynamics,
    entity::EntityId,
    error::CompensationErrors,
    state::{CompensationState, CompensationStateRate},
};

/// Right hand side seen by the one step solver: kinematics plus the entity's dynamics.
struct CompensationModel<'a, D: EntityDynamics> {
    dynamics: &'a mut D,
}

impl<D: EntityDynamics> OdeModel for CompensationModel<'_, D> {
    type State = CompensationState;

    fn f(
        &mut self,
        t: f64,
        state: &CompensationState,
        derivative: &mut CompensationStateRate,
    ) -> Result<(), ModelError> {
        let accelerations = self.dynamics.accelerations(t, state)?;
        derivative.velocity = state.velocity;
        derivative.acceleration = accelerations.translational;
        // the rate depends on the current attitude, so it is evaluated at every stage
        derivative.attitude_rate = state.attitude.derivative(&state.angular_velocity);
        derivative.angular_acceleration = accelerations.rotational;
        Ok(())
    }
}

/// Compensates by numerically integrating the entity's dynamics over the
/// latency interval in fixed sub-steps.
///
/// The sub-step count for a given interval and configuration is deterministic,
/// so every federate propagating the same state gets the same answer.
pub struct IntegratingCompensator<D, I = RungeKuttaSolver<CompensationState>>
where
    D: EntityDynamics,
    I: StepIntegrator<CompensationState>,
{
    base: LagCompBase,
    parameters: CompensationParameters,
    integrator: I,
    dynamics: D,
    /// Current compensation propagation time (s).
    integ_t: f64,
    initialized: bool,
}

impl<D: EntityDynamics> IntegratingCompensator<D> {
    /// Compensator with the default configuration: RK4, 0.01 s steps.
    pub fn new(entity: EntityId, dynamics: D) -> Self {
        Self::from_config(entity, dynamics, &CompensatorConfig::default())
    }

    pub fn from_config(entity: EntityId, dynamics: D, config: &CompensatorConfig) -> Self {
        Self::with_integrator(
            entity,
            dynamics,
            config.method.solver(),
            config.parameters(),
            config.verbosity,
        )
    }
}

impl<D, I> IntegratingCompensator<D, I>
where
    D: EntityDynamics,
    I: StepIntegrator<CompensationState>,
{
    /// Compensator using a caller supplied one step solver.
    pub fn with_integrator(
        entity: EntityId,
        dynamics: D,
        integrator: I,
        parameters: CompensationParameters,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            base: LagCompBase::new(entity, verbosity),
            parameters,
            integrator,
            dynamics,
            integ_t: 0.0,
            initialized: false,
        }
    }

    pub fn parameters(&self) -> &CompensationParameters {
        &self.parameters
    }

    /// Changing the step size requires another `initialize()`.
    pub fn set_step_size(&mut self, step_size: f64) {
        self.parameters.step_size = step_size;
        self.initialized = false;
    }

    /// Changing the tolerance requires another `initialize()`.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.parameters.tolerance = tolerance;
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn integ_t(&self) -> f64 {
        self.integ_t
    }

    pub fn dynamics(&self) -> &D {
        &self.dynamics
    }

    pub fn dynamics_mut(&mut self) -> &mut D {
        &mut self.dynamics
    }
}

impl<D, I> Compensator for IntegratingCompensator<D, I>
where
    D: EntityDynamics,
    I: StepIntegrator<CompensationState>,
{
    fn base(&self) -> &LagCompBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LagCompBase {
        &mut self.base
    }

    fn initialize(&mut self) -> Result<(), CompensationErrors> {
        self.initialized = false;
        if let Err(e) = self.parameters.validate() {
            tracing::error!(entity = %self.base.entity(), "lag compensation initialize: {e}");
            return Err(e);
        }
        self.initialized = true;
        Ok(())
    }

    fn compensate(
        &mut self,
        t_begin: f64,
        t_end: f64,
    ) -> Result<CompensationStatus, CompensationErrors> {
        if !self.initialized {
            return Err(CompensationErrors::NotInitialized);
        }
        if !t_begin.is_finite() || !t_end.is_finite() {
            return Err(CompensationErrors::InvalidInterval { t_begin, t_end });
        }

        let interval = t_end - t_begin;
        if interval <= 0.0 {
            if interval == 0.0 {
                self.base.state_mut().time = t_end;
            }
            return Ok(CompensationStatus::NoOp);
        }

        let CompensationParameters {
            step_size,
            tolerance,
        } = self.parameters;
        let trace = self.base.verbosity().shows(Verbosity::Trace);
        let mut model = CompensationModel {
            dynamics: &mut self.dynamics,
        };

        // the recounted remainder can be left with a rounding residue after the
        // last full step, the ceiling keeps that from costing an extra step
        let max_steps = self.parameters.max_steps(interval);

        self.integ_t = t_begin;
        let mut remaining = interval;
        let mut steps = 0;
        while steps < max_steps && remaining > 0.0 && remaining >= tolerance {
            let dt = step_size.min(remaining);
            self.base.compute_quaternion_rate();

            let state = self.base.state_mut();
            self.integrator
                .step(&mut model, self.integ_t, dt, state)
                .map_err(CompensationErrors::Dynamics)?;
            state.normalize_attitude()?;

            steps += 1;
            // a partial step always lands on the end of the interval
            remaining = if dt < step_size {
                0.0
            } else {
                interval - steps as f64 * step_size
            };
            self.integ_t = t_end - remaining;
            state.time = self.integ_t;

            if trace {
                tracing::trace!(
                    entity = %self.base.entity(),
                    step = steps,
                    dt,
                    integ_t = self.integ_t,
                    remaining,
                    "compensation sub-step"
                );
            }
        }

        // snap to the requested end rather than the last sub-step
        self.integ_t = t_end;
        self.base.state_mut().time = t_end;
        Ok(CompensationStatus::Converged { steps })
    }
}
