use serde::{Deserialize, Serialize};

use crate::{Integrable, ModelError, OdeModel, rk::RungeKutta, tableau::ButcherTableau};

/// A one step solver: advances a state by exactly `h`.
///
/// This is the seam between an outer stepping loop and the numerical method.
/// Implementations must not change `h`.
pub trait StepIntegrator<State: Integrable> {
    fn step(
        &mut self,
        model: &mut dyn OdeModel<State = State>,
        t: f64,
        h: f64,
        x: &mut State,
    ) -> Result<(), ModelError>;

    /// Order of accuracy of the method.
    fn order(&self) -> usize;
}

impl<State: Integrable, const STAGES: usize> StepIntegrator<State> for RungeKutta<State, STAGES> {
    fn step(
        &mut self,
        model: &mut dyn OdeModel<State = State>,
        t: f64,
        h: f64,
        x: &mut State,
    ) -> Result<(), ModelError> {
        RungeKutta::step(self, model, t, h, x)
    }

    fn order(&self) -> usize {
        RungeKutta::order(self)
    }
}

/// Enum representing the explicit fixed step methods supported by the framework.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RungeKuttaMethods {
    /// Forward Euler, first order.
    Euler,
    /// Explicit midpoint, second order.
    Midpoint,
    /// Kutta's third order method.
    Rk3,
    /// Classical Runge-Kutta 4th-order method.
    #[default]
    Rk4,
}

impl RungeKuttaMethods {
    /// Builds the stepper for this method with buffers sized for `State`.
    pub fn solver<State: Integrable>(&self) -> RungeKuttaSolver<State> {
        match self {
            RungeKuttaMethods::Euler => {
                RungeKuttaSolver::Euler(RungeKutta::new(ButcherTableau::<1>::EULER))
            }
            RungeKuttaMethods::Midpoint => {
                RungeKuttaSolver::Midpoint(RungeKutta::new(ButcherTableau::<2>::MIDPOINT))
            }
            RungeKuttaMethods::Rk3 => {
                RungeKuttaSolver::Rk3(RungeKutta::new(ButcherTableau::<3>::RK3))
            }
            RungeKuttaMethods::Rk4 => {
                RungeKuttaSolver::Rk4(RungeKutta::new(ButcherTableau::<4>::RK4))
            }
        }
    }
}

/// A Runge-Kutta stepper selected at runtime.
pub enum RungeKuttaSolver<State: Integrable> {
    Euler(RungeKutta<State, 1>),
    Midpoint(RungeKutta<State, 2>),
    Rk3(RungeKutta<State, 3>),
    Rk4(RungeKutta<State, 4>),
}

impl<State: Integrable> RungeKuttaSolver<State> {
    pub fn method(&self) -> RungeKuttaMethods {
        match self {
            RungeKuttaSolver::Euler(_) => RungeKuttaMethods::Euler,
            RungeKuttaSolver::Midpoint(_) => RungeKuttaMethods::Midpoint,
            RungeKuttaSolver::Rk3(_) => RungeKuttaMethods::Rk3,
            RungeKuttaSolver::Rk4(_) => RungeKuttaMethods::Rk4,
        }
    }
}

impl<State: Integrable> StepIntegrator<State> for RungeKuttaSolver<State> {
    fn step(
        &mut self,
        model: &mut dyn OdeModel<State = State>,
        t: f64,
        h: f64,
        x: &mut State,
    ) -> Result<(), ModelError> {
        match self {
            RungeKuttaSolver::Euler(solver) => solver.step(model, t, h, x),
            RungeKuttaSolver::Midpoint(solver) => solver.step(model, t, h, x),
            RungeKuttaSolver::Rk3(solver) => solver.step(model, t, h, x),
            RungeKuttaSolver::Rk4(solver) => solver.step(model, t, h, x),
        }
    }

    fn order(&self) -> usize {
        match self {
            RungeKuttaSolver::Euler(solver) => solver.order(),
            RungeKuttaSolver::Midpoint(solver) => solver.order(),
            RungeKuttaSolver::Rk3(solver) => solver.order(),
            RungeKuttaSolver::Rk4(solver) => solver.order(),
        }
    }
}
