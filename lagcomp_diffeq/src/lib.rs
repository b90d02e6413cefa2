use std::{error::Error, fmt::Debug};

/// Submodules for the single step integrators.
pub mod rk;
pub mod solvers;
pub mod tableau;

pub use rk::RungeKutta;
pub use solvers::{RungeKuttaMethods, RungeKuttaSolver, StepIntegrator};
pub use tableau::ButcherTableau;

/// Error type returned by model right hand sides.
pub type ModelError = Box<dyn Error + Send + Sync>;

/// Trait representing an integrable state for use in the single step solvers.
///
/// The associated `Derivative` type represents the time derivative of the state.
/// A Runge-Kutta step only ever needs to accumulate scaled derivatives onto a
/// state, so that is the one arithmetic operation required.
pub trait Integrable: Clone + Default + Debug {
    /// The derivative of the state, used in ODE computation.
    type Derivative: Clone + Default + Debug;

    /// In place `self += scale * derivative`.
    fn add_scaled(&mut self, derivative: &Self::Derivative, scale: f64);
}

/// Trait for defining a dynamical system model that can be numerically integrated.
///
/// Types implementing this trait must define how to compute the derivative (or RHS function)
/// of the ODE at a given time and state.
pub trait OdeModel {
    type State: Integrable;
    /// Compute the derivative at time `t` and state `state`, storing the result in `derivative`.
    fn f(
        &mut self,
        t: f64,
        state: &Self::State,
        derivative: &mut <Self::State as Integrable>::Derivative,
    ) -> Result<(), ModelError>;
}
