use std::array;

use crate::{Integrable, ModelError, OdeModel, tableau::ButcherTableau};

// preallocated buffers for intermediate calculations
struct RKBuffers<State: Integrable, const STAGES: usize> {
    stage: StageBuffer<State, STAGES>,
    state: State,
}

impl<State: Integrable, const STAGES: usize> Default for RKBuffers<State, STAGES> {
    fn default() -> Self {
        Self {
            stage: StageBuffer::default(),
            state: State::default(),
        }
    }
}

/// Explicit Runge-Kutta stepper for a fixed tableau.
///
/// Advances a state by exactly one step of the requested size. Step size control
/// is left to the caller.
pub struct RungeKutta<State: Integrable, const STAGES: usize> {
    tableau: ButcherTableau<STAGES>,
    buffers: RKBuffers<State, STAGES>,
}

impl<State: Integrable, const STAGES: usize> RungeKutta<State, STAGES> {
    pub fn new(tableau: ButcherTableau<STAGES>) -> Self {
        Self {
            buffers: RKBuffers::default(),
            tableau,
        }
    }

    pub fn order(&self) -> usize {
        self.tableau.order
    }

    /// Advance `x` in place from `t` to `t + h`.
    ///
    /// On error `x` is left untouched, since the stages are accumulated in the
    /// internal buffers and only the final update writes to `x`.
    pub fn step<Model>(
        &mut self,
        model: &mut Model,
        t: f64,
        h: f64,
        x: &mut State,
    ) -> Result<(), ModelError>
    where
        Model: OdeModel<State = State> + ?Sized,
    {
        let k = &mut self.buffers.stage.k;

        // k0
        model.f(t, x, &mut k[0])?;

        // k1 - ks
        for s in 1..STAGES {
            // intermediate point from the previous ks with scaling from the tableau
            self.buffers.state.clone_from(x);
            for i in 0..s {
                let a = self.tableau.a[s][i];
                if a != 0.0 {
                    self.buffers.state.add_scaled(&k[i], a * h);
                }
            }
            model.f(t + self.tableau.c[s] * h, &self.buffers.state, &mut k[s])?;
        }

        for s in 0..STAGES {
            let b = self.tableau.b[s];
            if b != 0.0 {
                x.add_scaled(&k[s], b * h);
            }
        }
        Ok(())
    }
}

pub struct StageBuffer<State, const STAGES: usize>
where
    State: Integrable,
{
    pub k: [State::Derivative; STAGES],
}

impl<State, const STAGES: usize> Default for StageBuffer<State, STAGES>
where
    State: Integrable,
{
    fn default() -> Self {
        Self {
            k: array::from_fn(|_| State::Derivative::default()),
        }
    }
}
