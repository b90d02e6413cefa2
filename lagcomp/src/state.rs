use std::fmt;

use lagcomp_diffeq::Integrable;
use nalgebra::Vector3;
use rotations::quaternion::{Quaternion, QuaternionErrors};
use serde::{Deserialize, Serialize};

use crate::entity::EntityState;

/// The compensable state of one entity.
///
/// This is the buffer the compensator integrates. It is loaded from and
/// unloaded to the entity's packing data explicitly, never aliased with it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompensationState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    /// Attitude of the body wrt. the parent frame, kept at unit norm.
    pub attitude: Quaternion,
    /// Angular velocity of the body wrt. the parent frame, in body coordinates.
    pub angular_velocity: Vector3<f64>,
    /// Scenario time the state is valid for (s).
    pub time: f64,
}

impl Default for CompensationState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            attitude: Quaternion::IDENTITY,
            angular_velocity: Vector3::zeros(),
            time: 0.0,
        }
    }
}

impl CompensationState {
    pub fn quaternion_rate(&self) -> QuaternionRate {
        QuaternionRate::from_state(self)
    }

    /// Pulls the attitude back to unit norm after integration drift.
    pub fn normalize_attitude(&mut self) -> Result<(), QuaternionErrors> {
        self.attitude = self.attitude.normalize()?;
        Ok(())
    }
}

impl From<&EntityState> for CompensationState {
    fn from(state: &EntityState) -> Self {
        Self {
            position: state.position,
            velocity: state.velocity,
            attitude: state.attitude,
            angular_velocity: state.angular_velocity,
            time: state.time,
        }
    }
}

impl From<&CompensationState> for EntityState {
    fn from(state: &CompensationState) -> Self {
        Self {
            position: state.position,
            velocity: state.velocity,
            attitude: state.attitude,
            angular_velocity: state.angular_velocity,
            time: state.time,
        }
    }
}

impl fmt::Display for CompensationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  time: {:.9}", self.time)?;
        writeln!(
            f,
            "  position: ({:.9}, {:.9}, {:.9})",
            self.position[0], self.position[1], self.position[2]
        )?;
        writeln!(
            f,
            "  velocity: ({:.9}, {:.9}, {:.9})",
            self.velocity[0], self.velocity[1], self.velocity[2]
        )?;
        writeln!(f, "  attitude: {}", self.attitude)?;
        write!(
            f,
            "  angular velocity: ({:.9}, {:.9}, {:.9})",
            self.angular_velocity[0], self.angular_velocity[1], self.angular_velocity[2]
        )
    }
}

/// Time derivative of the attitude quaternion.
///
/// Derived from the attitude and angular velocity whenever it is needed and
/// never carried from one compensation to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuaternionRate(pub Quaternion);

impl Default for QuaternionRate {
    fn default() -> Self {
        Self(Quaternion::ZERO)
    }
}

impl QuaternionRate {
    pub fn from_state(state: &CompensationState) -> Self {
        Self(state.attitude.derivative(&state.angular_velocity))
    }
}

/// Time derivative of a `CompensationState`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompensationStateRate {
    pub velocity: Vector3<f64>,
    pub acceleration: Vector3<f64>,
    pub attitude_rate: Quaternion,
    pub angular_acceleration: Vector3<f64>,
}

impl Default for CompensationStateRate {
    fn default() -> Self {
        Self {
            velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
            attitude_rate: Quaternion::ZERO,
            angular_acceleration: Vector3::zeros(),
        }
    }
}

impl Integrable for CompensationState {
    type Derivative = CompensationStateRate;

    // time is owned by the stepping loop, not the integrator
    fn add_scaled(&mut self, derivative: &CompensationStateRate, scale: f64) {
        self.position += derivative.velocity * scale;
        self.velocity += derivative.acceleration * scale;
        self.attitude += &(derivative.attitude_rate * scale);
        self.angular_velocity += derivative.angular_acceleration * scale;
    }
}
