use lagcomp_diffeq::ModelError;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{entity::PhysicalEntityData, error::CompensationErrors, state::CompensationState};

/// Translational and rotational accelerations of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Accelerations {
    /// Acceleration in the parent frame (m/s2).
    pub translational: Vector3<f64>,
    /// Angular acceleration in the body frame (rad/s2).
    pub rotational: Vector3<f64>,
}

impl Default for Accelerations {
    fn default() -> Self {
        Self {
            translational: Vector3::zeros(),
            rotational: Vector3::zeros(),
        }
    }
}

/// Entity specific physics used as the right hand side of the compensation.
///
/// The kinematics (position rate, attitude rate) are handled by the compensator,
/// the model only supplies the accelerations.
pub trait EntityDynamics {
    fn accelerations(
        &mut self,
        t: f64,
        state: &CompensationState,
    ) -> Result<Accelerations, ModelError>;
}

/// No forces or torques, the entity coasts.
#[derive(Clone, Copy, Debug, Default)]
pub struct FreeDrift;

impl EntityDynamics for FreeDrift {
    fn accelerations(
        &mut self,
        _t: f64,
        _state: &CompensationState,
    ) -> Result<Accelerations, ModelError> {
        Ok(Accelerations::default())
    }
}

/// Holds the last published accelerations constant over the compensation interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantAcceleration {
    pub accelerations: Accelerations,
}

impl ConstantAcceleration {
    pub fn new(accel: Vector3<f64>, rot_accel: Vector3<f64>) -> Self {
        Self {
            accelerations: Accelerations {
                translational: accel,
                rotational: rot_accel,
            },
        }
    }

    pub fn from_entity(data: &PhysicalEntityData) -> Self {
        Self::new(data.accel, data.rot_accel)
    }
}

impl EntityDynamics for ConstantAcceleration {
    fn accelerations(
        &mut self,
        _t: f64,
        _state: &CompensationState,
    ) -> Result<Accelerations, ModelError> {
        Ok(self.accelerations)
    }
}

/// Mass properties and applied loads of a dynamical entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicalEntityData {
    /// Force in the parent frame (N).
    pub force: Vector3<f64>,
    /// Torque in the body frame (N*m).
    pub torque: Vector3<f64>,
    /// Mass (kg).
    pub mass: f64,
    /// Mass rate (kg/s).
    pub mass_rate: f64,
    /// Inertia about the center of mass in the body frame (kg*m2).
    pub inertia: Matrix3<f64>,
    /// Inertia rate (kg*m2/s).
    pub inertia_rate: Matrix3<f64>,
}

impl Default for DynamicalEntityData {
    fn default() -> Self {
        Self {
            force: Vector3::zeros(),
            torque: Vector3::zeros(),
            mass: 1.0,
            mass_rate: 0.0,
            inertia: Matrix3::identity(),
            inertia_rate: Matrix3::zeros(),
        }
    }
}

/// Rigid body with constant applied force and torque.
///
/// a = F / m
/// alpha = I^-1 (tau - w x I w - I_dot w)
#[derive(Clone, Copy, Debug)]
pub struct RigidBodyDynamics {
    data: DynamicalEntityData,
    inertia_inv: Matrix3<f64>,
}

impl RigidBodyDynamics {
    pub fn new(data: DynamicalEntityData) -> Result<Self, CompensationErrors> {
        if data.mass.is_nan() || data.mass <= 0.0 {
            return Err(CompensationErrors::InvalidMass(data.mass));
        }
        let inertia_inv = data
            .inertia
            .try_inverse()
            .ok_or(CompensationErrors::SingularInertia)?;
        Ok(Self { data, inertia_inv })
    }

    pub fn data(&self) -> &DynamicalEntityData {
        &self.data
    }

    /// Updates the applied loads, mass properties are kept.
    pub fn set_loads(&mut self, force: Vector3<f64>, torque: Vector3<f64>) {
        self.data.force = force;
        self.data.torque = torque;
    }
}

impl EntityDynamics for RigidBodyDynamics {
    fn accelerations(
        &mut self,
        _t: f64,
        state: &CompensationState,
    ) -> Result<Accelerations, ModelError> {
        let w = &state.angular_velocity;
        let h = self.data.inertia * w;
        let rotational =
            self.inertia_inv * (self.data.torque - w.cross(&h) - self.data.inertia_rate * w);
        Ok(Accelerations {
            translational: self.data.force / self.data.mass,
            rotational,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn free_drift_is_zero() {
        let a = FreeDrift
            .accelerations(0.0, &CompensationState::default())
            .unwrap();
        assert_eq!(a, Accelerations::default());
    }

    #[test]
    fn constant_acceleration_from_entity() {
        let data = PhysicalEntityData::default()
            .with_accelerations(Vector3::new(0.0, 0.0, -1.62), Vector3::new(0.0, 0.01, 0.0));
        let mut dynamics = ConstantAcceleration::from_entity(&data);
        let a = dynamics
            .accelerations(3.0, &CompensationState::default())
            .unwrap();
        assert_eq!(a.translational, data.accel);
        assert_eq!(a.rotational, data.rot_accel);
    }

    #[test]
    fn rigid_body_force_over_mass() {
        let mut dynamics = RigidBodyDynamics::new(DynamicalEntityData {
            force: Vector3::new(10.0, 0.0, -5.0),
            mass: 2.0,
            ..Default::default()
        })
        .unwrap();
        let a = dynamics
            .accelerations(0.0, &CompensationState::default())
            .unwrap();
        assert_abs_diff_eq!(a.translational[0], 5.0, epsilon = 1e-15);
        assert_abs_diff_eq!(a.translational[2], -2.5, epsilon = 1e-15);
    }

    #[test]
    fn rigid_body_gyroscopic_torque() {
        // spin about a principal axis has no gyroscopic coupling
        let inertia = Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0));
        let mut dynamics = RigidBodyDynamics::new(DynamicalEntityData {
            inertia,
            ..Default::default()
        })
        .unwrap();
        let state = CompensationState {
            angular_velocity: Vector3::new(0.0, 0.0, 2.0),
            ..Default::default()
        };
        let a = dynamics.accelerations(0.0, &state).unwrap();
        assert_abs_diff_eq!(a.rotational.magnitude(), 0.0, epsilon = 1e-15);

        // off axis spin couples: alpha_x = (Iy - Iz) wy wz / Ix
        let state = CompensationState {
            angular_velocity: Vector3::new(0.0, 1.0, 2.0),
            ..Default::default()
        };
        let a = dynamics.accelerations(0.0, &state).unwrap();
        assert_abs_diff_eq!(a.rotational[0], (2.0 - 3.0) * 1.0 * 2.0 / 1.0, epsilon = 1e-14);
    }

    #[test]
    fn rigid_body_rejects_bad_mass_properties() {
        assert!(matches!(
            RigidBodyDynamics::new(DynamicalEntityData {
                mass: 0.0,
                ..Default::default()
            }),
            Err(CompensationErrors::InvalidMass(_))
        ));
        for mass in [-2.0, f64::NAN] {
            assert!(matches!(
                RigidBodyDynamics::new(DynamicalEntityData {
                    mass,
                    ..Default::default()
                }),
                Err(CompensationErrors::InvalidMass(_))
            ));
        }
        assert!(matches!(
            RigidBodyDynamics::new(DynamicalEntityData {
                inertia: Matrix3::zeros(),
                ..Default::default()
            }),
            Err(CompensationErrors::SingularInertia)
        ));
    }
}
