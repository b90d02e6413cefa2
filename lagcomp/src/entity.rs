use std::fmt;

use nalgebra::Vector3;
use rotations::quaternion::Quaternion;
use serde::{Deserialize, Serialize};

/// Index of an entity in a `CompensationSet`.
///
/// Compensators hold one of these instead of a reference, the set owns the entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub usize);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Space-time coordinate state as published for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub attitude: Quaternion,
    pub angular_velocity: Vector3<f64>,
    pub time: f64,
}

impl Default for EntityState {
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

/// The working-data interface a compensator needs from an entity.
///
/// An entity keeps two copies of its state: the working data the rest of the
/// simulation reads and writes, and the packing data exchanged with the
/// federation. Compensation always operates on the packing data.
pub trait PhysicalEntity {
    fn name(&self) -> &str;

    /// Time of the packing data (s).
    fn time(&self) -> f64 {
        self.packing_state().time
    }

    fn packing_state(&self) -> &EntityState;

    fn packing_state_mut(&mut self) -> &mut EntityState;

    /// Copy the working data into the packing data before a send.
    fn pack_from_working_data(&mut self);

    /// Copy the packing data into the working data after a receive.
    fn unpack_into_working_data(&mut self);

    /// True if the state attribute was reflected this data cycle.
    fn state_received(&self) -> bool;
}

/// The published attributes of a physical entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalEntityData {
    pub name: String,
    pub entity_type: String,
    pub status: String,
    pub parent_frame: String,
    pub state: EntityState,
    /// Acceleration in the parent frame (m/s2).
    pub accel: Vector3<f64>,
    /// Rotational acceleration in the body frame (rad/s2).
    pub rot_accel: Vector3<f64>,
    /// Center of mass in the structural frame (m).
    pub cm: Vector3<f64>,
    pub body_wrt_struct: Quaternion,
}

impl PhysicalEntityData {
    pub fn new(name: impl Into<String>, state: EntityState) -> Self {
        Self {
            name: name.into(),
            state,
            ..Default::default()
        }
    }

    pub fn with_parent_frame(mut self, parent_frame: impl Into<String>) -> Self {
        self.parent_frame = parent_frame.into();
        self
    }

    pub fn with_accelerations(mut self, accel: Vector3<f64>, rot_accel: Vector3<f64>) -> Self {
        self.accel = accel;
        self.rot_accel = rot_accel;
        self
    }
}

/// A physical entity with separate working and packing data, and the
/// per-cycle reception flag of its state attribute.
#[derive(Clone, Debug, Default)]
pub struct PhysicalEntityRecord {
    pub working: PhysicalEntityData,
    packing: PhysicalEntityData,
    state_received: bool,
}

impl PhysicalEntityRecord {
    pub fn new(data: PhysicalEntityData) -> Self {
        Self {
            packing: data.clone(),
            working: data,
            state_received: false,
        }
    }

    pub fn packing(&self) -> &PhysicalEntityData {
        &self.packing
    }

    /// Deliver a state attribute value from the federation into the packing data.
    pub fn reflect_state(&mut self, state: EntityState) {
        self.packing.state = state;
        self.state_received = true;
    }

    /// Clear the reception flag at the end of a data cycle.
    pub fn clear_received(&mut self) {
        self.state_received = false;
    }
}

impl PhysicalEntity for PhysicalEntityRecord {
    fn name(&self) -> &str {
        &self.working.name
    }

    fn packing_state(&self) -> &EntityState {
        &self.packing.state
    }

    fn packing_state_mut(&mut self) -> &mut EntityState {
        &mut self.packing.state
    }

    fn pack_from_working_data(&mut self) {
        self.packing.clone_from(&self.working);
    }

    fn unpack_into_working_data(&mut self) {
        self.working.clone_from(&self.packing);
    }

    fn state_received(&self) -> bool {
        self.state_received
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PhysicalEntityRecord {
        let state = EntityState {
            position: Vector3::new(1.0, 0.0, 0.0),
            time: 2.0,
            ..Default::default()
        };
        PhysicalEntityRecord::new(
            PhysicalEntityData::new("lander", state).with_parent_frame("MoonCentricFixed"),
        )
    }

    #[test]
    fn pack_copies_working_into_packing() {
        let mut entity = record();
        entity.working.state.position = Vector3::new(5.0, 0.0, 0.0);
        entity.working.status = "descending".into();
        assert_eq!(entity.packing_state().position[0], 1.0);

        entity.pack_from_working_data();
        assert_eq!(entity.packing_state().position[0], 5.0);
        assert_eq!(entity.packing().status, "descending");
    }

    #[test]
    fn reflect_sets_received_and_unpack_publishes() {
        let mut entity = record();
        assert!(!entity.state_received());

        let state = EntityState {
            velocity: Vector3::new(0.0, 3.0, 0.0),
            time: 7.0,
            ..Default::default()
        };
        entity.reflect_state(state);
        assert!(entity.state_received());
        assert_eq!(entity.time(), 7.0);
        // working data untouched until unpacked
        assert_eq!(entity.working.state.time, 2.0);

        entity.unpack_into_working_data();
        assert_eq!(entity.working.state, state);
        assert_eq!(entity.name(), "lander");
        assert_eq!(entity.working.parent_frame, "MoonCentricFixed");

        entity.clear_received();
        assert!(!entity.state_received());
    }

    #[test]
    fn entity_id_display() {
        assert_eq!(EntityId(3).to_string(), "#3");
    }
}
