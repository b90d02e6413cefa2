//! Latency compensation for distributed simulation entities.
//!
//! A federate publishing an entity's state predicts it forward by its
//! lookahead before sending, and a federate receiving one brings it forward
//! from its data time to the current scenario time. Both use the same
//! fixed-step integration of the entity's dynamics.

pub mod base;
pub mod config;
pub mod driver;
pub mod dynamics;
pub mod entity;
pub mod error;
pub mod integ;
pub mod set;
pub mod state;
pub mod time;

pub use base::{CompensationStatus, Compensator, LagCompBase};
pub use config::{CompensationParameters, CompensatorConfig, Verbosity};
pub use dynamics::{
    Accelerations, ConstantAcceleration, DynamicalEntityData, EntityDynamics, FreeDrift,
    RigidBodyDynamics,
};
pub use entity::{EntityId, EntityState, PhysicalEntity, PhysicalEntityData, PhysicalEntityRecord};
pub use error::CompensationErrors;
pub use integ::IntegratingCompensator;
pub use set::{BoxedCompensator, CompensationReport, CompensationSet};
pub use state::{CompensationState, CompensationStateRate, QuaternionRate};
pub use time::{FederationClock, LookaheadInterval, TimeManagement};

pub use lagcomp_diffeq::RungeKuttaMethods;
