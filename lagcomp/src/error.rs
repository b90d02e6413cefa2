use lagcomp_diffeq::ModelError;
use rotations::quaternion::QuaternionErrors;
use thiserror::Error;

use crate::entity::EntityId;

/// Errors raised while configuring or running latency compensation.
#[derive(Debug, Error)]
pub enum CompensationErrors {
    #[error("tolerance must be less than the step size: dt = {step_size}; tolerance = {tolerance}")]
    ToleranceNotLessThanStep { step_size: f64, tolerance: f64 },
    #[error("step size must be finite and greater than zero, got {0}")]
    InvalidStepSize(f64),
    #[error("tolerance must be finite and not negative, got {0}")]
    InvalidTolerance(f64),
    #[error("compensator used before a successful initialize()")]
    NotInitialized,
    #[error("compensation interval is not finite: [{t_begin}, {t_end}]")]
    InvalidInterval { t_begin: f64, t_end: f64 },
    #[error("no entity with id {0}")]
    UnknownEntity(EntityId),
    #[error("compensator bound to entity {found} attached to entity {expected}")]
    EntityMismatch { expected: EntityId, found: EntityId },
    #[error("mass must be greater than zero, got {0}")]
    InvalidMass(f64),
    #[error("inertia matrix is singular")]
    SingularInertia,
    #[error("dynamics model failed: {0}")]
    Dynamics(ModelError),
    #[error("{0}")]
    Quaternion(#[from] QuaternionErrors),
    #[error("bad compensator configuration: {0}")]
    Config(#[from] ron::error::SpannedError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl CompensationErrors {
    /// True for errors that mean the compensator was misconfigured and the
    /// federate cannot safely continue.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CompensationErrors::ToleranceNotLessThanStep { .. }
                | CompensationErrors::InvalidStepSize(_)
                | CompensationErrors::InvalidTolerance(_)
                | CompensationErrors::NotInitialized
                | CompensationErrors::EntityMismatch { .. }
                | CompensationErrors::Config(_)
        )
    }
}
