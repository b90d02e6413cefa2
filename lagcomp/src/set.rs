use rayon::prelude::*;

use crate::{
    base::{CompensationStatus, Compensator},
    entity::{EntityId, PhysicalEntity},
    error::CompensationErrors,
    time::TimeManagement,
};

/// Boxed compensator that can be handed to a worker thread.
pub type BoxedCompensator = Box<dyn Compensator + Send>;

/// Per entity result of a batch send or receive.
pub type CompensationReport = Vec<(EntityId, Result<CompensationStatus, CompensationErrors>)>;

struct EntitySlot<E> {
    entity: E,
    compensator: Option<BoxedCompensator>,
}

/// Owns a federate's entities and the compensator attached to each.
///
/// Each compensator only touches the entity in its own slot, so a data cycle
/// runs all of them in parallel.
pub struct CompensationSet<E> {
    slots: Vec<EntitySlot<E>>,
}

impl<E> Default for CompensationSet<E> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<E: PhysicalEntity + Send> CompensationSet<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, entity: E) -> EntityId {
        let id = EntityId(self.slots.len());
        self.slots.push(EntitySlot {
            entity,
            compensator: None,
        });
        id
    }

    /// Attach a compensator to an entity, replacing any previous one.
    ///
    /// The compensator must have been built for `id`.
    pub fn attach(
        &mut self,
        id: EntityId,
        compensator: BoxedCompensator,
    ) -> Result<(), CompensationErrors> {
        let found = compensator.base().entity();
        if found != id {
            return Err(CompensationErrors::EntityMismatch {
                expected: id,
                found,
            });
        }
        let slot = self
            .slots
            .get_mut(id.0)
            .ok_or(CompensationErrors::UnknownEntity(id))?;
        slot.compensator = Some(compensator);
        Ok(())
    }

    /// Detach and return an entity's compensator.
    pub fn detach(&mut self, id: EntityId) -> Option<BoxedCompensator> {
        self.slots.get_mut(id.0)?.compensator.take()
    }

    pub fn entity(&self, id: EntityId) -> Option<&E> {
        self.slots.get(id.0).map(|slot| &slot.entity)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut E> {
        self.slots.get_mut(id.0).map(|slot| &mut slot.entity)
    }

    pub fn compensator(&self, id: EntityId) -> Option<&(dyn Compensator + Send)> {
        self.slots.get(id.0)?.compensator.as_deref()
    }

    pub fn compensator_mut(&mut self, id: EntityId) -> Option<&mut BoxedCompensator> {
        self.slots.get_mut(id.0)?.compensator.as_mut()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &E)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (EntityId(i), &slot.entity))
    }

    /// Initialize every attached compensator, stopping at the first failure.
    pub fn initialize_all(&mut self) -> Result<(), CompensationErrors> {
        for slot in &mut self.slots {
            if let Some(compensator) = slot.compensator.as_mut() {
                compensator.initialize()?;
            }
        }
        Ok(())
    }

    /// Run the send side for every entity with a compensator.
    pub fn send_all(&mut self, time: &(dyn TimeManagement + Sync)) -> CompensationReport {
        self.run_all(|compensator, entity| compensator.send_lag_compensation(entity, time))
    }

    /// Run the receive side for every entity with a compensator.
    pub fn receive_all(&mut self, time: &(dyn TimeManagement + Sync)) -> CompensationReport {
        self.run_all(|compensator, entity| compensator.receive_lag_compensation(entity, time))
    }

    fn run_all<F>(&mut self, run: F) -> CompensationReport
    where
        F: Fn(
                &mut BoxedCompensator,
                &mut dyn PhysicalEntity,
            ) -> Result<CompensationStatus, CompensationErrors>
            + Sync,
    {
        self.slots
            .par_iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| {
                let compensator = slot.compensator.as_mut()?;
                let id = EntityId(i);
                let result = run(compensator, &mut slot.entity);
                if let Err(e) = &result {
                    tracing::warn!(entity = %id, "lag compensation failed: {e}");
                }
                Some((id, result))
            })
            .collect()
    }
}
