//! Send and receive sides of the latency compensation protocol.
//!
//! Both sides run the same load, rate, compensate, unload sequence against the
//! entity's packing data. They differ in the interval they compensate over and
//! in when they run: send always compensates, receive only when a new state
//! attribute arrived this cycle.

use crate::{
    base::{CompensationStatus, Compensator},
    config::Verbosity,
    entity::PhysicalEntity,
    error::CompensationErrors,
    time::TimeManagement,
};

/// Compensate the entity's current state forward by the lookahead before it is sent.
///
/// What gets packed for transmission is the predicted state at the time the
/// message is expected to arrive, not the state at capture time.
pub fn send_lag_compensation<C>(
    compensator: &mut C,
    entity: &mut dyn PhysicalEntity,
    time: &dyn TimeManagement,
) -> Result<CompensationStatus, CompensationErrors>
where
    C: Compensator + ?Sized,
{
    let begin_t = time.scenario_time();
    let compensate_dt = time.lookahead().seconds();
    let end_t = begin_t + compensate_dt;

    let base = compensator.base_mut();
    base.set_compensate_dt(compensate_dt);
    let verbosity = base.verbosity();
    let id = base.entity();

    if verbosity.shows(Verbosity::Trace) {
        tracing::debug!(
            entity = %id,
            name = entity.name(),
            scenario_time = begin_t,
            lookahead = compensate_dt,
            adjusted_time = end_t,
            "send lag compensation"
        );
    }

    // Copy the current working state over to the compensation buffer.
    entity.pack_from_working_data();
    base.load(entity);
    base.compute_quaternion_rate();

    if verbosity.shows(Verbosity::Debug) {
        tracing::debug!("send data before compensation:\n{}", base.dump());
    }

    let status = compensator.compensate(begin_t, end_t)?;

    let base = compensator.base();
    if verbosity.shows(Verbosity::Debug) {
        tracing::debug!("send data after compensation:\n{}", base.dump());
    }
    if verbosity.shows(Verbosity::Summary) {
        tracing::info!(entity = %id, ?status, "send compensated to {end_t}");
    }

    base.unload(entity);
    Ok(status)
}

/// Bring a just received state forward from its data time to the current
/// scenario time and publish it into the entity's working data.
///
/// Attributes arrive independently and at their own rates, so a cycle without
/// a new state is normal. In that case neither the packing nor the working
/// data is touched.
pub fn receive_lag_compensation<C>(
    compensator: &mut C,
    entity: &mut dyn PhysicalEntity,
    time: &dyn TimeManagement,
) -> Result<CompensationStatus, CompensationErrors>
where
    C: Compensator + ?Sized,
{
    let end_t = time.scenario_time();
    let data_t = entity.time();
    let compensate_dt = end_t - data_t;

    let base = compensator.base_mut();
    let verbosity = base.verbosity();
    let id = base.entity();

    if verbosity.shows(Verbosity::Trace) {
        tracing::debug!(
            entity = %id,
            name = entity.name(),
            scenario_time = end_t,
            data_time = data_t,
            comp_time_step = compensate_dt,
            received = entity.state_received(),
            "receive lag compensation"
        );
    }

    if !entity.state_received() {
        return Ok(CompensationStatus::Skipped);
    }

    base.set_compensate_dt(compensate_dt);
    base.load(entity);
    base.compute_quaternion_rate();

    if verbosity.shows(Verbosity::Debug) {
        tracing::debug!("receive data before compensation:\n{}", base.dump());
    }

    let status = compensator.compensate(data_t, end_t)?;

    let base = compensator.base();
    if verbosity.shows(Verbosity::Debug) {
        tracing::debug!("receive data after compensation:\n{}", base.dump());
    }
    if verbosity.shows(Verbosity::Summary) {
        tracing::info!(entity = %id, ?status, "receive compensated from {data_t} to {end_t}");
    }

    base.unload(entity);
    entity.unpack_into_working_data();
    Ok(status)
}
