use approx::assert_abs_diff_eq;
use lagcomp::*;
use nalgebra::Vector3;
use rotations::quaternion::{Quaternion, UnitQuaternion};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn lander() -> PhysicalEntityRecord {
    let state = EntityState {
        position: Vector3::new(1000.0, -250.0, 40.0),
        velocity: Vector3::new(3.0, 1.0, -2.0),
        attitude: Quaternion::from_axis_angle(&Vector3::new(1.0, 1.0, 0.0), 0.3).unwrap(),
        angular_velocity: Vector3::new(0.01, -0.02, 0.05),
        time: 0.0,
    };
    PhysicalEntityRecord::new(
        PhysicalEntityData::new("lander", state).with_parent_frame("MoonCentricInertial"),
    )
}

fn compensator(verbosity: Verbosity) -> IntegratingCompensator<FreeDrift> {
    let config = CompensatorConfig::default()
        .with_step_size(0.01)
        .with_tolerance(1.0e-6)
        .with_verbosity(verbosity);
    let mut compensator = IntegratingCompensator::from_config(EntityId(0), FreeDrift, &config);
    compensator.initialize().unwrap();
    compensator
}

#[test]
fn send_publishes_state_at_arrival_time() {
    let mut entity = lander();
    entity.working.state.time = 20.0;
    let working_before = entity.working.clone();
    let mut compensator = compensator(Verbosity::Off);
    let clock = FederationClock::new(20.0, LookaheadInterval::from_seconds(0.25));

    let status = compensator
        .send_lag_compensation(&mut entity, &clock)
        .unwrap();
    assert!(matches!(status, CompensationStatus::Converged { .. }));
    assert_eq!(compensator.base().compensate_dt(), 0.25);

    let packed = entity.packing_state();
    assert_eq!(packed.time, 20.25);
    assert_abs_diff_eq!(packed.position[0], 1000.0 + 3.0 * 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(packed.position[1], -250.0 + 1.0 * 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(packed.position[2], 40.0 - 2.0 * 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(packed.attitude.mag(), 1.0, epsilon = 1e-12);
    // the rest of the simulation keeps seeing the uncompensated state
    assert_eq!(entity.working, working_before);
}

#[test]
fn send_with_zero_lookahead_publishes_current_state() {
    let mut entity = lander();
    let mut compensator = compensator(Verbosity::Off);
    let clock = FederationClock::new(0.0, LookaheadInterval::ZERO);
    let status = compensator
        .send_lag_compensation(&mut entity, &clock)
        .unwrap();
    assert_eq!(status, CompensationStatus::NoOp);
    assert_eq!(*entity.packing_state(), entity.working.state);
}

#[test]
fn receive_without_new_data_touches_nothing() {
    let mut entity = lander();
    entity.working.state.position = Vector3::new(-1.0, -2.0, -3.0);
    let working_before = entity.working.clone();
    let packing_before = entity.packing().clone();

    let mut compensator = compensator(Verbosity::Trace);
    let clock = FederationClock::new(5.0, LookaheadInterval::ZERO);
    let status = compensator
        .receive_lag_compensation(&mut entity, &clock)
        .unwrap();

    assert_eq!(status, CompensationStatus::Skipped);
    assert_eq!(entity.working, working_before);
    assert_eq!(*entity.packing(), packing_before);
}

#[test]
fn receive_brings_state_to_scenario_time() {
    let mut entity = lander();
    let received = EntityState {
        position: Vector3::new(10.0, 0.0, 0.0),
        velocity: Vector3::new(-4.0, 0.0, 0.5),
        time: 9.8,
        ..Default::default()
    };
    entity.reflect_state(received);

    let mut compensator = compensator(Verbosity::Off);
    let clock = FederationClock::new(10.0, LookaheadInterval::from_seconds(0.1));
    compensator
        .receive_lag_compensation(&mut entity, &clock)
        .unwrap();
    assert_abs_diff_eq!(compensator.base().compensate_dt(), 0.2, epsilon = 1e-12);

    let working = &entity.working.state;
    assert_eq!(working.time, 10.0);
    assert_abs_diff_eq!(working.position[0], 10.0 - 4.0 * 0.2, epsilon = 1e-9);
    assert_abs_diff_eq!(working.position[2], 0.5 * 0.2, epsilon = 1e-9);
    assert_eq!(*entity.packing_state(), *working);

    // once the cycle is over the same data is not compensated again
    entity.clear_received();
    let working_before = entity.working.clone();
    let later = FederationClock::new(10.5, LookaheadInterval::ZERO);
    let status = compensator
        .receive_lag_compensation(&mut entity, &later)
        .unwrap();
    assert_eq!(status, CompensationStatus::Skipped);
    assert_eq!(entity.working, working_before);
}

#[test]
fn receive_of_current_data_is_a_noop() {
    let mut entity = lander();
    let received = EntityState {
        time: 4.0,
        ..*entity.packing_state()
    };
    entity.reflect_state(received);
    let mut compensator = compensator(Verbosity::Off);
    let clock = FederationClock::new(4.0, LookaheadInterval::ZERO);
    let status = compensator
        .receive_lag_compensation(&mut entity, &clock)
        .unwrap();
    assert_eq!(status, CompensationStatus::NoOp);
    assert_eq!(entity.working.state, received);
}

#[test]
fn verbosity_does_not_change_results() {
    init_tracing();
    let clock = FederationClock::new(3.0, LookaheadInterval::from_seconds(0.37));

    let mut quiet_entity = lander();
    let mut quiet = compensator(Verbosity::Off);
    quiet
        .send_lag_compensation(&mut quiet_entity, &clock)
        .unwrap();

    let mut loud_entity = lander();
    let mut loud = compensator(Verbosity::Trace);
    loud.send_lag_compensation(&mut loud_entity, &clock)
        .unwrap();

    assert_eq!(quiet_entity.packing_state(), loud_entity.packing_state());
    assert_eq!(quiet.base().state(), loud.base().state());
}

#[test]
fn time_reversal_returns_to_start() {
    // integrating forward with negated rates is the same as integrating backward
    let start = CompensationState {
        position: Vector3::new(5.0, 6.0, 7.0),
        velocity: Vector3::new(0.3, -0.1, 0.2),
        attitude: UnitQuaternion::rand().unwrap().0,
        angular_velocity: Vector3::new(0.4, 0.1, -0.7),
        time: 0.0,
    };
    let mut compensator = compensator(Verbosity::Off);
    *compensator.base_mut().state_mut() = start;
    compensator.compensate(0.0, 1.5).unwrap();

    let state = compensator.base_mut().state_mut();
    state.velocity = -state.velocity;
    state.angular_velocity = -state.angular_velocity;
    compensator.compensate(0.0, 1.5).unwrap();

    let end = compensator.base().state();
    for i in 0..3 {
        assert_abs_diff_eq!(end.position[i], start.position[i], epsilon = 1e-9);
        assert_abs_diff_eq!(-end.velocity[i], start.velocity[i], epsilon = 1e-12);
    }
    // q and -q are the same attitude
    assert_abs_diff_eq!(end.attitude.dot(&start.attitude).abs(), 1.0, epsilon = 1e-9);
}

#[test]
fn rigid_body_compensation() {
    let data = DynamicalEntityData {
        force: Vector3::new(0.0, 0.0, 20.0),
        mass: 4.0,
        ..Default::default()
    };
    let dynamics = RigidBodyDynamics::new(data).unwrap();
    let mut compensator = IntegratingCompensator::new(EntityId(0), dynamics);
    compensator.initialize().unwrap();

    let mut entity =
        PhysicalEntityRecord::new(PhysicalEntityData::new("hopper", EntityState::default()));
    let clock = FederationClock::new(0.0, LookaheadInterval::from_seconds(2.0));
    compensator
        .send_lag_compensation(&mut entity, &clock)
        .unwrap();

    // a = F / m = 5 m/s2 along z
    let packed = entity.packing_state();
    assert_abs_diff_eq!(packed.velocity[2], 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(packed.position[2], 0.5 * 5.0 * 4.0, epsilon = 1e-9);
}

#[test]
fn compensator_from_ron_file() {
    let path = std::env::temp_dir().join(format!("lagcomp_config_{}.ron", std::process::id()));
    std::fs::write(
        &path,
        "(step_size: 0.1, tolerance: 0.01, method: Midpoint, verbosity: Summary)",
    )
    .unwrap();
    let config = CompensatorConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.method, RungeKuttaMethods::Midpoint);
    assert_eq!(config.verbosity, Verbosity::Summary);

    let mut compensator = IntegratingCompensator::from_config(EntityId(0), FreeDrift, &config);
    compensator.initialize().unwrap();
    *compensator.base_mut().state_mut() = CompensationState {
        velocity: Vector3::new(1.0, 0.0, 0.0),
        ..Default::default()
    };
    let status = compensator.compensate(0.0, 1.0).unwrap();
    assert_eq!(status, CompensationStatus::Converged { steps: 10 });
    assert_abs_diff_eq!(compensator.base().state().position[0], 1.0, epsilon = 1e-12);
}

#[test]
fn fatal_config_is_reported_before_any_compensation() {
    let config = CompensatorConfig::from_ron_str("(step_size: 0.01, tolerance: 0.05)").unwrap();
    let mut compensator = IntegratingCompensator::from_config(EntityId(0), FreeDrift, &config);
    let err = compensator.initialize().unwrap_err();
    assert!(err.is_fatal());

    let mut entity = lander();
    let before = entity.packing().clone();
    let clock = FederationClock::new(1.0, LookaheadInterval::from_seconds(0.1));
    assert!(compensator.send_lag_compensation(&mut entity, &clock).is_err());
    // packing was refreshed from working, but nothing compensated was unloaded
    assert_eq!(entity.packing_state().position, before.state.position);
}
