mod common;

use common::{never_world, run, DT};
use highway_sim::simulation::{
    DrivingMode, EmergencyTimer, IntentKind, ParameterSet, SimWorld, VehicleType,
    EMERGENCY_DURATION,
};

#[test]
fn test_timer_counts_down_and_expires_once() {
    let mut timer = EmergencyTimer::default();
    assert!(!timer.is_active());
    assert!(!timer.advance(1.0));

    timer.activate();
    assert_eq!(timer.remaining(), Some(EMERGENCY_DURATION));
    assert!(!timer.advance(4.0));
    assert!(timer.is_active());
    assert!(timer.advance(6.0));
    assert!(!timer.is_active());
    assert!(!timer.advance(6.0));
}

#[test]
fn test_new_dispatch_restarts_timer() {
    let mut timer = EmergencyTimer::default();
    timer.activate();
    timer.advance(8.0);
    timer.activate();
    assert!(!timer.advance(8.0));
    assert!(timer.is_active());
}

#[test]
fn test_timer_runs_while_paused() {
    let params = ParameterSet::default();
    let mut world = never_world(DrivingMode::Problem);
    world.spawn_emergency_vehicle();
    world.pause();
    assert_eq!(world.emergency_remaining(), Some(EMERGENCY_DURATION));

    for _ in 0..250 {
        assert!(!world.step(0.05, &params));
    }
    assert!(!world.emergency_active());
    // Paused: nothing moved
    assert_eq!(world.ticks, 0);
}

#[test]
fn test_timer_runs_through_discarded_ticks() {
    let params = ParameterSet::default();
    let mut world = never_world(DrivingMode::Problem);
    world.spawn_emergency_vehicle();

    for _ in 0..19 {
        assert!(!world.step(0.5, &params));
    }
    assert!(world.emergency_active());
    world.step(0.5, &params);
    assert!(!world.emergency_active());
}

#[test]
fn test_emergency_spawn_bypasses_population_cap() {
    let params = ParameterSet {
        max_vehicles: 10,
        ..ParameterSet::default()
    };
    let mut world = never_world(DrivingMode::Problem);
    world.set_params(&params);
    for i in 0..10 {
        world.add_vehicle(VehicleType::Car, i % 5, 100.0 * i as f32, 5.0, 5.0);
    }

    let id = world.spawn_emergency_vehicle();
    assert_eq!(world.vehicle_count(), 11);
    let vehicle = world.get_vehicle(id).unwrap();
    assert!(vehicle.is_emergency());
    assert_eq!(vehicle.max_speed, 10.0);
    assert_eq!(vehicle.mood_level, 10.0);
    assert_eq!(vehicle.mental_level, 10.0);
    assert_eq!(vehicle.position.x, -200.0);
}

/// Emergency vehicle right behind a car in lane 2, with the emergency raised
fn corridor_world(mode: DrivingMode) -> (SimWorld, highway_sim::simulation::VehicleId) {
    let mut world = never_world(mode);
    world.spawn_emergency_vehicle();
    world.add_vehicle(VehicleType::Emergency, 2, 150.0, 8.0, 10.0);
    let car = world.add_vehicle(VehicleType::Car, 2, 200.0, 6.0, 6.0);
    (world, car)
}

#[test]
fn test_coordinated_drivers_open_a_corridor() {
    let params = ParameterSet::default();
    let (mut world, car) = corridor_world(DrivingMode::Solution);

    world.step(DT, &params);

    let vehicle = world.get_vehicle(car).unwrap();
    assert_eq!(vehicle.merge_state.target_lane(), Some(3));
    assert_eq!(
        vehicle.intent_signal.map(|s| s.kind),
        Some(IntentKind::Emergency)
    );
    assert!(vehicle.speed < 6.0);
}

#[test]
fn test_coordinated_neighbours_move_away_from_emergency_lane() {
    let params = ParameterSet::default();
    let mut world = never_world(DrivingMode::Solution);
    world.spawn_emergency_vehicle();
    world.add_vehicle(VehicleType::Emergency, 2, 150.0, 8.0, 10.0);
    let inner = world.add_vehicle(VehicleType::Car, 1, 200.0, 6.0, 6.0);
    let outer = world.add_vehicle(VehicleType::Car, 3, 200.0, 5.0, 5.0);
    let far_lane = world.add_vehicle(VehicleType::Car, 0, 200.0, 6.0, 6.0);

    world.step(DT, &params);

    assert_eq!(world.get_vehicle(inner).unwrap().merge_state.target_lane(), Some(0));
    assert_eq!(world.get_vehicle(outer).unwrap().merge_state.target_lane(), Some(4));
    // Two lanes away: not part of the corridor
    let untouched = world.get_vehicle(far_lane).unwrap();
    assert!(untouched.merge_state.is_cruising());
    assert!(untouched.intent_signal.is_none());
}

#[test]
fn test_uncoordinated_drivers_may_ignore_the_siren() {
    let params = ParameterSet::default();
    let (mut world, car) = corridor_world(DrivingMode::Problem);

    world.step(DT, &params);

    let vehicle = world.get_vehicle(car).unwrap();
    assert!(vehicle.merge_state.is_cruising());
    assert!(vehicle.intent_signal.is_none());
    assert_eq!(vehicle.speed, 6.0);
}

#[test]
fn test_response_time_recorded_when_emergency_vehicle_exits() {
    let params = ParameterSet::default();
    let mut world = never_world(DrivingMode::Solution);
    let id = world.spawn_emergency_vehicle();
    assert_eq!(world.stats.emergency_response_time, 0.0);

    run(&mut world, &params, 400);

    assert!(world.get_vehicle(id).is_none());
    assert_eq!(world.stats.total_exited, 1);
    let response = world.stats.emergency_response_time;
    assert!(response > 0.0 && response < 400.0 * DT, "{}", response);
}
