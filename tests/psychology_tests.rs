mod common;

use common::{never_world, run};
use highway_sim::simulation::{
    braking_intensity, lane_change_chance, DrivingMode, ParameterSet, VehicleType,
};

#[test]
fn test_lane_change_chance_endpoints() {
    assert!((lane_change_chance(1.0, 1.0) - 0.001).abs() < 1e-5);
    assert!((lane_change_chance(10.0, 1.0) - 0.08).abs() < 1e-4);
}

#[test]
fn test_lane_change_chance_grows_with_mood() {
    let mut previous = lane_change_chance(1.0, 1.0);
    for step in 1..=90 {
        let mood = 1.0 + step as f32 * 0.1;
        let chance = lane_change_chance(mood, 1.0);
        assert!(chance > previous, "not increasing at mood {}", mood);
        previous = chance;
    }
}

#[test]
fn test_lane_change_chance_scales_with_aggression() {
    let calm = lane_change_chance(5.0, 1.0);
    let aggressive = lane_change_chance(5.0, 3.0);
    assert!((aggressive - calm * 3.0).abs() < 1e-6);

    // Out-of-range moods are clamped first
    assert_eq!(lane_change_chance(-4.0, 1.0), lane_change_chance(1.0, 1.0));
    assert_eq!(lane_change_chance(42.0, 1.0), lane_change_chance(10.0, 1.0));
}

#[test]
fn test_braking_intensity() {
    assert_eq!(braking_intensity(200.0, 200.0), 0.0);
    assert_eq!(braking_intensity(0.0, 200.0), 1.0);
    assert!((braking_intensity(50.0, 200.0) - 0.75).abs() < 1e-6);
    assert_eq!(braking_intensity(500.0, 200.0), 0.0);
}

#[test]
fn test_stuck_driver_gets_agitated() {
    let params = ParameterSet::default();
    let mut world = never_world(DrivingMode::Problem);
    // A stalled vehicle blocks the lane
    world.add_vehicle(VehicleType::Truck, 2, 30.0, 0.0, 0.0);
    let stuck = world.add_vehicle(VehicleType::Car, 2, 0.0, 0.0, 9.0);

    // Under the threshold nothing changes yet
    run(&mut world, &params, 100);
    let vehicle = world.get_vehicle(stuck).unwrap();
    assert!(vehicle.time_stuck_in_traffic > 1.5);
    assert_eq!(vehicle.mood_level, 1.0);

    run(&mut world, &params, 200);
    let vehicle = world.get_vehicle(stuck).unwrap();
    assert!(vehicle.mood_level > 1.0);
    assert!(vehicle.lane_change_chance > lane_change_chance(1.0, 1.0));
    assert!(vehicle.braking_intensity > 0.8);
}

#[test]
fn test_free_flowing_driver_stays_calm() {
    let params = ParameterSet::default();
    let mut world = never_world(DrivingMode::Problem);
    let id = world.add_vehicle(VehicleType::Car, 1, 0.0, 7.0, 7.0);

    run(&mut world, &params, 100);
    let vehicle = world.get_vehicle(id).unwrap();
    assert_eq!(vehicle.time_stuck_in_traffic, 0.0);
    assert_eq!(vehicle.mood_level, 1.0);
}

#[test]
fn test_completed_lane_change_relaxes_driver() {
    let params = ParameterSet::default();
    let mut world = never_world(DrivingMode::Solution);
    let id = world.add_vehicle(VehicleType::Car, 3, 0.0, 5.0, 5.0);
    {
        let vehicle = world.get_vehicle_mut(id).unwrap();
        vehicle.set_mood(5.0, params.lane_change_aggression);
        vehicle.time_stuck_in_traffic = 1.0;
        assert!(vehicle.request_lane_change(2));
    }

    for _ in 0..200 {
        world.step(common::DT, &params);
        if world.get_vehicle(id).unwrap().merge_state.is_cruising() {
            break;
        }
    }

    let vehicle = world.get_vehicle(id).unwrap();
    assert_eq!(vehicle.lane, 2);
    assert!((vehicle.mood_level - 4.0).abs() < 1e-4);
    assert_eq!(vehicle.time_stuck_in_traffic, 0.0);
}
