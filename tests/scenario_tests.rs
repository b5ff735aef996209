mod common;

use common::{always_world, never_world, DT};
use highway_sim::simulation::{
    find_leader, DrivingMode, ParameterSet, SimWorld, VehicleType, HIGHWAY_WIDTH,
    NO_OVERTAKE_EPSILON, RUSH_HOUR_COUNT,
};

const MODES: [DrivingMode; 2] = [DrivingMode::Problem, DrivingMode::Solution];

/// A fast follower closing on a slow leader ends up at the leader's pace
#[test]
fn test_fast_follower_never_passes_slow_leader() {
    let params = ParameterSet::default();

    for mode in MODES {
        let mut world = never_world(mode);
        let leader = world.add_vehicle(VehicleType::Car, 2, 500.0, 1.0, 1.0);
        let follower = world.add_vehicle(VehicleType::Car, 2, 0.0, 9.0, 9.0);

        for tick in 0..200 {
            assert!(world.step(DT, &params));
            let l = world.get_vehicle(leader).unwrap().clone();
            let f = world.get_vehicle(follower).unwrap().clone();
            assert!(
                f.position.x < l.position.x,
                "{:?}: follower reached leader at tick {}",
                mode,
                tick
            );
            // One tick after the leader comes into view
            if l.position.x - f.position.x < params.lookahead_threshold - 10.0 {
                assert!(f.speed <= l.speed + NO_OVERTAKE_EPSILON + 1e-4);
            }
        }

        let f = world.get_vehicle(follower).unwrap();
        assert!(f.speed <= 1.15, "{:?}: follower speed {}", mode, f.speed);
    }
}

/// Tick at which the vehicle first requests a merge, and the lane it ends in
fn drive_through_closure(mode: DrivingMode) -> (usize, usize) {
    let params = ParameterSet::default();
    let mut world = never_world(mode);
    world.toggle_lane_closure(4).unwrap();
    let id = world.add_vehicle(VehicleType::Car, 4, 0.0, 3.0, 3.0);

    let mut first_request = None;
    for tick in 0..2000 {
        world.step(DT, &params);
        let vehicle = world.get_vehicle(id).unwrap();
        if first_request.is_none() && !vehicle.merge_state.is_cruising() {
            first_request = Some(tick);
        }
        if vehicle.position.x > HIGHWAY_WIDTH * 0.9 {
            return (first_request.expect("vehicle never merged"), vehicle.lane);
        }
    }
    panic!("{:?}: vehicle never reached the end of the closure", mode);
}

#[test]
fn test_lane_closure_is_left_earlier_by_coordinated_drivers() {
    let (problem_tick, problem_lane) = drive_through_closure(DrivingMode::Problem);
    let (solution_tick, solution_lane) = drive_through_closure(DrivingMode::Solution);

    assert_ne!(problem_lane, 4);
    assert_ne!(solution_lane, 4);
    assert!(
        solution_tick < problem_tick,
        "solution merged at {}, problem at {}",
        solution_tick,
        problem_tick
    );
}

#[test]
fn test_emergency_clears_itself() {
    let params = ParameterSet::default();
    let mut world = SimWorld::new_with_seed(DrivingMode::Solution, 7);

    world.spawn_emergency_vehicle();
    assert!(world.emergency_active());

    for _ in 0..150 {
        world.step(0.05, &params);
    }
    assert!(world.emergency_active(), "cleared after only 7.5s");

    for _ in 0..100 {
        world.step(0.05, &params);
    }
    assert!(!world.emergency_active(), "still active after 12.5s");
}

#[test]
fn test_rush_hour_adds_eight_vehicles() {
    for mode in MODES {
        let mut world = always_world(mode);
        let before = world.vehicle_count();
        let added = world.trigger_rush_hour();

        assert_eq!(added, RUSH_HOUR_COUNT);
        assert_eq!(world.vehicle_count(), before + 8);
        assert_eq!(world.stats.total_spawned, 8);

        // Staggered behind the entry point, one per slot
        let mut xs: Vec<f32> = world.vehicles.iter().map(|v| v.position.x).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        xs.dedup();
        assert_eq!(xs.len(), 8);
        assert!(xs.iter().all(|&x| x < 0.0));
    }
}

#[test]
fn test_runs_stay_within_bounds() {
    let params = ParameterSet {
        max_vehicles: 60,
        spawn_rate: 0.1,
        ..ParameterSet::default()
    };

    for mode in MODES {
        let mut world = SimWorld::new_with_seed(mode, 42);
        world.set_params(&params);
        world.toggle_lane_closure(2).unwrap();
        world.trigger_rush_hour();

        for tick in 0..3000 {
            if tick == 500 {
                world.spawn_emergency_vehicle();
            }
            if tick % 120 == 0 {
                world.spawn_on_ramp_vehicle();
            }
            world.step(DT, &params);

            for v in &world.vehicles {
                assert!(v.speed >= 0.0 && v.speed <= v.max_speed, "{:?}", v);
                assert!((1.0..=10.0).contains(&v.mood_level), "{:?}", v);
                assert!((1.0..=10.0).contains(&v.mental_level), "{:?}", v);
                assert!((0.0..=1.0).contains(&v.braking_intensity), "{:?}", v);
                assert!(v.lane < 5);
                if let Some(signal) = v.intent_signal {
                    assert!(signal.strength > 0.0 && signal.strength <= 1.0);
                }
            }
            for (index, v) in world.vehicles.iter().enumerate() {
                if let Some(leader) = find_leader(&world.vehicles, index, params.lookahead_threshold)
                {
                    let leader = &world.vehicles[leader];
                    assert!(
                        v.speed <= leader.speed + NO_OVERTAKE_EPSILON + 1e-4,
                        "{:?} tick {}: {:?} at {:.2} behind {:?} at {:.2}",
                        mode,
                        tick,
                        v.id,
                        v.speed,
                        leader.id,
                        leader.speed
                    );
                }
            }
            assert!(world.stats.congestion_level >= 0.0 && world.stats.congestion_level <= 1.0);
        }

        assert!(world.stats.total_exited > 0, "{:?}: nobody got through", mode);
        assert_eq!(
            world.stats.total_spawned as usize,
            world.vehicle_count() + world.stats.total_exited as usize
        );
    }
}
