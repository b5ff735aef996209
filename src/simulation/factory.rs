//! Vehicle construction for the highway simulation
//!
//! Builds fully initialised vehicles from the spawn context: psychology is
//! drawn around the configured averages, the lane follows from type and
//! mood, and the top speed is fitted into that lane's speed band.

use rand::RngCore;

use super::params::ParameterSet;
use super::psychology::{clamp_level, MAX_LEVEL};
use super::random::{symmetric, unit};
use super::types::{
    on_ramp_y, MergeState, SpawnKind, VehicleId, VehicleType, LANE_MAX_SPEEDS, LANE_MIN_SPEEDS,
    OUTERMOST_LANE,
};
use super::vehicle::SimVehicle;

/// Half-width of the uniform spread around the mood and mental averages
pub const LEVEL_VARIATION: f32 = 2.0;

/// Top speed of every emergency vehicle
pub const EMERGENCY_MAX_SPEED: f32 = 10.0;

/// Starting x for mainline spawns
pub const MAINLINE_SPAWN_X: f32 = -50.0;
/// Starting x for on-ramp spawns
pub const ON_RAMP_SPAWN_X: f32 = -100.0;
/// Starting x for emergency spawns
pub const EMERGENCY_SPAWN_X: f32 = -200.0;
/// Speed at which on-ramp vehicles enter
pub const ON_RAMP_SPEED: f32 = 2.0;

/// Build a new vehicle for the given spawn context
pub fn build_vehicle(
    id: VehicleId,
    kind: SpawnKind,
    params: &ParameterSet,
    rng: &mut dyn RngCore,
) -> SimVehicle {
    let vehicle_type = match kind {
        SpawnKind::Emergency => VehicleType::Emergency,
        // One truck for every three cars
        _ if unit(rng) < 0.25 => VehicleType::Truck,
        _ => VehicleType::Car,
    };

    let (mood, mental) = if vehicle_type == VehicleType::Emergency {
        (MAX_LEVEL, MAX_LEVEL)
    } else {
        (
            clamp_level(params.average_relaxation_level + symmetric(rng, LEVEL_VARIATION)),
            clamp_level(params.mental_resilience_level + symmetric(rng, LEVEL_VARIATION)),
        )
    };

    let from_on_ramp = kind == SpawnKind::OnRamp;
    let lane = select_lane(vehicle_type, mood, from_on_ramp);
    let max_speed = pick_max_speed(vehicle_type, lane, params, rng);

    let (x, speed) = match kind {
        SpawnKind::Mainline => (MAINLINE_SPAWN_X, max_speed * 0.8),
        SpawnKind::OnRamp => (ON_RAMP_SPAWN_X, ON_RAMP_SPEED),
        SpawnKind::Emergency => (EMERGENCY_SPAWN_X, max_speed * 0.8),
    };

    let mut vehicle = SimVehicle::new(id, vehicle_type, lane, x, speed, max_speed);
    vehicle.acceleration_rate = match vehicle_type {
        VehicleType::Truck => params.truck_acceleration,
        _ => params.base_acceleration,
    };
    vehicle.mental_level = mental;
    vehicle.set_mood(mood, params.lane_change_aggression);
    vehicle.lookahead_distance = params.lookahead_threshold;

    if from_on_ramp {
        vehicle.position.y = on_ramp_y();
        vehicle.merge_state = MergeState::MergeRequested {
            target_lane: OUTERMOST_LANE,
        };
    }

    vehicle
}

/// Starting lane for a vehicle type and mood
///
/// On-ramp traffic always joins the outermost lane. Trucks keep to the slow
/// lanes and only move inward when agitated; cars drift from the outermost
/// lane at mood 1 to the innermost lane from mood 8.
pub fn select_lane(vehicle_type: VehicleType, mood_level: f32, from_on_ramp: bool) -> usize {
    if from_on_ramp {
        return OUTERMOST_LANE;
    }

    let mood = clamp_level(mood_level);
    match vehicle_type {
        VehicleType::Truck => match mood {
            m if m < 7.0 => 4,
            m if m < 9.0 => 3,
            _ => 2,
        },
        VehicleType::Car | VehicleType::Emergency => match mood {
            m if m < 2.0 => 4,
            m if m < 4.0 => 3,
            m if m < 6.0 => 2,
            m if m < 8.0 => 1,
            _ => 0,
        },
    }
}

/// Draw a top speed and fit it into the lane's speed band
///
/// Emergency vehicles skip the band entirely.
pub fn pick_max_speed(
    vehicle_type: VehicleType,
    lane: usize,
    params: &ParameterSet,
    rng: &mut dyn RngCore,
) -> f32 {
    let base = match vehicle_type {
        VehicleType::Emergency => return EMERGENCY_MAX_SPEED,
        VehicleType::Truck => 4.5,
        VehicleType::Car => 5.0 + unit(rng) * 2.0,
    };

    let lane = lane.min(OUTERMOST_LANE);
    let (min, max) = (LANE_MIN_SPEEDS[lane], LANE_MAX_SPEEDS[lane]);
    let fitted = base.clamp(min, max);
    let variation = symmetric(rng, params.speed_variation / 2.0);
    (fitted + variation).clamp(min, max)
}
