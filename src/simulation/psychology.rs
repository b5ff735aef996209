//! Driver psychology: mood, patience and lane-change appetite
//!
//! Mood rises while a driver is stuck in slow traffic, at a pace set by
//! their mental level, and drops by one every time they complete a lane
//! change. The lane-change chance grows exponentially with mood.

use super::params::ParameterSet;
use super::vehicle::SimVehicle;

pub const MIN_LEVEL: f32 = 1.0;
pub const MAX_LEVEL: f32 = 10.0;

/// Lane-change chance at mood 1
pub const MIN_LANE_CHANGE_CHANCE: f32 = 0.001;
/// Lane-change chance at mood 10
pub const MAX_LANE_CHANGE_CHANCE: f32 = 0.08;

/// Seconds of slow driving before mood starts to rise
pub const STUCK_THRESHOLD_SECS: f32 = 2.0;

/// Braking intensity above which agitation grows faster
pub const BRAKING_AGITATION_THRESHOLD: f32 = 0.6;

/// Clamp a mood or mental level into [1, 10]; NaN becomes 1
pub fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        MIN_LEVEL
    } else {
        level.clamp(MIN_LEVEL, MAX_LEVEL)
    }
}

/// Per-tick lane-change probability for a mood level
///
/// Interpolates exponentially from 0.1% at mood 1 to 8% at mood 10, then
/// scales by the global aggression multiplier.
pub fn lane_change_chance(mood_level: f32, aggression: f32) -> f32 {
    let exponent = (clamp_level(mood_level) - MIN_LEVEL) / (MAX_LEVEL - MIN_LEVEL);
    let ratio = MAX_LANE_CHANGE_CHANCE / MIN_LANE_CHANGE_CHANCE;
    let base = MIN_LANE_CHANGE_CHANCE * ratio.powf(exponent);
    (base * aggression.max(0.0)).clamp(0.0, 1.0)
}

/// Braking intensity from the gap to the leader
pub fn braking_intensity(lookahead_distance: f32, lookahead_threshold: f32) -> f32 {
    if lookahead_threshold <= 0.0 {
        return 0.0;
    }
    (1.0 - lookahead_distance / lookahead_threshold).clamp(0.0, 1.0)
}

/// Update the stuck timer and mood for one tick
///
/// Returns true when the mood level changed.
pub fn update(vehicle: &mut SimVehicle, dt: f32, params: &ParameterSet) -> bool {
    if vehicle.is_emergency() {
        vehicle.time_stuck_in_traffic = 0.0;
        return false;
    }

    if vehicle.speed < vehicle.max_speed * 0.5 {
        vehicle.time_stuck_in_traffic += dt;
        if vehicle.time_stuck_in_traffic > STUCK_THRESHOLD_SECS {
            let mut growth = (vehicle.mental_level / MAX_LEVEL) * dt * params.agitation_growth_rate;
            if vehicle.braking_intensity > BRAKING_AGITATION_THRESHOLD {
                growth *= 1.0 + vehicle.braking_intensity;
            }
            let before = vehicle.mood_level;
            vehicle.set_mood(before + growth, params.lane_change_aggression);
            return vehicle.mood_level != before;
        }
    } else {
        vehicle.time_stuck_in_traffic = (vehicle.time_stuck_in_traffic - dt * 2.0).max(0.0);
    }
    false
}

/// A completed lane change relaxes the driver
pub fn on_lane_change_complete(vehicle: &mut SimVehicle, params: &ParameterSet) {
    if vehicle.is_emergency() {
        return;
    }
    vehicle.set_mood(vehicle.mood_level - 1.0, params.lane_change_aggression);
    vehicle.time_stuck_in_traffic = 0.0;
}
