//! Per-tick driving decisions
//!
//! Turns a vehicle's surroundings into a target speed and, optionally, a
//! lane the driver wants to move into. Uncoordinated drivers react only
//! once a gap threshold is crossed; coordinated drivers continuously blend
//! towards the mean speed of their lane cohort.

use ordered_float::OrderedFloat;
use rand::RngCore;

use super::params::ParameterSet;
use super::random::roll;
use super::types::{left_of, right_of, DrivingMode, IntentKind, LANE_COUNT, NO_OVERTAKE_EPSILON};
use super::vehicle::SimVehicle;

/// Required clearance in a neighbour lane for a critical-distance swerve
pub const SWERVE_GAP: f32 = 60.0;
/// Required clearance in the left lane for a safe-distance lane change
pub const LANE_CHANGE_GAP: f32 = 80.0;
/// Required clearance in the left lane for an overtake
pub const OVERTAKE_GAP: f32 = 100.0;

/// Outcome of the decision stage for one vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub target_speed: f32,
    pub lane_change: Option<usize>,
    pub signal: Option<(IntentKind, f32)>,
}

/// Index of the nearest vehicle ahead in the same lane within `window`
pub fn find_leader(vehicles: &[SimVehicle], index: usize, window: f32) -> Option<usize> {
    let me = &vehicles[index];
    vehicles
        .iter()
        .enumerate()
        .filter(|(j, other)| {
            let dx = other.position.x - me.position.x;
            *j != index && other.lane == me.lane && dx > 0.0 && dx < window
        })
        .min_by_key(|(_, other)| OrderedFloat(other.position.x - me.position.x))
        .map(|(j, _)| j)
}

/// Index of the closest vehicle in `lane` within `gap` of this vehicle, front or back
pub fn occupant_near(vehicles: &[SimVehicle], index: usize, lane: usize, gap: f32) -> Option<usize> {
    let me = &vehicles[index];
    vehicles
        .iter()
        .enumerate()
        .filter(|(j, other)| {
            *j != index && other.lane == lane && (other.position.x - me.position.x).abs() < gap
        })
        .min_by_key(|(_, other)| OrderedFloat((other.position.x - me.position.x).abs()))
        .map(|(j, _)| j)
}

/// Vehicles in this vehicle's lane within `window` either side, itself included
pub fn lane_cohort<'a>(
    vehicles: &'a [SimVehicle],
    index: usize,
    window: f32,
) -> impl Iterator<Item = &'a SimVehicle> + 'a {
    let lane = vehicles[index].lane;
    let x = vehicles[index].position.x;
    vehicles
        .iter()
        .filter(move |other| other.lane == lane && (other.position.x - x).abs() < window)
}

/// Mean speed of the lane cohort
pub fn cohort_mean_speed(vehicles: &[SimVehicle], index: usize, window: f32) -> Option<f32> {
    let (count, total) = lane_cohort(vehicles, index, window)
        .fold((0usize, 0.0f32), |(count, total), v| (count + 1, total + v.speed));
    (count > 0).then(|| total / count as f32)
}

fn lane_open(lanes_closed: &[bool; LANE_COUNT], lane: usize) -> bool {
    lane < LANE_COUNT && !lanes_closed[lane]
}

/// First candidate lane that is open and clear within `gap`
fn first_clear_lane(
    vehicles: &[SimVehicle],
    index: usize,
    candidates: &[Option<usize>],
    gap: f32,
    lanes_closed: &[bool; LANE_COUNT],
) -> Option<usize> {
    candidates.iter().flatten().copied().find(|&lane| {
        lane_open(lanes_closed, lane) && occupant_near(vehicles, index, lane, gap).is_none()
    })
}

/// Compute the target speed and lane-change intent for `vehicles[index]`
pub fn decide(
    vehicles: &[SimVehicle],
    index: usize,
    leader: Option<usize>,
    mode: DrivingMode,
    params: &ParameterSet,
    lanes_closed: &[bool; LANE_COUNT],
    rng: &mut dyn RngCore,
) -> Decision {
    let me = &vehicles[index];
    let leader = leader.map(|j| &vehicles[j]);
    let mut decision = Decision {
        target_speed: me.max_speed,
        lane_change: None,
        signal: None,
    };

    match mode {
        DrivingMode::Problem => react_to_thresholds(
            vehicles,
            index,
            leader,
            params,
            lanes_closed,
            rng,
            &mut decision,
        ),
        DrivingMode::Solution => {
            match_cohort(vehicles, index, leader, params, &mut decision)
        }
    }

    // Nobody drives through the vehicle in front, whatever the mode
    if let Some(leader) = leader {
        decision.target_speed = decision
            .target_speed
            .min(leader.speed + NO_OVERTAKE_EPSILON);
    }
    decision.target_speed = decision.target_speed.clamp(0.0, me.max_speed);
    decision
}

fn react_to_thresholds(
    vehicles: &[SimVehicle],
    index: usize,
    leader: Option<&SimVehicle>,
    params: &ParameterSet,
    lanes_closed: &[bool; LANE_COUNT],
    rng: &mut dyn RngCore,
    decision: &mut Decision,
) {
    let me = &vehicles[index];
    // Drivers in a closed lane only leave it through the closure merge
    let may_change_lanes = !me.is_merging() && lane_open(lanes_closed, me.lane);
    let left = left_of(me.lane);
    let right = right_of(me.lane);

    if let Some(leader) = leader {
        let distance = leader.position.x - me.position.x;
        let critical = params.critical_distance + me.speed * 2.0;
        let safe = params.safe_following_distance + me.speed * 6.0;

        if distance < critical {
            if may_change_lanes && roll(rng, me.lane_change_chance) {
                decision.lane_change =
                    first_clear_lane(vehicles, index, &[left, right], SWERVE_GAP, lanes_closed);
            }
            let mut target = (leader.speed - 1.0).max(0.0);
            if me.speed > leader.speed {
                target = target.min(leader.speed - 0.5);
            }
            decision.target_speed = target;
        } else if distance < safe {
            if may_change_lanes && roll(rng, me.lane_change_chance * 0.5) {
                decision.lane_change =
                    first_clear_lane(vehicles, index, &[left], LANE_CHANGE_GAP, lanes_closed);
            }
            decision.target_speed = decision.target_speed.min(leader.speed * 0.95);
        }
    }

    // Phantom jams: late braking cascades through dense lanes
    let density = lane_cohort(vehicles, index, params.lookahead_threshold).count();
    if density > params.traffic_jam_threshold {
        decision.target_speed =
            (decision.target_speed - params.cascading_braking_effect).max(0.0);
    }

    if may_change_lanes
        && decision.lane_change.is_none()
        && roll(rng, me.lane_change_chance * 0.25)
    {
        decision.lane_change =
            first_clear_lane(vehicles, index, &[left], OVERTAKE_GAP, lanes_closed);
    }
}

fn match_cohort(
    vehicles: &[SimVehicle],
    index: usize,
    leader: Option<&SimVehicle>,
    params: &ParameterSet,
    decision: &mut Decision,
) {
    let me = &vehicles[index];

    if let Some(leader) = leader {
        let distance = leader.position.x - me.position.x;
        let safe = params.safe_following_distance + 5.0 + me.speed * 5.0;
        if distance < safe {
            decision.target_speed = leader.speed;
        }
    }

    if let Some(mean) = cohort_mean_speed(vehicles, index, params.lookahead_threshold) {
        if mean < decision.target_speed {
            decision.signal = Some((IntentKind::Brake, 0.5));
        }
        decision.target_speed = (decision.target_speed + mean) / 2.0;
    }
}
