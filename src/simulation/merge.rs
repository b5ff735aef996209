//! Lateral lane-change protocol
//!
//! A vehicle moves Cruising -> MergeRequested -> Merging -> Cruising. While
//! merging, a vehicle that crowds the target lane either makes the merger
//! give up (uncoordinated drivers) or backs off so the merge can finish
//! (coordinated drivers).

use log::{debug, trace};

use super::decision::occupant_near;
use super::params::ParameterSet;
use super::psychology;
use super::types::{
    lane_center_y, left_of, right_of, DrivingMode, IntentKind, MergeState, HIGHWAY_WIDTH,
    LANE_COUNT, LANE_WIDTH,
};
use super::vehicle::SimVehicle;

/// Lateral convergence per 60 Hz frame for uncoordinated drivers
pub const PROBLEM_MERGE_RATE: f32 = 0.08;
/// Lateral convergence per 60 Hz frame for coordinated drivers
pub const SOLUTION_MERGE_RATE: f32 = 0.1;
/// A merge commits once the vehicle is this close to the target centre line
pub const ARRIVAL_THRESHOLD: f32 = 4.0;
/// Target-lane gap that counts as a conflict during a merge
pub const CONFLICT_GAP: f32 = 80.0;
/// Conflict gap below which an uncoordinated merge is abandoned
pub const ABORT_GAP: f32 = 40.0;
/// Speed dropped by a driver who abandons a merge
pub const ABORT_BRAKE: f32 = 2.0;
/// Speed given up by a coordinated driver making room for a merger
pub const YIELD_SPEED: f32 = 0.5;

/// Fraction of the highway after which uncoordinated drivers leave a closed lane
pub const LATE_MERGE_FRACTION: f32 = 0.7;
/// Fraction of the highway after which coordinated drivers leave a closed lane
pub const EARLY_MERGE_FRACTION: f32 = 0.3;

/// What happened to a vehicle's merge this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Idle,
    Started,
    InProgress,
    /// The vehicle reached its target lane and is cruising again
    Committed,
    /// The target lane was taken; the caller should brake
    Aborted,
    /// The request pointed at a lane that can no longer be entered
    Cancelled,
}

pub fn merge_rate(mode: DrivingMode) -> f32 {
    match mode {
        DrivingMode::Problem => PROBLEM_MERGE_RATE,
        DrivingMode::Solution => SOLUTION_MERGE_RATE,
    }
}

/// Per-tick lateral fraction, scaled so 60 Hz ticks use the raw rate
fn step_fraction(mode: DrivingMode, dt: f32) -> f32 {
    1.0 - (1.0 - merge_rate(mode)).powf(dt * 60.0)
}

/// Lane to merge into when leaving a closed lane
///
/// Outer lanes move left and inner lanes move right, towards the middle of
/// the road; the other neighbour is used if the preferred one is closed.
pub fn closure_exit_lane(lane: usize, lanes_closed: &[bool; LANE_COUNT]) -> Option<usize> {
    let (preferred, fallback) = if lane > 2 {
        (left_of(lane), right_of(lane))
    } else {
        (right_of(lane), left_of(lane))
    };
    [preferred, fallback]
        .into_iter()
        .flatten()
        .find(|&candidate| !lanes_closed[candidate])
}

/// Distance along the highway at which a closed lane must be left
pub fn closure_trigger_x(mode: DrivingMode) -> f32 {
    match mode {
        DrivingMode::Problem => HIGHWAY_WIDTH * LATE_MERGE_FRACTION,
        DrivingMode::Solution => HIGHWAY_WIDTH * EARLY_MERGE_FRACTION,
    }
}

/// Request the mandatory merge out of a closed lane once past the trigger point
pub fn apply_closure_trigger(
    vehicle: &mut SimVehicle,
    mode: DrivingMode,
    lanes_closed: &[bool; LANE_COUNT],
) -> bool {
    if !lanes_closed[vehicle.lane]
        || vehicle.is_merging()
        || vehicle.position.x <= closure_trigger_x(mode)
    {
        return false;
    }
    match closure_exit_lane(vehicle.lane, lanes_closed) {
        Some(target_lane) => vehicle.request_lane_change(target_lane),
        None => false,
    }
}

/// Advance the merge state machine of `vehicles[index]` by one tick
pub fn advance(
    vehicles: &mut [SimVehicle],
    index: usize,
    mode: DrivingMode,
    params: &ParameterSet,
    lanes_closed: &[bool; LANE_COUNT],
    dt: f32,
) -> MergeOutcome {
    let fraction = step_fraction(mode, dt);

    let (target_lane, started) = match vehicles[index].merge_state {
        MergeState::Cruising => {
            settle(&mut vehicles[index], fraction);
            return MergeOutcome::Idle;
        }
        MergeState::MergeRequested { target_lane } => {
            let vehicle = &mut vehicles[index];
            if target_lane >= LANE_COUNT || lanes_closed[target_lane] {
                vehicle.merge_state = MergeState::Cruising;
                return MergeOutcome::Cancelled;
            }
            vehicle.merge_state = MergeState::Merging {
                target_lane,
                progress: 0.0,
            };
            if mode == DrivingMode::Solution {
                vehicle.signal(IntentKind::Merge, 0.5);
            }
            (target_lane, true)
        }
        MergeState::Merging { target_lane, .. } => (target_lane, false),
    };

    if let Some(occupant) = occupant_near(vehicles, index, target_lane, CONFLICT_GAP) {
        let gap = (vehicles[occupant].position.x - vehicles[index].position.x).abs();
        match mode {
            DrivingMode::Problem if gap < ABORT_GAP => {
                debug!(
                    "Vehicle {:?} aborted merge into lane {} ({:.1} from {:?})",
                    vehicles[index].id, target_lane, gap, vehicles[occupant].id
                );
                vehicles[index].merge_state = MergeState::Cruising;
                return MergeOutcome::Aborted;
            }
            DrivingMode::Problem => {}
            DrivingMode::Solution => {
                let other = &mut vehicles[occupant];
                other.speed = (other.speed - YIELD_SPEED).max(0.0);
                other.signal(IntentKind::Merge, 1.0);
            }
        }
    }

    let vehicle = &mut vehicles[index];
    let target_y = lane_center_y(target_lane);
    let dy = target_y - vehicle.position.y;
    if dy.abs() > ARRIVAL_THRESHOLD {
        vehicle.position.y += dy * fraction;
        let remaining = (target_y - vehicle.position.y).abs();
        vehicle.merge_state = MergeState::Merging {
            target_lane,
            progress: (1.0 - remaining / LANE_WIDTH).clamp(0.0, 1.0),
        };
        return if started {
            MergeOutcome::Started
        } else {
            MergeOutcome::InProgress
        };
    }

    vehicle.lane = target_lane;
    vehicle.position.y = target_y;
    vehicle.merge_state = MergeState::Cruising;
    psychology::on_lane_change_complete(vehicle, params);
    trace!("Vehicle {:?} merged into lane {}", vehicle.id, target_lane);
    MergeOutcome::Committed
}

/// Ease a cruising vehicle back onto its lane centre after an abort
fn settle(vehicle: &mut SimVehicle, fraction: f32) {
    let target_y = lane_center_y(vehicle.lane);
    let dy = target_y - vehicle.position.y;
    if dy.abs() > ARRIVAL_THRESHOLD {
        vehicle.position.y += dy * fraction;
    } else {
        vehicle.position.y = target_y;
    }
}
