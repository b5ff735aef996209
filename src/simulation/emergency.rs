//! Emergency corridor protocol
//!
//! While an emergency is active, drivers near the emergency vehicle react.
//! Uncoordinated drivers each roll the dice on braking and swerving, which
//! can leave the corridor half open. Coordinated drivers in the emergency
//! lane and its neighbours all slow down and move away from that lane.

use ordered_float::OrderedFloat;
use rand::RngCore;

use super::decision::occupant_near;
use super::params::ParameterSet;
use super::random::{pick, roll};
use super::types::{left_of, right_of, DrivingMode, EMERGENCY_DURATION, LANE_COUNT};
use super::vehicle::SimVehicle;

/// Probability that an uncoordinated driver brakes for a nearby siren
pub const PANIC_BRAKE_CHANCE: f32 = 0.5;
/// Speed dropped by an uncoordinated driver who brakes
pub const PANIC_BRAKE: f32 = 3.0;
/// Speed dropped by a coordinated driver forming the corridor
pub const CORRIDOR_BRAKE: f32 = 4.0;
/// Coordinated drivers react this many times further out
pub const CORRIDOR_RADIUS_FACTOR: f32 = 3.0;
/// Clearance preferred when moving out of the emergency lane
pub const CORRIDOR_GAP: f32 = 60.0;

/// Countdown that clears the emergency flag after a fixed duration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmergencyTimer {
    remaining: Option<f32>,
}

impl EmergencyTimer {
    /// Start (or restart) the countdown
    pub fn activate(&mut self) {
        self.remaining = Some(EMERGENCY_DURATION);
    }

    pub fn clear(&mut self) {
        self.remaining = None;
    }

    pub fn is_active(&self) -> bool {
        self.remaining.is_some()
    }

    /// Seconds left before the emergency clears
    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Count down by `dt`; returns true on the call that expires the timer
    pub fn advance(&mut self, dt: f32) -> bool {
        match self.remaining {
            Some(left) if left - dt <= 0.0 => {
                self.remaining = None;
                true
            }
            Some(left) => {
                self.remaining = Some(left - dt);
                false
            }
            None => false,
        }
    }
}

/// How a driver responds to an emergency vehicle this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CorridorReaction {
    pub speed_penalty: f32,
    pub lane_change: Option<usize>,
    /// Whether to raise an emergency intent signal
    pub signal: bool,
}

/// Index of the emergency vehicle longitudinally closest to `vehicles[index]`
pub fn nearest_emergency(vehicles: &[SimVehicle], index: usize) -> Option<usize> {
    let x = vehicles[index].position.x;
    vehicles
        .iter()
        .enumerate()
        .filter(|(j, other)| *j != index && other.is_emergency())
        .min_by_key(|(_, other)| OrderedFloat((other.position.x - x).abs()))
        .map(|(j, _)| j)
}

/// Decide how `vehicles[index]` reacts to the active emergency
pub fn react(
    vehicles: &[SimVehicle],
    index: usize,
    mode: DrivingMode,
    params: &ParameterSet,
    lanes_closed: &[bool; LANE_COUNT],
    rng: &mut dyn RngCore,
) -> CorridorReaction {
    let me = &vehicles[index];
    let mut reaction = CorridorReaction::default();
    if me.is_emergency() {
        return reaction;
    }
    let Some(emergency) = nearest_emergency(vehicles, index).map(|j| &vehicles[j]) else {
        return reaction;
    };
    let distance = (emergency.position.x - me.position.x).abs();
    let open = |lane: &usize| !lanes_closed[*lane];

    match mode {
        DrivingMode::Problem => {
            if distance >= params.emergency_response_distance || !roll(rng, PANIC_BRAKE_CHANCE) {
                return reaction;
            }
            reaction.speed_penalty = PANIC_BRAKE;
            if !me.is_merging() && roll(rng, me.lane_change_chance) {
                let lanes: Vec<usize> = [left_of(me.lane), right_of(me.lane)]
                    .into_iter()
                    .flatten()
                    .filter(open)
                    .collect();
                reaction.lane_change = pick(rng, &lanes);
            }
        }
        DrivingMode::Solution => {
            let radius = params.emergency_response_distance * CORRIDOR_RADIUS_FACTOR;
            if distance >= radius || me.lane.abs_diff(emergency.lane) > 1 {
                return reaction;
            }
            reaction.speed_penalty = CORRIDOR_BRAKE;
            reaction.signal = true;
            if !me.is_merging() {
                reaction.lane_change = corridor_lane(vehicles, index, emergency.lane, lanes_closed);
            }
        }
    }
    reaction
}

/// Lane a coordinated driver moves to so the emergency lane stays clear
fn corridor_lane(
    vehicles: &[SimVehicle],
    index: usize,
    emergency_lane: usize,
    lanes_closed: &[bool; LANE_COUNT],
) -> Option<usize> {
    let lane = vehicles[index].lane;
    let candidates = if lane == emergency_lane {
        // Prefer the slower side, then whichever neighbour has room
        vec![right_of(lane), left_of(lane)]
    } else if lane > emergency_lane {
        vec![right_of(lane)]
    } else {
        vec![left_of(lane)]
    };
    let open: Vec<usize> = candidates
        .into_iter()
        .flatten()
        .filter(|candidate| !lanes_closed[*candidate])
        .collect();
    open.iter()
        .copied()
        .find(|&candidate| occupant_near(vehicles, index, candidate, CORRIDOR_GAP).is_none())
        .or_else(|| open.first().copied())
}
