//! Vehicle agent state for the highway simulation

use super::psychology;
use super::types::{
    clamp_lane, lane_center_y, IntentKind, IntentSignal, MergeState, Position, VehicleId,
    VehicleType,
};

/// A car, truck or emergency vehicle on the highway
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: VehicleId,
    pub position: Position,
    /// Lane index, always within [0, LANE_COUNT)
    pub lane: usize,
    pub speed: f32,
    pub max_speed: f32,
    /// Fraction of the speed gap closed per second
    pub acceleration_rate: f32,
    /// Speed change per second over the last tick, for effects
    pub current_acceleration: f32,
    pub length: f32,
    pub width: f32,
    pub vehicle_type: VehicleType,
    pub merge_state: MergeState,
    pub intent_signal: Option<IntentSignal>,
    /// 1 (relaxed) to 10 (agitated)
    pub mood_level: f32,
    /// 1 (keeps cool) to 10 (loses cool quickly)
    pub mental_level: f32,
    /// Per-tick lane-change probability derived from `mood_level`
    pub lane_change_chance: f32,
    pub time_stuck_in_traffic: f32,
    /// Gap to the leader, or the lookahead threshold when the lane ahead is clear
    pub lookahead_distance: f32,
    /// 0 with a clear road ahead, 1 bumper to bumper
    pub braking_intensity: f32,
}

impl SimVehicle {
    /// Create a cruising vehicle at the centre of `lane`
    ///
    /// Psychology fields start relaxed; the factory overwrites them.
    pub fn new(
        id: VehicleId,
        vehicle_type: VehicleType,
        lane: usize,
        x: f32,
        speed: f32,
        max_speed: f32,
    ) -> Self {
        let lane = clamp_lane(lane);
        let max_speed = max_speed.max(0.0);
        let (length, width) = match vehicle_type {
            VehicleType::Car => (25.0, 12.0),
            VehicleType::Truck => (40.0, 16.0),
            VehicleType::Emergency => (30.0, 12.0),
        };
        let mut vehicle = Self {
            id,
            position: Position::new(x, lane_center_y(lane)),
            lane,
            speed: speed.clamp(0.0, max_speed),
            max_speed,
            acceleration_rate: 0.15,
            current_acceleration: 0.0,
            length,
            width,
            vehicle_type,
            merge_state: MergeState::Cruising,
            intent_signal: None,
            mood_level: 1.0,
            mental_level: 1.0,
            lane_change_chance: 0.0,
            time_stuck_in_traffic: 0.0,
            lookahead_distance: 0.0,
            braking_intensity: 0.0,
        };
        vehicle.set_mood(1.0, 1.0);
        vehicle
    }

    pub fn is_emergency(&self) -> bool {
        self.vehicle_type == VehicleType::Emergency
    }

    pub fn is_merging(&self) -> bool {
        !self.merge_state.is_cruising()
    }

    /// Set the mood level and recompute the lane-change chance
    pub fn set_mood(&mut self, mood_level: f32, aggression: f32) {
        self.mood_level = psychology::clamp_level(mood_level);
        self.lane_change_chance = psychology::lane_change_chance(self.mood_level, aggression);
    }

    /// Raise an intent signal unless a stronger one is already showing
    pub fn signal(&mut self, kind: IntentKind, strength: f32) {
        let strength = strength.clamp(0.0, 1.0);
        match self.intent_signal {
            Some(current) if current.strength > strength => {}
            _ => self.intent_signal = Some(IntentSignal { kind, strength }),
        }
    }

    /// Ask to move into `target_lane`; ignored while already changing lanes
    pub fn request_lane_change(&mut self, target_lane: usize) -> bool {
        if self.is_merging() || target_lane == self.lane {
            return false;
        }
        self.merge_state = MergeState::MergeRequested {
            target_lane: clamp_lane(target_lane),
        };
        true
    }

    /// Force speed, lane and levels back into their valid ranges
    pub fn clamp_state(&mut self) {
        if !self.max_speed.is_finite() || self.max_speed < 0.0 {
            self.max_speed = 0.0;
        }
        self.speed = if self.speed.is_finite() {
            self.speed.clamp(0.0, self.max_speed)
        } else {
            0.0
        };
        self.lane = clamp_lane(self.lane);
        self.mood_level = psychology::clamp_level(self.mood_level);
        self.mental_level = psychology::clamp_level(self.mental_level);
        self.time_stuck_in_traffic = self.time_stuck_in_traffic.max(0.0);
        self.braking_intensity = self.braking_intensity.clamp(0.0, 1.0);
    }
}
