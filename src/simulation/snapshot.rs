//! Read-only view of the world handed to the presentation layer each frame

use super::stats::WorldStats;
use super::types::{IntentSignal, Position, VehicleId, VehicleType, LANE_COUNT};
use super::vehicle::SimVehicle;

/// What the renderer needs to draw one vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleView {
    pub id: VehicleId,
    pub position: Position,
    pub lane: usize,
    pub vehicle_type: VehicleType,
    pub is_emergency: bool,
    pub length: f32,
    pub width: f32,
    pub current_acceleration: f32,
    pub braking_intensity: f32,
    pub intent_signal: Option<IntentSignal>,
    pub mood_level: f32,
}

impl From<&SimVehicle> for VehicleView {
    fn from(vehicle: &SimVehicle) -> Self {
        Self {
            id: vehicle.id,
            position: vehicle.position,
            lane: vehicle.lane,
            vehicle_type: vehicle.vehicle_type,
            is_emergency: vehicle.is_emergency(),
            length: vehicle.length,
            width: vehicle.width,
            current_acceleration: vehicle.current_acceleration,
            braking_intensity: vehicle.braking_intensity,
            intent_signal: vehicle.intent_signal,
            mood_level: vehicle.mood_level,
        }
    }
}

/// Per-frame snapshot of the highway
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub vehicles: Vec<VehicleView>,
    pub stats: WorldStats,
    pub lanes_closed: [bool; LANE_COUNT],
    pub emergency_active: bool,
    pub running: bool,
}
