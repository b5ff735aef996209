//! Aggregate statistics for the highway

use super::types::SLOW_SPEED_CUTOFF;
use super::vehicle::SimVehicle;

/// Running totals and per-tick aggregates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldStats {
    /// Every vehicle ever added to the highway
    pub total_spawned: u32,
    /// Vehicles that drove off the end of the highway
    pub total_exited: u32,
    pub average_speed: f32,
    /// Fraction of vehicles slower than the slow-speed cutoff
    pub congestion_level: f32,
    /// Simulated seconds the last emergency vehicle needed to clear the highway
    pub emergency_response_time: f32,
}

impl WorldStats {
    /// Recompute the per-tick aggregates from the current vehicles
    pub fn update(&mut self, vehicles: &[SimVehicle]) {
        self.average_speed = average_speed(vehicles);
        self.congestion_level = congestion_level(vehicles);
    }
}

/// Mean speed over all vehicles; 0 for an empty highway
pub fn average_speed(vehicles: &[SimVehicle]) -> f32 {
    if vehicles.is_empty() {
        return 0.0;
    }
    vehicles.iter().map(|v| v.speed).sum::<f32>() / vehicles.len() as f32
}

/// Fraction of vehicles below the slow-speed cutoff
pub fn congestion_level(vehicles: &[SimVehicle]) -> f32 {
    let slow = vehicles
        .iter()
        .filter(|v| v.speed < SLOW_SPEED_CUTOFF)
        .count();
    slow as f32 / vehicles.len().max(1) as f32
}
