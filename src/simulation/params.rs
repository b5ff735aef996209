//! Tunable simulation parameters
//!
//! The host pushes a `ParameterSet` into the engine every tick; the engine
//! never mutates it. Presentation-only knobs are carried but not read.

use anyhow::{bail, Result};
use std::ops::RangeInclusive;

/// Configuration bundle consumed by every stage of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    /// Spawning stops once this many vehicles are on the highway
    pub max_vehicles: usize,
    /// Probability of a mainline spawn per tick
    pub spawn_rate: f32,
    /// Global multiplier applied to longitudinal motion
    pub simulation_speed: f32,

    /// Window in which a same-lane leader is noticed
    pub lookahead_threshold: f32,
    /// Base gap before problem-mode drivers start braking
    pub safe_following_distance: f32,
    /// Base gap before problem-mode drivers emergency brake
    pub critical_distance: f32,

    /// Centre of the initial mood distribution (1 relaxed .. 10 agitated)
    pub average_relaxation_level: f32,
    /// Centre of the initial mental-level distribution
    pub mental_resilience_level: f32,
    /// Scales how fast mood grows while stuck
    pub agitation_growth_rate: f32,
    /// Scales every lane-change probability
    pub lane_change_aggression: f32,

    pub base_acceleration: f32,
    pub truck_acceleration: f32,
    /// Width of the uniform max-speed jitter applied at spawn
    pub speed_variation: f32,

    /// Presentation only
    pub glow_intensity: f32,
    /// Presentation only
    pub braking_glow_multiplier: f32,

    /// Speed subtracted by problem-mode drivers in dense lanes
    pub cascading_braking_effect: f32,
    /// Radius in which drivers react to an emergency vehicle
    pub emergency_response_distance: f32,
    /// Lane density (vehicles in the lookahead window) that triggers cascading braking
    pub traffic_jam_threshold: usize,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            max_vehicles: 25,
            spawn_rate: 0.02,
            simulation_speed: 1.0,
            lookahead_threshold: 200.0,
            safe_following_distance: 35.0,
            critical_distance: 20.0,
            average_relaxation_level: 3.5,
            mental_resilience_level: 2.0,
            agitation_growth_rate: 0.5,
            lane_change_aggression: 1.0,
            base_acceleration: 0.15,
            truck_acceleration: 0.1,
            speed_variation: 0.5,
            glow_intensity: 1.0,
            braking_glow_multiplier: 15.0,
            cascading_braking_effect: 1.0,
            emergency_response_distance: 100.0,
            traffic_jam_threshold: 3,
        }
    }
}

const MAX_VEHICLES: RangeInclusive<usize> = 10..=150;
const SPAWN_RATE: RangeInclusive<f32> = 0.005..=0.1;
const SIMULATION_SPEED: RangeInclusive<f32> = 0.1..=3.0;
const LOOKAHEAD: RangeInclusive<f32> = 30.0..=200.0;
const SAFE_DISTANCE: RangeInclusive<f32> = 15.0..=80.0;
const CRITICAL_DISTANCE: RangeInclusive<f32> = 10.0..=50.0;
const RELAXATION: RangeInclusive<f32> = 1.0..=8.0;
const RESILIENCE: RangeInclusive<f32> = 1.0..=10.0;
const AGITATION: RangeInclusive<f32> = 0.1..=2.0;
const AGGRESSION: RangeInclusive<f32> = 0.2..=3.0;
const BASE_ACCELERATION: RangeInclusive<f32> = 0.05..=0.3;
const TRUCK_ACCELERATION: RangeInclusive<f32> = 0.03..=0.2;
const SPEED_VARIATION: RangeInclusive<f32> = 0.1..=1.5;
const GLOW: RangeInclusive<f32> = 0.2..=2.0;
const BRAKING_GLOW: RangeInclusive<f32> = 5.0..=25.0;
const CASCADING: RangeInclusive<f32> = 1.0..=4.0;
const EMERGENCY_DISTANCE: RangeInclusive<f32> = 50.0..=300.0;
const JAM_THRESHOLD: RangeInclusive<usize> = 2..=8;

impl ParameterSet {
    /// Check every field against the control panel's ranges
    ///
    /// Meant for user input at the edge of the program; the engine itself
    /// only ever calls [`ParameterSet::sanitized`].
    pub fn validate(&self) -> Result<()> {
        if !MAX_VEHICLES.contains(&self.max_vehicles) {
            bail!(
                "max_vehicles must be within {:?}, got {}",
                MAX_VEHICLES,
                self.max_vehicles
            );
        }
        if !JAM_THRESHOLD.contains(&self.traffic_jam_threshold) {
            bail!(
                "traffic_jam_threshold must be within {:?}, got {}",
                JAM_THRESHOLD,
                self.traffic_jam_threshold
            );
        }
        for (name, value, range) in self.float_fields() {
            if !value.is_finite() || !range.contains(&value) {
                bail!("{} must be within {:?}, got {}", name, range, value);
            }
        }
        Ok(())
    }

    /// Return a copy with every field clamped into its valid range
    ///
    /// Non-finite values fall back to the default for that field.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let fix = |value: f32, fallback: f32, range: RangeInclusive<f32>| {
            if value.is_finite() {
                value.clamp(*range.start(), *range.end())
            } else {
                fallback
            }
        };

        Self {
            max_vehicles: self
                .max_vehicles
                .clamp(*MAX_VEHICLES.start(), *MAX_VEHICLES.end()),
            spawn_rate: fix(self.spawn_rate, defaults.spawn_rate, SPAWN_RATE),
            simulation_speed: fix(
                self.simulation_speed,
                defaults.simulation_speed,
                SIMULATION_SPEED,
            ),
            lookahead_threshold: fix(
                self.lookahead_threshold,
                defaults.lookahead_threshold,
                LOOKAHEAD,
            ),
            safe_following_distance: fix(
                self.safe_following_distance,
                defaults.safe_following_distance,
                SAFE_DISTANCE,
            ),
            critical_distance: fix(
                self.critical_distance,
                defaults.critical_distance,
                CRITICAL_DISTANCE,
            ),
            average_relaxation_level: fix(
                self.average_relaxation_level,
                defaults.average_relaxation_level,
                RELAXATION,
            ),
            mental_resilience_level: fix(
                self.mental_resilience_level,
                defaults.mental_resilience_level,
                RESILIENCE,
            ),
            agitation_growth_rate: fix(
                self.agitation_growth_rate,
                defaults.agitation_growth_rate,
                AGITATION,
            ),
            lane_change_aggression: fix(
                self.lane_change_aggression,
                defaults.lane_change_aggression,
                AGGRESSION,
            ),
            base_acceleration: fix(
                self.base_acceleration,
                defaults.base_acceleration,
                BASE_ACCELERATION,
            ),
            truck_acceleration: fix(
                self.truck_acceleration,
                defaults.truck_acceleration,
                TRUCK_ACCELERATION,
            ),
            speed_variation: fix(
                self.speed_variation,
                defaults.speed_variation,
                SPEED_VARIATION,
            ),
            glow_intensity: fix(self.glow_intensity, defaults.glow_intensity, GLOW),
            braking_glow_multiplier: fix(
                self.braking_glow_multiplier,
                defaults.braking_glow_multiplier,
                BRAKING_GLOW,
            ),
            cascading_braking_effect: fix(
                self.cascading_braking_effect,
                defaults.cascading_braking_effect,
                CASCADING,
            ),
            emergency_response_distance: fix(
                self.emergency_response_distance,
                defaults.emergency_response_distance,
                EMERGENCY_DISTANCE,
            ),
            traffic_jam_threshold: self
                .traffic_jam_threshold
                .clamp(*JAM_THRESHOLD.start(), *JAM_THRESHOLD.end()),
        }
    }

    fn float_fields(&self) -> [(&'static str, f32, RangeInclusive<f32>); 16] {
        [
            ("spawn_rate", self.spawn_rate, SPAWN_RATE),
            ("simulation_speed", self.simulation_speed, SIMULATION_SPEED),
            ("lookahead_threshold", self.lookahead_threshold, LOOKAHEAD),
            (
                "safe_following_distance",
                self.safe_following_distance,
                SAFE_DISTANCE,
            ),
            ("critical_distance", self.critical_distance, CRITICAL_DISTANCE),
            (
                "average_relaxation_level",
                self.average_relaxation_level,
                RELAXATION,
            ),
            (
                "mental_resilience_level",
                self.mental_resilience_level,
                RESILIENCE,
            ),
            (
                "agitation_growth_rate",
                self.agitation_growth_rate,
                AGITATION,
            ),
            (
                "lane_change_aggression",
                self.lane_change_aggression,
                AGGRESSION,
            ),
            ("base_acceleration", self.base_acceleration, BASE_ACCELERATION),
            (
                "truck_acceleration",
                self.truck_acceleration,
                TRUCK_ACCELERATION,
            ),
            ("speed_variation", self.speed_variation, SPEED_VARIATION),
            ("glow_intensity", self.glow_intensity, GLOW),
            (
                "braking_glow_multiplier",
                self.braking_glow_multiplier,
                BRAKING_GLOW,
            ),
            (
                "cascading_braking_effect",
                self.cascading_braking_effect,
                CASCADING,
            ),
            (
                "emergency_response_distance",
                self.emergency_response_distance,
                EMERGENCY_DISTANCE,
            ),
        ]
    }
}
