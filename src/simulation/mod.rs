//! Standalone highway simulation module
//!
//! All of the engine logic lives here: vehicle agents, driver psychology,
//! lane-change and emergency protocols, and the world that steps them. It
//! has no rendering dependencies and can be driven from tests or the
//! headless runner.

mod decision;
mod emergency;
mod factory;
mod merge;
mod params;
mod psychology;
mod random;
mod snapshot;
mod stats;
mod types;
mod vehicle;
mod world;

// Re-export public types for external use
#[allow(unused_imports)]
pub use decision::{
    cohort_mean_speed, find_leader, lane_cohort, occupant_near, LANE_CHANGE_GAP, OVERTAKE_GAP,
    SWERVE_GAP,
};
#[allow(unused_imports)]
pub use emergency::{nearest_emergency, EmergencyTimer};
#[allow(unused_imports)]
pub use factory::{build_vehicle, pick_max_speed, select_lane};
#[allow(unused_imports)]
pub use merge::{closure_exit_lane, closure_trigger_x, merge_rate, ARRIVAL_THRESHOLD};
pub use params::ParameterSet;
#[allow(unused_imports)]
pub use psychology::{braking_intensity, lane_change_chance, MAX_LEVEL, MIN_LEVEL};
#[allow(unused_imports)]
pub use snapshot::{VehicleView, WorldSnapshot};
#[allow(unused_imports)]
pub use stats::{average_speed, congestion_level, WorldStats};
#[allow(unused_imports)]
pub use types::{
    lane_center_y, DrivingMode, IntentKind, IntentSignal, MergeState, Position, SimId, SpawnKind,
    VehicleId, VehicleType, EMERGENCY_DURATION, EXIT_MARGIN, HIGHWAY_HEIGHT, HIGHWAY_WIDTH,
    LANE_COUNT, LANE_MAX_SPEEDS, LANE_MIN_SPEEDS, LANE_WIDTH, NO_OVERTAKE_EPSILON, OUTERMOST_LANE,
    RUSH_HOUR_COUNT, SLOW_SPEED_CUTOFF,
};
pub use vehicle::SimVehicle;
pub use world::SimWorld;
