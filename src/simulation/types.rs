//! Core types for the highway simulation
//!
//! Identifiers, enums and the fixed highway geometry shared by every
//! other part of the engine.

/// Sequential number handed out by the world, never reused within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub SimId);

/// Type of vehicle on the highway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleType {
    Car,
    Truck,
    /// Ignores lane speed bands and triggers the corridor protocol
    Emergency,
}

/// Driver-coordination regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrivingMode {
    /// Uncoordinated drivers reacting only past distance thresholds
    #[default]
    Problem,
    /// Coordinated drivers averaging speed with their cohort
    Solution,
}

/// Where a vehicle enters the highway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    Mainline,
    OnRamp,
    Emergency,
}

/// What an intent signal announces to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Merge,
    Brake,
    Emergency,
}

/// A transient, decaying presentation cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentSignal {
    pub kind: IntentKind,
    /// Decays towards zero every tick; the signal is dropped at zero
    pub strength: f32,
}

/// Lateral lane-change state of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MergeState {
    #[default]
    Cruising,
    MergeRequested {
        target_lane: usize,
    },
    Merging {
        target_lane: usize,
        /// Fraction of the lateral distance covered, in [0, 1]
        progress: f32,
    },
}

impl MergeState {
    /// The lane this vehicle is heading to, if it is changing lanes
    pub fn target_lane(&self) -> Option<usize> {
        match *self {
            MergeState::Cruising => None,
            MergeState::MergeRequested { target_lane }
            | MergeState::Merging { target_lane, .. } => Some(target_lane),
        }
    }

    pub fn is_cruising(&self) -> bool {
        matches!(self, MergeState::Cruising)
    }
}

/// A 2D position on the highway canvas
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Length of the highway in world units
pub const HIGHWAY_WIDTH: f32 = 800.0;

/// Height of the highway (all lanes) in world units
pub const HIGHWAY_HEIGHT: f32 = 400.0;

/// Number of lanes; lane 0 is the innermost (fastest) lane
pub const LANE_COUNT: usize = 5;

/// Height of a single lane
pub const LANE_WIDTH: f32 = HIGHWAY_HEIGHT / LANE_COUNT as f32;

/// Index of the outermost (slowest) lane, fed by the on-ramp
pub const OUTERMOST_LANE: usize = LANE_COUNT - 1;

/// Vehicles past `HIGHWAY_WIDTH + EXIT_MARGIN` are removed
pub const EXIT_MARGIN: f32 = 100.0;

/// Fraction of the highway length where a closed lane's barrier starts
pub const CLOSURE_START_FRACTION: f32 = 0.8;

/// Slack allowed over the leader's speed in the same lane
pub const NO_OVERTAKE_EPSILON: f32 = 0.1;

/// Vehicles slower than this count towards congestion
pub const SLOW_SPEED_CUTOFF: f32 = 2.0;

/// Simulated seconds an emergency stays active after dispatch
pub const EMERGENCY_DURATION: f32 = 10.0;

/// Number of vehicles added by a rush-hour burst
pub const RUSH_HOUR_COUNT: usize = 8;

/// Spacing between staggered rush-hour spawns
pub const RUSH_HOUR_SPACING: f32 = 80.0;

/// Ticks with a delta outside (0, MAX_TICK_DELTA) are discarded
pub const MAX_TICK_DELTA: f32 = 0.1;

/// Minimum lane speeds, lanes 0-4
pub const LANE_MIN_SPEEDS: [f32; LANE_COUNT] = [7.0, 6.0, 5.0, 4.0, 3.0];

/// Maximum lane speeds, lanes 0-4
pub const LANE_MAX_SPEEDS: [f32; LANE_COUNT] = [9.0, 7.5, 6.5, 5.5, 4.5];

/// Y coordinate of a lane's centre line
pub fn lane_center_y(lane: usize) -> f32 {
    clamp_lane(lane) as f32 * LANE_WIDTH + LANE_WIDTH / 2.0
}

/// Y coordinate of the on-ramp strip below the outermost lane
pub fn on_ramp_y() -> f32 {
    HIGHWAY_HEIGHT + LANE_WIDTH / 2.0
}

/// Clamp a lane index into the valid range
pub fn clamp_lane(lane: usize) -> usize {
    lane.min(LANE_COUNT - 1)
}

/// The lane immediately to the left (towards lane 0), if any
pub fn left_of(lane: usize) -> Option<usize> {
    lane.checked_sub(1)
}

/// The lane immediately to the right (towards the on-ramp), if any
pub fn right_of(lane: usize) -> Option<usize> {
    (lane + 1 < LANE_COUNT).then_some(lane + 1)
}
