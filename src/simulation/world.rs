//! Main simulation world that ties everything together
//!
//! `SimWorld` owns the highway state and advances it one tick per call to
//! [`SimWorld::step`]. The host owns the frame loop and pushes the current
//! parameters in with every step.

use std::cmp::Reverse;

use anyhow::{bail, Result};
use log::{debug, info, trace};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use super::decision::{self, find_leader};
use super::emergency::{self, EmergencyTimer};
use super::factory::{build_vehicle, MAINLINE_SPAWN_X};
use super::merge::{self, MergeOutcome, ABORT_BRAKE};
use super::params::ParameterSet;
use super::psychology;
use super::random::roll;
use super::snapshot::{VehicleView, WorldSnapshot};
use super::stats::WorldStats;
use super::types::{
    lane_center_y, DrivingMode, IntentKind, SimId, SpawnKind, VehicleId, VehicleType,
    CLOSURE_START_FRACTION, EXIT_MARGIN, HIGHWAY_WIDTH, LANE_COUNT, MAX_TICK_DELTA,
    NO_OVERTAKE_EPSILON, RUSH_HOUR_COUNT, RUSH_HOUR_SPACING,
};
use super::vehicle::SimVehicle;

/// Ticks shorter than this still report acceleration per 60 Hz frame
const MIN_ACCELERATION_DT: f32 = 0.016;

/// The highway simulation engine
pub struct SimWorld {
    /// Vehicles in spawn order
    pub vehicles: Vec<SimVehicle>,

    /// Per-lane closure flags
    pub lanes_closed: [bool; LANE_COUNT],

    /// Aggregate statistics, refreshed every tick
    pub stats: WorldStats,

    /// Simulated time in seconds
    pub time: f32,

    /// Number of ticks actually simulated
    pub ticks: u64,

    mode: DrivingMode,
    params: ParameterSet,
    running: bool,
    emergency: EmergencyTimer,

    /// Emergency vehicle being timed, with its dispatch time
    timed_emergency: Option<(VehicleId, f32)>,

    /// Next ID to assign
    next_id: usize,

    /// Replaceable source of randomness
    rng: Box<dyn RngCore>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new(DrivingMode::default())
    }
}

impl SimWorld {
    fn new_internal(mode: DrivingMode, rng: Box<dyn RngCore>) -> Self {
        Self {
            vehicles: Vec::new(),
            lanes_closed: [false; LANE_COUNT],
            stats: WorldStats::default(),
            time: 0.0,
            ticks: 0,
            mode,
            params: ParameterSet::default(),
            running: true,
            emergency: EmergencyTimer::default(),
            timed_emergency: None,
            next_id: 0,
            rng,
        }
    }

    /// Create a running world seeded from OS entropy
    pub fn new(mode: DrivingMode) -> Self {
        Self::new_internal(mode, Box::new(StdRng::from_os_rng()))
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(mode: DrivingMode, seed: u64) -> Self {
        Self::new_internal(mode, Box::new(StdRng::seed_from_u64(seed)))
    }

    /// Create a new SimWorld drawing from the given random source
    pub fn new_with_rng(mode: DrivingMode, rng: Box<dyn RngCore>) -> Self {
        Self::new_internal(mode, rng)
    }

    fn next_vehicle_id(&mut self) -> VehicleId {
        let id = VehicleId(SimId(self.next_id));
        self.next_id += 1;
        id
    }

    pub fn mode(&self) -> DrivingMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DrivingMode) {
        self.mode = mode;
    }

    /// Parameters used by the last step and by control actions
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn set_params(&mut self, params: &ParameterSet) {
        self.params = params.sanitized();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    pub fn emergency_active(&self) -> bool {
        self.emergency.is_active()
    }

    /// Seconds until the active emergency clears
    pub fn emergency_remaining(&self) -> Option<f32> {
        self.emergency.remaining()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn get_vehicle(&self, id: VehicleId) -> Option<&SimVehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn get_vehicle_mut(&mut self, id: VehicleId) -> Option<&mut SimVehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    /// Clear all vehicles, statistics, closures and the emergency, and pause
    pub fn reset(&mut self) {
        self.vehicles.clear();
        self.lanes_closed = [false; LANE_COUNT];
        self.stats = WorldStats::default();
        self.time = 0.0;
        self.ticks = 0;
        self.running = false;
        self.emergency.clear();
        self.timed_emergency = None;
        info!("Simulation reset");
    }

    /// Open or close a lane; returns the new closed state
    pub fn toggle_lane_closure(&mut self, lane: usize) -> Result<bool> {
        if lane >= LANE_COUNT {
            bail!("Lane {} does not exist (highway has {} lanes)", lane, LANE_COUNT);
        }
        self.lanes_closed[lane] = !self.lanes_closed[lane];
        info!(
            "Lane {} {}",
            lane,
            if self.lanes_closed[lane] { "closed" } else { "reopened" }
        );
        Ok(self.lanes_closed[lane])
    }

    /// Place a cruising vehicle at `x` in `lane`
    ///
    /// Psychology starts relaxed; adjust through [`SimWorld::get_vehicle_mut`].
    pub fn add_vehicle(
        &mut self,
        vehicle_type: VehicleType,
        lane: usize,
        x: f32,
        speed: f32,
        max_speed: f32,
    ) -> VehicleId {
        let id = self.next_vehicle_id();
        let mut vehicle = SimVehicle::new(id, vehicle_type, lane, x, speed, max_speed);
        vehicle.acceleration_rate = match vehicle_type {
            VehicleType::Truck => self.params.truck_acceleration,
            _ => self.params.base_acceleration,
        };
        vehicle.set_mood(vehicle.mood_level, self.params.lane_change_aggression);
        vehicle.lookahead_distance = self.params.lookahead_threshold;
        self.insert(vehicle)
    }

    fn insert(&mut self, vehicle: SimVehicle) -> VehicleId {
        let id = vehicle.id;
        debug!(
            "Spawned {:?} {:?} in lane {} at x={:.0} (mood {:.1})",
            vehicle.vehicle_type, id, vehicle.lane, vehicle.position.x, vehicle.mood_level
        );
        self.vehicles.push(vehicle);
        self.stats.total_spawned += 1;
        id
    }

    /// Spawn a vehicle from the given entry point, ignoring the population cap
    pub fn spawn_vehicle(&mut self, kind: SpawnKind) -> VehicleId {
        let id = self.next_vehicle_id();
        let vehicle = build_vehicle(id, kind, &self.params, self.rng.as_mut());
        self.insert(vehicle)
    }

    /// Add one vehicle on the on-ramp, merging into the outermost lane
    pub fn spawn_on_ramp_vehicle(&mut self) -> VehicleId {
        self.spawn_vehicle(SpawnKind::OnRamp)
    }

    /// Dispatch an emergency vehicle in a random lane and raise the emergency
    pub fn spawn_emergency_vehicle(&mut self) -> VehicleId {
        let id = self.next_vehicle_id();
        let mut vehicle = build_vehicle(id, SpawnKind::Emergency, &self.params, self.rng.as_mut());
        let lane = self.rng.random_range(0..LANE_COUNT);
        vehicle.lane = lane;
        vehicle.position.y = lane_center_y(lane);
        self.insert(vehicle);

        self.emergency.activate();
        self.timed_emergency = Some((id, self.time));
        info!("Emergency vehicle {:?} dispatched in lane {}", id, lane);
        id
    }

    /// Add a burst of staggered mainline vehicles, up to the population cap
    ///
    /// Returns the number of vehicles added.
    pub fn trigger_rush_hour(&mut self) -> usize {
        let room = self.params.max_vehicles.saturating_sub(self.vehicles.len());
        let count = RUSH_HOUR_COUNT.min(room);
        for i in 0..count {
            let id = self.next_vehicle_id();
            let mut vehicle = build_vehicle(id, SpawnKind::Mainline, &self.params, self.rng.as_mut());
            vehicle.position.x = MAINLINE_SPAWN_X - i as f32 * RUSH_HOUR_SPACING;
            self.insert(vehicle);
        }
        info!("Rush hour: {} vehicles added", count);
        count
    }

    /// Advance the simulation by `dt` seconds using `params`
    ///
    /// The emergency countdown runs on every positive `dt`, even while
    /// paused. The simulation itself only ticks while running and when `dt`
    /// lies in (0, 0.1); other deltas are dropped. Returns true if a tick ran.
    pub fn step(&mut self, dt: f32, params: &ParameterSet) -> bool {
        self.params = params.sanitized();

        if dt.is_finite() && dt > 0.0 && self.emergency.advance(dt) {
            info!("Emergency cleared");
        }

        if !self.running {
            return false;
        }
        if !(dt > 0.0 && dt < MAX_TICK_DELTA) {
            trace!("Discarded tick with dt={}", dt);
            return false;
        }

        self.tick(dt);
        true
    }

    /// Main simulation tick
    fn tick(&mut self, dt: f32) {
        self.time += dt;
        self.ticks += 1;

        for index in 0..self.vehicles.len() {
            self.update_vehicle(index, dt);
        }

        self.cull_exited();

        if self.vehicles.len() < self.params.max_vehicles
            && roll(self.rng.as_mut(), self.params.spawn_rate)
        {
            self.spawn_vehicle(SpawnKind::Mainline);
        }

        self.enforce_no_overtake();
        self.stats.update(&self.vehicles);
    }

    /// Cap every vehicle at the speed of the vehicle ahead in its lane
    ///
    /// A leader can still lose speed after its follower was updated, for
    /// example when it yields to a merger. Each lane is walked front to back
    /// once the whole tick has run.
    fn enforce_no_overtake(&mut self) {
        let window = self.params.lookahead_threshold;
        for lane in 0..LANE_COUNT {
            let mut order: Vec<usize> = (0..self.vehicles.len())
                .filter(|&i| self.vehicles[i].lane == lane)
                .collect();
            order.sort_by_key(|&i| Reverse(OrderedFloat(self.vehicles[i].position.x)));

            // (x, slowest speed) of the nearest group strictly ahead, and of
            // the group at the current x
            let mut ahead: Option<(f32, f32)> = None;
            let mut group: Option<(f32, f32)> = None;
            for i in order {
                let x = self.vehicles[i].position.x;
                if let Some((group_x, _)) = group {
                    if group_x > x {
                        ahead = group.take();
                    }
                }
                if let Some((ahead_x, ahead_speed)) = ahead {
                    if ahead_x - x < window {
                        let vehicle = &mut self.vehicles[i];
                        vehicle.speed = vehicle.speed.min(ahead_speed + NO_OVERTAKE_EPSILON);
                    }
                }
                let speed = self.vehicles[i].speed;
                group = Some(match group {
                    Some((group_x, slowest)) => (group_x, slowest.min(speed)),
                    None => (x, speed),
                });
            }
        }
    }

    /// Run the full per-vehicle pipeline for `vehicles[index]`
    fn update_vehicle(&mut self, index: usize, dt: f32) {
        let params = self.params;
        let previous_speed = self.vehicles[index].speed;

        // Leader and lookahead
        let leader = find_leader(&self.vehicles, index, params.lookahead_threshold);
        let gap = leader
            .map(|j| self.vehicles[j].position.x - self.vehicles[index].position.x)
            .unwrap_or(params.lookahead_threshold);

        // Braking intensity and psychology
        {
            let vehicle = &mut self.vehicles[index];
            vehicle.lookahead_distance = gap;
            vehicle.braking_intensity =
                psychology::braking_intensity(gap, params.lookahead_threshold);
            psychology::update(vehicle, dt, &params);
        }

        // Target speed and discretionary lane changes
        let decision = decision::decide(
            &self.vehicles,
            index,
            leader,
            self.mode,
            &params,
            &self.lanes_closed,
            self.rng.as_mut(),
        );
        let mut target_speed = decision.target_speed;
        {
            let vehicle = &mut self.vehicles[index];
            if let Some(lane) = decision.lane_change {
                vehicle.request_lane_change(lane);
            }
            if let Some((kind, strength)) = decision.signal {
                vehicle.signal(kind, strength);
            }
        }

        // Mandatory merge out of a closed lane
        merge::apply_closure_trigger(&mut self.vehicles[index], self.mode, &self.lanes_closed);

        // Emergency corridor
        if self.emergency.is_active() {
            let reaction = emergency::react(
                &self.vehicles,
                index,
                self.mode,
                &params,
                &self.lanes_closed,
                self.rng.as_mut(),
            );
            target_speed = (target_speed - reaction.speed_penalty).max(0.0);
            let vehicle = &mut self.vehicles[index];
            if let Some(lane) = reaction.lane_change {
                vehicle.request_lane_change(lane);
            }
            if reaction.signal {
                vehicle.signal(IntentKind::Emergency, 1.0);
            }
        }

        // Lateral motion
        let outcome = merge::advance(
            &mut self.vehicles,
            index,
            self.mode,
            &params,
            &self.lanes_closed,
            dt,
        );
        if outcome == MergeOutcome::Aborted {
            target_speed = (target_speed - ABORT_BRAKE).max(0.0);
        }

        // Speed, with the leader re-read in case the lane just changed
        let leader_speed = find_leader(&self.vehicles, index, params.lookahead_threshold)
            .map(|j| self.vehicles[j].speed);
        let vehicle = &mut self.vehicles[index];
        vehicle.speed += (target_speed - vehicle.speed) * vehicle.acceleration_rate * dt;
        vehicle.speed = vehicle.speed.clamp(0.0, vehicle.max_speed);
        if let Some(leader_speed) = leader_speed {
            vehicle.speed = vehicle.speed.min(leader_speed + NO_OVERTAKE_EPSILON);
        }
        vehicle.clamp_state();
        vehicle.current_acceleration =
            (vehicle.speed - previous_speed) / dt.max(MIN_ACCELERATION_DT);

        // Position
        vehicle.position.x += vehicle.speed * dt * 60.0 * params.simulation_speed;

        // Intent signal decay
        if let Some(signal) = vehicle.intent_signal.as_mut() {
            signal.strength -= dt * 2.0;
        }
        if vehicle.intent_signal.is_some_and(|s| s.strength <= 0.0) {
            vehicle.intent_signal = None;
        }
    }

    /// Remove vehicles that have driven off the end of the highway
    fn cull_exited(&mut self) {
        let limit = HIGHWAY_WIDTH + EXIT_MARGIN;
        let before = self.vehicles.len();
        let mut exited = Vec::new();
        self.vehicles.retain(|v| {
            let keep = v.position.x <= limit;
            if !keep {
                exited.push(v.id);
            }
            keep
        });

        for id in exited {
            debug!("Vehicle {:?} left the highway", id);
            if let Some((emergency_id, dispatched_at)) = self.timed_emergency {
                if emergency_id == id {
                    self.stats.emergency_response_time = self.time - dispatched_at;
                    self.timed_emergency = None;
                    info!(
                        "Emergency vehicle cleared the highway in {:.2}s",
                        self.stats.emergency_response_time
                    );
                }
            }
        }
        self.stats.total_exited += (before - self.vehicles.len()) as u32;
    }

    /// Read-only view for the presentation layer
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            vehicles: self.vehicles.iter().map(VehicleView::from).collect(),
            stats: self.stats,
            lanes_closed: self.lanes_closed,
            emergency_active: self.emergency.is_active(),
            running: self.running,
        }
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Highway Simulation Summary ===");
        println!(
            "Mode: {:?}, Time: {:.2}s, Ticks: {}",
            self.mode, self.time, self.ticks
        );
        println!(
            "Vehicles: {} (spawned {}, exited {})",
            self.vehicles.len(),
            self.stats.total_spawned,
            self.stats.total_exited
        );
        println!(
            "Average speed: {:.2}, Congestion: {:.0}%",
            self.stats.average_speed,
            self.stats.congestion_level * 100.0
        );
        if let Some(remaining) = self.emergency.remaining() {
            println!("Emergency active ({:.1}s remaining)", remaining);
        }
        if self.stats.emergency_response_time > 0.0 {
            println!(
                "Emergency response time: {:.2}s",
                self.stats.emergency_response_time
            );
        }

        let closed: Vec<usize> = (0..LANE_COUNT).filter(|&l| self.lanes_closed[l]).collect();
        if !closed.is_empty() {
            println!("Closed lanes: {:?}", closed);
        }

        if !self.vehicles.is_empty() {
            println!("--- Vehicles ---");
            for v in &self.vehicles {
                println!(
                    "  {:?} {:?}: lane={}, x={:.0}, speed={:.2}/{:.2}, mood={:.1}, state={:?}",
                    v.id.0 .0,
                    v.vehicle_type,
                    v.lane,
                    v.position.x,
                    v.speed,
                    v.max_speed,
                    v.mood_level,
                    v.merge_state
                );
            }
        }
    }

    /// Draw the lanes in the terminal, one row per lane
    pub fn draw_map(&self) {
        const COLUMNS: usize = 80;
        let scale = COLUMNS as f32 / HIGHWAY_WIDTH;
        let closure_col = (HIGHWAY_WIDTH * CLOSURE_START_FRACTION * scale) as usize;

        let mut grid = vec![vec!['-'; COLUMNS]; LANE_COUNT];
        for (lane, row) in grid.iter_mut().enumerate() {
            if self.lanes_closed[lane] {
                for cell in row.iter_mut().skip(closure_col) {
                    *cell = 'X';
                }
            }
        }

        for v in &self.vehicles {
            if v.position.x < 0.0 {
                continue;
            }
            let col = ((v.position.x * scale) as usize).min(COLUMNS - 1);
            grid[v.lane][col] = match v.vehicle_type {
                VehicleType::Emergency => 'E',
                VehicleType::Truck => 'T',
                VehicleType::Car if v.is_merging() => 'm',
                VehicleType::Car => 'C',
            };
        }

        println!("\n=== Highway Map ===");
        println!("Legend: C=Car, T=Truck, E=Emergency, m=Merging car, X=Closed");
        for (lane, row) in grid.iter().enumerate() {
            let line: String = row.iter().collect();
            println!("{} |{}|", lane, line);
        }
        println!();
    }
}
