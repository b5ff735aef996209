#![allow(dead_code)]

use highway_sim::simulation::{DrivingMode, ParameterSet, SimWorld};
use rand::RngCore;

/// Random source that returns the same bits forever
///
/// All-zero bits make every probability roll succeed; all-one bits make
/// every roll fail.
pub struct ConstRng(pub u64);

impl RngCore for ConstRng {
    fn next_u32(&mut self) -> u32 {
        self.0 as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(self.0 as u8);
    }
}

/// Every roll fails: no random spawns, no discretionary lane changes
pub fn never_world(mode: DrivingMode) -> SimWorld {
    SimWorld::new_with_rng(mode, Box::new(ConstRng(u64::MAX)))
}

/// Every roll succeeds
pub fn always_world(mode: DrivingMode) -> SimWorld {
    SimWorld::new_with_rng(mode, Box::new(ConstRng(0)))
}

pub const DT: f32 = 0.016;

pub fn run(world: &mut SimWorld, params: &ParameterSet, ticks: usize) {
    for _ in 0..ticks {
        world.step(DT, params);
    }
}
