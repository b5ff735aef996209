//! Random draws used by the simulation
//!
//! All randomness goes through a boxed `RngCore` owned by the world, so a
//! host can swap in a seeded or scripted source.

use rand::{Rng, RngCore};

/// Returns true with probability `chance`
pub fn roll(rng: &mut dyn RngCore, chance: f32) -> bool {
    chance > 0.0 && rng.random::<f32>() < chance
}

/// Uniform value in [-half_width, half_width)
pub fn symmetric(rng: &mut dyn RngCore, half_width: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * 2.0 * half_width
}

/// Uniform value in [0, 1)
pub fn unit(rng: &mut dyn RngCore) -> f32 {
    rng.random::<f32>()
}

/// Choose a random element from a slice
pub fn pick<T: Copy>(rng: &mut dyn RngCore, items: &[T]) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let index = ((unit(rng) * items.len() as f32) as usize).min(items.len() - 1);
    Some(items[index])
}
