//! Seeded randomness for particle construction.
//!
//! Every random decision made while building a field (pixel thinning,
//! accent split, scatter, burst directions, connector choice) goes through
//! one [`SpawnRng`], so a fixed seed reproduces the exact same field.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{seq::index, Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

/// RNG with helpers for the spawn patterns the field needs.
///
/// ```ignore
/// let mut rng = SpawnRng::from_seed(Some(7));
/// let scatter = rng.random_in_cube(400.0);
/// let burst = rng.random_in_shell(50.0, 250.0);
/// ```
pub struct SpawnRng {
    rng: SmallRng,
}

impl SpawnRng {
    /// Create an RNG from an optional seed.
    ///
    /// `None` seeds from the clock, so each run scatters differently.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0 (exclusive).
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in the given range. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// True with the given probability.
    #[inline]
    pub fn chance(&mut self, probability: f32) -> bool {
        self.random() < probability
    }

    /// Pick `amount` distinct indices from `0..len`, in random order.
    ///
    /// `amount` is clamped to `len`.
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }

    // ========== Position helpers ==========

    /// Random point inside a cube of given half-size, centered at origin.
    pub fn random_in_cube(&mut self, half_size: f32) -> Vec3 {
        Vec3::new(
            self.random_range(-half_size, half_size),
            self.random_range(-half_size, half_size),
            self.random_range(-half_size, half_size),
        )
    }

    /// Random unit vector from two independent spherical angles.
    pub fn random_direction(&mut self) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let phi = self.rng.gen_range(0.0..PI);
        Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
    }

    /// Random point in a spherical shell between `min_radius` and `max_radius`.
    pub fn random_in_shell(&mut self, min_radius: f32, max_radius: f32) -> Vec3 {
        let magnitude = self.random_range(min_radius, max_radius);
        self.random_direction() * magnitude
    }
}
