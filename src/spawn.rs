//! Initial particle placement.
//!
//! Morph fields start on a spiral with targets equal to positions and zero
//! velocity. Touch fields start uniformly inside a sphere with a small random
//! velocity per axis.

use crate::store::ParticleStore;
use crate::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Angular step between consecutive spiral particles, in radians.
pub const SPIRAL_ANGLE_STEP: f32 = 0.1;
/// Spiral radius in world units.
pub const SPIRAL_RADIUS: f32 = 100.0;
/// Total spiral height; particles span `-HEIGHT/2..HEIGHT/2`.
pub const SPIRAL_HEIGHT: f32 = 600.0;

/// Default radius of the touch-mode seeding sphere.
pub const DEFAULT_SPHERE_RADIUS: f32 = 100.0;
/// Default per-axis velocity jitter for touch-mode particles.
pub const DEFAULT_VELOCITY_JITTER: f32 = 0.05;

/// Per-particle context handed to spawn helpers.
///
/// Each particle gets its own RNG derived from the run seed and its index, so
/// the same seed always reproduces the same cloud.
pub struct SpawnContext {
    /// Index of the particle being spawned (0 to count-1).
    pub index: usize,
    /// Total number of particles being spawned.
    pub count: usize,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a new spawn context for a particle.
    pub fn new(index: usize, count: usize, seed: u64) -> Self {
        let stream = (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self {
            index,
            count,
            rng: SmallRng::seed_from_u64(seed ^ stream),
        }
    }

    /// Normalized progress through the spawn (0.0 to 1.0).
    #[inline]
    pub fn progress(&self) -> f32 {
        self.index as f32 / self.count as f32
    }

    /// Random f32 in the given range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// Random point inside a sphere of given radius, centered at origin.
    ///
    /// Distribution is uniform throughout the volume.
    pub fn random_in_sphere(&mut self, radius: f32) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let cos_phi: f32 = self.rng.gen_range(-1.0..1.0);
        let sin_phi = (1.0 - cos_phi * cos_phi).sqrt();
        // Cube root for uniform volume distribution
        let r = radius * self.rng.gen::<f32>().cbrt();

        Vec3::new(
            r * sin_phi * theta.cos(),
            r * sin_phi * theta.sin(),
            r * cos_phi,
        )
    }

    /// Random vector with each component in `[-amount, amount)`.
    pub fn jitter(&mut self, amount: f32) -> Vec3 {
        if amount <= 0.0 {
            return Vec3::ZERO;
        }
        Vec3::new(
            self.rng.gen_range(-amount..amount),
            self.rng.gen_range(-amount..amount),
            self.rng.gen_range(-amount..amount),
        )
    }

    /// Position on the vertical spiral the morph field starts from.
    pub fn spiral_position(&self) -> Vec3 {
        let angle = self.index as f32 * SPIRAL_ANGLE_STEP;
        let height = self.progress() * SPIRAL_HEIGHT - SPIRAL_HEIGHT * 0.5;
        Vec3::new(
            angle.cos() * SPIRAL_RADIUS,
            height,
            angle.sin() * SPIRAL_RADIUS,
        )
    }
}

/// Place every particle on the spiral, with targets at the same spot and no
/// velocity.
pub fn spawn_spiral(store: &mut ParticleStore) {
    let count = store.len();
    for i in 0..count {
        let pos = SpawnContext::new(i, count, 0).spiral_position();
        store.set_position(i, pos);
        store.set_target(i, pos);
        store.set_velocity(i, Vec3::ZERO);
    }
}

/// Seed every particle uniformly inside a sphere with random velocity.
///
/// Targets are set to the spawn positions and are not used afterwards.
pub fn spawn_sphere(store: &mut ParticleStore, radius: f32, jitter: f32, seed: u64) {
    let count = store.len();
    for i in 0..count {
        let mut ctx = SpawnContext::new(i, count, seed);
        let pos = ctx.random_in_sphere(radius);
        store.set_position(i, pos);
        store.set_target(i, pos);
        store.set_velocity(i, ctx.jitter(jitter));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_context_progress() {
        let ctx = SpawnContext::new(50, 100, 0);
        assert!((ctx.progress() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_random_in_sphere_bounds() {
        let mut ctx = SpawnContext::new(0, 1, 7);
        for _ in 0..100 {
            let pos = ctx.random_in_sphere(0.5);
            assert!(pos.length() <= 0.5 + 0.001);
        }
    }

    #[test]
    fn test_spiral_layout() {
        let mut store = ParticleStore::new(3000).unwrap();
        spawn_spiral(&mut store);

        // First particle: angle 0, bottom of the spiral
        let p0 = store.position(0);
        assert!((p0 - Vec3::new(100.0, -300.0, 0.0)).length() < 1e-4);

        // Halfway up, angle 150 rad
        let p = store.position(1500);
        assert!((p.y - 0.0).abs() < 1e-3);
        assert!((p.x - 150.0f32.cos() * 100.0).abs() < 1e-3);

        for i in 0..store.len() {
            assert_eq!(store.position(i), store.target(i));
            assert_eq!(store.velocity(i), Vec3::ZERO);
            let radial = Vec3::new(store.position(i).x, 0.0, store.position(i).z);
            assert!((radial.length() - SPIRAL_RADIUS).abs() < 1e-3);
        }
    }

    #[test]
    fn test_sphere_spawn_is_reproducible() {
        let mut a = ParticleStore::new(500).unwrap();
        let mut b = ParticleStore::new(500).unwrap();
        spawn_sphere(&mut a, 100.0, 0.05, 42);
        spawn_sphere(&mut b, 100.0, 0.05, 42);
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.velocities(), b.velocities());

        for i in 0..a.len() {
            assert!(a.position(i).length() <= 100.0 + 1e-3);
            let v = a.velocity(i);
            assert!(v.abs().max_element() <= 0.05);
        }
    }

    #[test]
    fn test_zero_jitter_is_still() {
        let mut store = ParticleStore::new(10).unwrap();
        spawn_sphere(&mut store, 10.0, 0.0, 1);
        assert!(store.velocities().iter().all(|&v| v == 0.0));
    }
}
