//! Flat particle buffers.
//!
//! Particles are not stored as structs. Each attribute lives in its own
//! `Vec<f32>` of length `3 * count`, with particle `i` occupying slots
//! `3i, 3i + 1, 3i + 2`. The position buffer is handed to the GPU as-is.

use glam::Vec3;

use crate::error::ConfigError;

/// Position, velocity and target buffers for a fixed number of particles.
///
/// The particle count is fixed at construction; buffers never grow or shrink.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    count: usize,
    positions: Vec<f32>,
    velocities: Vec<f32>,
    targets: Vec<f32>,
    /// Set when positions changed since the renderer last uploaded them.
    dirty: bool,
}

impl ParticleStore {
    /// Allocate zeroed buffers for `count` particles.
    pub fn new(count: usize) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        let len = count
            .checked_mul(3)
            .filter(|&len| len <= isize::MAX as usize / std::mem::size_of::<f32>())
            .ok_or(ConfigError::TooManyParticles(count))?;
        Ok(Self {
            count,
            positions: vec![0.0; len],
            velocities: vec![0.0; len],
            targets: vec![0.0; len],
            dirty: true,
        })
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Always false; a store holds at least one particle.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        read(&self.positions, i)
    }

    #[inline]
    pub fn velocity(&self, i: usize) -> Vec3 {
        read(&self.velocities, i)
    }

    #[inline]
    pub fn target(&self, i: usize) -> Vec3 {
        read(&self.targets, i)
    }

    #[inline]
    pub fn set_position(&mut self, i: usize, v: Vec3) {
        write(&mut self.positions, i, v);
        self.dirty = true;
    }

    #[inline]
    pub fn set_velocity(&mut self, i: usize, v: Vec3) {
        write(&mut self.velocities, i, v);
    }

    #[inline]
    pub fn set_target(&mut self, i: usize, v: Vec3) {
        write(&mut self.targets, i, v);
    }

    /// Raw position buffer (`3 * len()` floats).
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Raw velocity buffer (`3 * len()` floats).
    pub fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    /// Raw target buffer (`3 * len()` floats).
    pub fn targets(&self) -> &[f32] {
        &self.targets
    }

    /// Mutable access to all three buffers at once, for integrator passes.
    ///
    /// Returns `(positions, velocities, targets)`. Marks positions dirty.
    pub fn buffers_mut(&mut self) -> (&mut [f32], &mut [f32], &[f32]) {
        self.dirty = true;
        (
            self.positions.as_mut_slice(),
            self.velocities.as_mut_slice(),
            self.targets.as_slice(),
        )
    }

    /// Average velocity magnitude over all particles.
    pub fn mean_speed(&self) -> f32 {
        let total: f32 = (0..self.count).map(|i| self.velocity(i).length()).sum();
        total / self.count as f32
    }

    /// Average distance between each particle and its target.
    pub fn mean_target_distance(&self) -> f32 {
        let total: f32 = (0..self.count)
            .map(|i| self.position(i).distance(self.target(i)))
            .sum();
        total / self.count as f32
    }

    /// Flag positions as needing a resync with the renderer.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether positions changed since the last [`take_dirty`](Self::take_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return the dirty flag and clear it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

#[inline]
fn read(buf: &[f32], i: usize) -> Vec3 {
    let i3 = i * 3;
    Vec3::new(buf[i3], buf[i3 + 1], buf[i3 + 2])
}

#[inline]
fn write(buf: &mut [f32], i: usize, v: Vec3) {
    let i3 = i * 3;
    buf[i3] = v.x;
    buf[i3 + 1] = v.y;
    buf[i3 + 2] = v.z;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_has_3n_buffers() {
        let store = ParticleStore::new(7).unwrap();
        assert_eq!(store.len(), 7);
        assert_eq!(store.positions().len(), 21);
        assert_eq!(store.velocities().len(), 21);
        assert_eq!(store.targets().len(), 21);
        assert!(store.positions().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zero_particles_rejected() {
        assert_eq!(ParticleStore::new(0).unwrap_err(), ConfigError::ZeroParticles);
    }

    #[test]
    fn test_oversized_count_rejected() {
        let count = usize::MAX / 2;
        assert_eq!(
            ParticleStore::new(count).unwrap_err(),
            ConfigError::TooManyParticles(count)
        );
        let count = isize::MAX as usize / 8;
        assert_eq!(
            ParticleStore::new(count).unwrap_err(),
            ConfigError::TooManyParticles(count)
        );
    }

    #[test]
    fn test_slots_are_interleaved() {
        let mut store = ParticleStore::new(3).unwrap();
        store.set_position(1, Vec3::new(1.0, 2.0, 3.0));
        store.set_target(2, Vec3::new(4.0, 5.0, 6.0));

        assert_eq!(&store.positions()[3..6], &[1.0, 2.0, 3.0]);
        assert_eq!(&store.targets()[6..9], &[4.0, 5.0, 6.0]);
        assert_eq!(store.position(1), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(store.position(0), Vec3::ZERO);
    }

    #[test]
    fn test_summary_stats() {
        let mut store = ParticleStore::new(2).unwrap();
        store.set_velocity(0, Vec3::new(3.0, 4.0, 0.0));
        store.set_target(1, Vec3::new(0.0, 0.0, 2.0));
        assert!((store.mean_speed() - 2.5).abs() < 1e-6);
        assert!((store.mean_target_distance() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dirty_flag() {
        let mut store = ParticleStore::new(1).unwrap();
        // Freshly allocated buffers still need an initial upload.
        assert!(store.take_dirty());
        assert!(!store.is_dirty());

        store.set_velocity(0, Vec3::X);
        assert!(!store.is_dirty());

        let _ = store.buffers_mut();
        assert!(store.take_dirty());
        assert!(!store.take_dirty());
    }
}
