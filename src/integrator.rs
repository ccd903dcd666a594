//! Per-frame particle update rules.
//!
//! Two rules exist, one per field:
//!
//! | Rule | Field | Effect |
//! |------|-------|--------|
//! | [`SpringRule`] | morph | pull toward a noisy target, damp, integrate |
//! | [`AttractRule`] | touch | impulse toward the attractor, integrate, no damping |
//!
//! Both mutate the [`ParticleStore`] in place and mark it dirty. Neither
//! allocates.

use glam::Vec3;

use crate::input::Attractor;
use crate::store::ParticleStore;

/// Spring toward a target that wobbles with per-particle noise.
///
/// Per particle, in this exact order:
///
/// ```text
/// velocity += ((target + noise) - position) * stiffness
/// velocity *= damping
/// position += velocity
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringRule {
    pub stiffness: f32,
    pub damping: f32,
}

impl SpringRule {
    pub const DEFAULT: Self = Self {
        stiffness: 0.005,
        damping: 0.9,
    };

    /// Update a single particle. `i3` is the particle's flat buffer index
    /// (`3 * i`), which seeds its noise phase.
    #[inline]
    pub fn step_particle(
        &self,
        i3: usize,
        t: f32,
        position: Vec3,
        velocity: Vec3,
        target: Vec3,
    ) -> (Vec3, Vec3) {
        let delta = target + noise(i3, t) - position;
        let velocity = (velocity + delta * self.stiffness) * self.damping;
        (position + velocity, velocity)
    }

    /// Run one pass over every particle at simulation time `t` (seconds).
    pub fn apply(&self, store: &mut ParticleStore, t: f32) {
        let (positions, velocities, targets) = store.buffers_mut();
        for (i, ((p, v), target)) in positions
            .chunks_exact_mut(3)
            .zip(velocities.chunks_exact_mut(3))
            .zip(targets.chunks_exact(3))
            .enumerate()
        {
            let (position, velocity) = self.step_particle(
                i * 3,
                t,
                Vec3::from_slice(p),
                Vec3::from_slice(v),
                Vec3::from_slice(target),
            );
            position.write_to_slice(p);
            velocity.write_to_slice(v);
        }
    }
}

impl Default for SpringRule {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Oscillating offset added to a particle's target.
///
/// Keeps the cloud shimmering even once every particle has reached its target.
#[inline]
pub fn noise(i3: usize, t: f32) -> Vec3 {
    let k = i3 as f32;
    Vec3::new(
        (t * 2.0 + k * 0.001).sin() * 3.0 + (k + t * 3.0).sin() * 1.2,
        (t * 1.5 + k * 0.002).sin() * 3.0 + (k + t * 2.0).cos() * 1.2,
        (t * 1.2 + k * 0.0015).cos() * 3.0 + (k + t * 2.5).sin() * 1.2,
    )
}

/// Impulse toward the attractor for particles within `radius` of it.
///
/// Velocities are never damped, so particles keep drifting after the pointer
/// is released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttractRule {
    pub radius: f32,
    pub strength: f32,
}

impl AttractRule {
    pub const DEFAULT: Self = Self {
        radius: 50.0,
        strength: 0.05,
    };

    /// Below this distance the direction to the attractor is undefined and
    /// no impulse is applied.
    pub const MIN_DISTANCE: f32 = 1e-6;

    /// Velocity change for a particle at `position`, or zero when the
    /// attractor is inactive, out of range, or coincident with the particle.
    #[inline]
    pub fn impulse(&self, attractor: &Attractor, position: Vec3) -> Vec3 {
        if !attractor.active {
            return Vec3::ZERO;
        }
        let dir = attractor.point - position;
        let dist = dir.length();
        if dist >= self.radius || dist < Self::MIN_DISTANCE {
            return Vec3::ZERO;
        }
        dir / dist * self.strength
    }

    /// Run one pass over every particle.
    pub fn apply(&self, store: &mut ParticleStore, attractor: &Attractor) {
        let (positions, velocities, _) = store.buffers_mut();
        for (p, v) in positions
            .chunks_exact_mut(3)
            .zip(velocities.chunks_exact_mut(3))
        {
            let position = Vec3::from_slice(p);
            let velocity = Vec3::from_slice(v) + self.impulse(attractor, position);
            velocity.write_to_slice(v);
            (position + velocity).write_to_slice(p);
        }
    }
}

impl Default for AttractRule {
    fn default() -> Self {
        Self::DEFAULT
    }
}
