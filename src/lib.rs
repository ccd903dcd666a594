//! # particle-field
//!
//! Two small particle cloud demos on a shared CPU integrator and a wgpu
//! point-sprite renderer.
//!
//! - **Morph**: particles start on a vertical spiral. Pressing a mapped key
//!   draws a phrase off-screen, samples its lit pixels and springs every
//!   particle toward one of those points, with a little shimmer on top.
//! - **Touch**: particles drift inside a sphere. Holding the mouse button or
//!   a finger down pulls nearby particles toward the pointer.
//!
//! ## Quick Start
//!
//! ```ignore
//! use particle_field::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     Simulation::new()
//!         .with_mode(Mode::Touch)
//!         .with_particle_count(3000)
//!         .run()
//! }
//! ```
//!
//! ## Particle storage
//!
//! Particles are not structs. A [`ParticleStore`] keeps flat `f32` buffers
//! for positions, velocities and targets, three floats per particle, and the
//! position buffer is uploaded to the GPU as-is.
//!
//! ## Headless runs
//!
//! [`Simulation::run_headless`] steps a field with a fixed 1/60 s clock and
//! no window, which is what the tests and benchmarks use.

pub mod camera;
pub mod error;
mod gpu;
pub mod input;
pub mod integrator;
pub mod shape;
pub mod simulation;
pub mod spawn;
pub mod store;
pub mod time;
pub mod visuals;
mod window;

pub use camera::Camera;
pub use error::{ConfigError, FontError, GpuError, SimulationError};
pub use glam::{Vec2, Vec3};
pub use input::{Attractor, Input, InputEvent, PhraseMap};
pub use integrator::{AttractRule, SpringRule};
pub use shape::{GlyphRasterizer, Rasterizer, ShapeGenerator, ShapeSamples};
pub use simulation::{Field, Mode, MorphField, SimContext, Simulation, TouchField};
pub use spawn::SpawnContext;
pub use store::ParticleStore;
pub use time::Clock;
pub use visuals::{Palette, PointStyle};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use particle_field::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::SimulationError;
    pub use crate::input::{InputEvent, PhraseMap};
    pub use crate::simulation::{Field, Mode, SimContext, Simulation};
    pub use crate::store::ParticleStore;
    pub use crate::visuals::{Palette, PointStyle};
    pub use crate::{Vec2, Vec3};
}
