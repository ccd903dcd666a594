//! Simulation builder, fields and runner.
//!
//! A [`Field`] owns the particle buffers and knows how to advance them one
//! frame and how to react to input. [`SimContext`] bundles the active field
//! with the camera, clock and point style; the render driver owns exactly one
//! and passes it by `&mut` to the integrator and input handling each turn.

use std::path::PathBuf;

use crate::camera::Camera;
use crate::error::SimulationError;
use crate::input::{Attractor, InputEvent, PhraseMap};
use crate::integrator::{AttractRule, SpringRule};
use crate::shape::{GlyphRasterizer, Rasterizer, ShapeGenerator};
use crate::spawn::{self, DEFAULT_SPHERE_RADIUS, DEFAULT_VELOCITY_JITTER};
use crate::store::ParticleStore;
use crate::time::Clock;
use crate::visuals::{Palette, PointStyle, TOUCH_COLOR};

/// Default number of particles.
pub const DEFAULT_PARTICLE_COUNT: usize = 3000;
/// Clock step used by headless runs.
pub const HEADLESS_STEP: f32 = 1.0 / 60.0;

/// A particle cloud with its own update rule and input handling.
pub trait Field {
    /// Short name for logs and window titles.
    fn name(&self) -> &'static str;

    /// Advance every particle one frame at simulation time `t` (seconds).
    fn step(&mut self, t: f32);

    /// React to an input event. Returns `true` when the field changed.
    fn handle(&mut self, event: &InputEvent, camera: &Camera) -> bool;

    fn store(&self) -> &ParticleStore;

    fn store_mut(&mut self) -> &mut ParticleStore;

    /// Current display color as `0xRRGGBB`.
    fn color(&self) -> u32;

    /// Whether the update rule pulls particles toward their targets.
    fn uses_targets(&self) -> bool {
        false
    }
}

/// Spiral cloud that morphs into text when a mapped key is pressed.
pub struct MorphField {
    store: ParticleStore,
    rule: SpringRule,
    phrases: PhraseMap,
    shapes: ShapeGenerator,
    palette: Palette,
}

impl MorphField {
    /// Spawn `count` particles on the spiral.
    pub fn new(
        count: usize,
        phrases: PhraseMap,
        palette: Palette,
        shapes: ShapeGenerator,
    ) -> Result<Self, SimulationError> {
        let mut store = ParticleStore::new(count)?;
        spawn::spawn_spiral(&mut store);
        Ok(Self {
            store,
            rule: SpringRule::DEFAULT,
            phrases,
            shapes,
            palette,
        })
    }

    pub fn with_rule(mut self, rule: SpringRule) -> Self {
        self.rule = rule;
        self
    }

    /// Retarget every particle onto the shape of `text` and step the palette.
    ///
    /// Returns the number of sample points the text produced. When it is
    /// zero the particles are pulled to the origin instead.
    pub fn morph_to(&mut self, text: &str) -> usize {
        let samples = self.shapes.samples(text);
        let count = samples.len();
        if count == 0 {
            log::warn!("Phrase {text:?} rendered no lit pixels, collapsing to origin");
        }
        samples.assign_targets(&mut self.store);
        let color = self.palette.advance();
        log::info!(
            "Morphing {} particles onto {count} samples of {text:?} (color #{color:06x})",
            self.store.len()
        );
        count
    }

    /// Morph to the phrase mapped to `key`, if any.
    pub fn trigger(&mut self, key: char) -> Option<usize> {
        let Some(phrase) = self.phrases.lookup(key) else {
            log::debug!("Key {key:?} is not mapped to a phrase");
            return None;
        };
        let phrase = phrase.to_owned();
        Some(self.morph_to(&phrase))
    }

    pub fn phrases(&self) -> &PhraseMap {
        &self.phrases
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn shapes(&self) -> &ShapeGenerator {
        &self.shapes
    }
}

impl Field for MorphField {
    fn name(&self) -> &'static str {
        "morph"
    }

    fn step(&mut self, t: f32) {
        self.rule.apply(&mut self.store, t);
    }

    fn handle(&mut self, event: &InputEvent, _camera: &Camera) -> bool {
        match event {
            InputEvent::Key(key) => self.trigger(*key).is_some(),
            _ => false,
        }
    }

    fn store(&self) -> &ParticleStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut ParticleStore {
        &mut self.store
    }

    fn color(&self) -> u32 {
        self.palette.current()
    }

    fn uses_targets(&self) -> bool {
        true
    }
}

/// Drifting sphere of particles pulled toward the pointer while it is held.
pub struct TouchField {
    store: ParticleStore,
    rule: AttractRule,
    attractor: Attractor,
    /// World depth the pointer is projected onto.
    plane_z: f32,
    color: u32,
}

impl TouchField {
    /// Spawn `count` particles inside a sphere of `radius`, each with a
    /// random velocity of up to `jitter` per axis.
    pub fn new(count: usize, radius: f32, jitter: f32, seed: u64) -> Result<Self, SimulationError> {
        let mut store = ParticleStore::new(count)?;
        spawn::spawn_sphere(&mut store, radius, jitter, seed);
        Ok(Self {
            store,
            rule: AttractRule::DEFAULT,
            attractor: Attractor::default(),
            plane_z: 0.0,
            color: TOUCH_COLOR,
        })
    }

    pub fn with_rule(mut self, rule: AttractRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn attractor(&self) -> &Attractor {
        &self.attractor
    }
}

impl Field for TouchField {
    fn name(&self) -> &'static str {
        "touch"
    }

    fn step(&mut self, _t: f32) {
        self.rule.apply(&mut self.store, &self.attractor);
    }

    fn handle(&mut self, event: &InputEvent, camera: &Camera) -> bool {
        match event {
            InputEvent::PointerDown(ndc) | InputEvent::PointerMove(ndc) => {
                match camera.unproject(*ndc, self.plane_z) {
                    Some(point) => {
                        log::debug!("Attractor at {point:?}");
                        self.attractor.engage(point);
                        true
                    }
                    None => false,
                }
            }
            InputEvent::PointerUp => {
                self.attractor.release();
                true
            }
            _ => false,
        }
    }

    fn store(&self) -> &ParticleStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut ParticleStore {
        &mut self.store
    }

    fn color(&self) -> u32 {
        self.color
    }
}

/// Everything one running simulation owns.
pub struct SimContext {
    pub field: Box<dyn Field>,
    pub camera: Camera,
    pub clock: Clock,
    pub style: PointStyle,
    /// Stop after this many frames, if set.
    pub max_frames: Option<u64>,
}

impl SimContext {
    /// Tick the clock and advance the field one frame. Returns the
    /// simulation time used.
    pub fn advance(&mut self) -> f32 {
        let t = self.clock.tick();
        self.field.step(t);
        t
    }

    /// Apply an input event. Resizes go to the camera, everything else to
    /// the field.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Resized { width, height } => {
                self.camera.resize(*width, *height);
                true
            }
            InputEvent::Exit => false,
            other => self.field.handle(other, &self.camera),
        }
    }

    /// Mean distance between particles and their targets, for fields that
    /// have targets at all.
    pub fn mean_target_distance(&self) -> Option<f32> {
        self.field
            .uses_targets()
            .then(|| self.field.store().mean_target_distance())
    }

    /// Whether the frame limit has been reached.
    pub fn finished(&self) -> bool {
        self.max_frames.is_some_and(|max| self.clock.frame() >= max)
    }
}

/// Which field to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Spiral cloud morphing into text.
    #[default]
    Morph,
    /// Sphere attracted to the pointer.
    Touch,
}

/// A particle field simulation builder.
///
/// Use method chaining to configure, then call `.run()` to open a window or
/// `.run_headless(frames)` to step without one.
pub struct Simulation {
    mode: Mode,
    particle_count: usize,
    palette: Option<Palette>,
    phrases: PhraseMap,
    font: Option<PathBuf>,
    rasterizer: Option<Box<dyn Rasterizer>>,
    seed: u64,
    sphere_radius: f32,
    velocity_jitter: f32,
    style: PointStyle,
    max_frames: Option<u64>,
    initial_key: Option<char>,
    mask_export: Option<(char, PathBuf)>,
}

impl Simulation {
    /// Create a new simulation with default settings.
    pub fn new() -> Self {
        Self {
            mode: Mode::Morph,
            particle_count: DEFAULT_PARTICLE_COUNT,
            palette: None,
            phrases: PhraseMap::default(),
            font: None,
            rasterizer: None,
            seed: 0,
            sphere_radius: DEFAULT_SPHERE_RADIUS,
            velocity_jitter: DEFAULT_VELOCITY_JITTER,
            style: PointStyle::default(),
            max_frames: None,
            initial_key: None,
            mask_export: None,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Colors to cycle through. In touch mode only the first is used.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn with_phrases(mut self, phrases: PhraseMap) -> Self {
        self.phrases = phrases;
        self
    }

    /// Font file used to draw phrases. Ignored when a rasterizer is set.
    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font = Some(path.into());
        self
    }

    /// Replace the glyph renderer.
    pub fn with_rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.rasterizer = Some(Box::new(rasterizer));
        self
    }

    /// Seed for touch-mode spawning.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sphere_radius(mut self, radius: f32) -> Self {
        self.sphere_radius = radius;
        self
    }

    pub fn with_velocity_jitter(mut self, jitter: f32) -> Self {
        self.velocity_jitter = jitter;
        self
    }

    pub fn with_style(mut self, style: PointStyle) -> Self {
        self.style = style;
        self
    }

    /// Stop after `frames` frames.
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Key pressed once before the first frame (morph mode).
    pub fn with_initial_key(mut self, key: char) -> Self {
        self.initial_key = Some(key);
        self
    }

    /// Save the raster of the phrase mapped to `key` to `path` during build.
    pub fn with_mask_export(mut self, key: char, path: impl Into<PathBuf>) -> Self {
        self.mask_export = Some((key, path.into()));
        self
    }

    /// Construct the context with the given clock.
    pub fn build_with_clock(self, clock: Clock) -> Result<SimContext, SimulationError> {
        let field: Box<dyn Field> = match self.mode {
            Mode::Morph => {
                let rasterizer = match self.rasterizer {
                    Some(rasterizer) => rasterizer,
                    None => Box::new(GlyphRasterizer::discover(self.font.as_deref())?),
                };
                let shapes = ShapeGenerator::new(rasterizer);
                if let Some((key, path)) = &self.mask_export {
                    if let Some(phrase) = self.phrases.lookup(*key) {
                        shapes.export_mask(phrase, path)?;
                        log::info!("Wrote mask for {key:?} to {}", path.display());
                    } else {
                        log::warn!("Key {key:?} is not mapped, no mask written");
                    }
                }
                let palette = self.palette.unwrap_or_default();
                let mut field =
                    MorphField::new(self.particle_count, self.phrases, palette, shapes)?;
                if let Some(key) = self.initial_key {
                    field.trigger(key);
                }
                Box::new(field)
            }
            Mode::Touch => {
                let mut field = TouchField::new(
                    self.particle_count,
                    self.sphere_radius,
                    self.velocity_jitter,
                    self.seed,
                )?;
                if let Some(palette) = &self.palette {
                    field = field.with_color(palette.current());
                }
                Box::new(field)
            }
        };

        log::info!(
            "Built {} field with {} particles",
            field.name(),
            field.store().len()
        );

        Ok(SimContext {
            field,
            camera: Camera::default(),
            clock,
            style: self.style,
            max_frames: self.max_frames,
        })
    }

    /// Construct the context with a wall-clock timer.
    pub fn build(self) -> Result<SimContext, SimulationError> {
        self.build_with_clock(Clock::realtime())
    }

    /// Step `frames` frames with a fixed 1/60 s clock and no window.
    pub fn run_headless(self, frames: u64) -> Result<SimContext, SimulationError> {
        let mut ctx = self.build_with_clock(Clock::fixed(HEADLESS_STEP))?;
        for _ in 0..frames {
            ctx.advance();
        }
        let speed = ctx.field.store().mean_speed();
        match ctx.mean_target_distance() {
            Some(distance) => log::info!(
                "Ran {frames} headless frames: mean speed {speed:.4}, \
                 mean distance to target {distance:.3}"
            ),
            None => log::info!("Ran {frames} headless frames: mean speed {speed:.4}"),
        }
        Ok(ctx)
    }

    /// Open a window and run until it is closed or the frame limit is hit.
    pub fn run(self) -> Result<(), SimulationError> {
        let ctx = self.build()?;
        crate::window::run(ctx)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
