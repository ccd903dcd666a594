//! Text to point cloud.
//!
//! A phrase is drawn into an off-screen 8-bit raster, the raster is scanned
//! on a coarse grid, and every lit pixel becomes a target point on the
//! `z = 0` plane. Particles are then bound to those points round-robin:
//! `target[i] = samples[i % samples.len()]`.
//!
//! Drawing is behind the [`Rasterizer`] trait. [`GlyphRasterizer`] renders
//! real glyphs with `rusttype`; anything else that can fill a [`GrayImage`]
//! works too.

use std::path::{Path, PathBuf};

use glam::Vec3;
use image::{GrayImage, Luma};
use rusttype::{point, Font, Scale};

use crate::error::FontError;
use crate::store::ParticleStore;

/// Off-screen raster width in pixels.
pub const RASTER_WIDTH: u32 = 1024;
/// Off-screen raster height in pixels.
pub const RASTER_HEIGHT: u32 = 256;
/// Glyph height in pixels.
pub const FONT_SIZE: f32 = 96.0;
/// Only every `SAMPLE_STRIDE`-th pixel in each axis is inspected.
pub const SAMPLE_STRIDE: u32 = 2;
/// Pixels brighter than this count as lit.
pub const ALPHA_THRESHOLD: u8 = 128;
/// Raster pixels to world units.
pub const SAMPLE_SCALE: f32 = 0.5;

/// Fonts tried in order when no path is configured. CJK-capable faces first
/// so the default phrases render.
pub const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/Hiragino Sans GB.ttc",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\YuGothB.ttc",
    "C:\\Windows\\Fonts\\msgothic.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
];

/// Draws text into a single-channel raster where the pixel value is coverage.
pub trait Rasterizer {
    /// Render `text` centered in a `width` x `height` raster. Anything that
    /// falls outside the raster is clipped.
    fn rasterize(&self, text: &str, width: u32, height: u32) -> GrayImage;
}

/// Glyph renderer backed by a TrueType/OpenType font.
pub struct GlyphRasterizer {
    font: Font<'static>,
    font_size: f32,
}

impl GlyphRasterizer {
    /// Load a font file (collections use their first face).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font =
            Font::try_from_vec(data).ok_or_else(|| FontError::Invalid(path.to_path_buf()))?;
        log::info!("Loaded font {}", path.display());
        Ok(Self {
            font,
            font_size: FONT_SIZE,
        })
    }

    /// Load `path` if given, otherwise the first entry of
    /// [`FONT_SEARCH_PATHS`] that exists.
    pub fn discover(path: Option<&Path>) -> Result<Self, FontError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let found = FONT_SEARCH_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
            .ok_or(FontError::NotFound)?;
        Self::from_file(found)
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }
}

impl Rasterizer for GlyphRasterizer {
    fn rasterize(&self, text: &str, width: u32, height: u32) -> GrayImage {
        let mut raster = GrayImage::new(width, height);
        let scale = Scale::uniform(self.font_size);
        let v_metrics = self.font.v_metrics(scale);

        // Lay out once at the origin to measure the run
        let glyphs: Vec<_> = self.font.layout(text, scale, point(0.0, 0.0)).collect();
        let text_width = glyphs.last().map_or(0.0, |g| {
            g.position().x + g.unpositioned().h_metrics().advance_width
        });

        // Center horizontally, and vertically on the middle of the em box.
        // Unlike a screen overlay, long phrases are allowed to spill off
        // both edges.
        let start_x = (width as f32 - text_width) / 2.0;
        let baseline = height as f32 / 2.0 + (v_metrics.ascent + v_metrics.descent) / 2.0;

        for glyph in self.font.layout(text, scale, point(start_x, baseline)) {
            let Some(bounding_box) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                plot(
                    &mut raster,
                    bounding_box.min.x + gx as i32,
                    bounding_box.min.y + gy as i32,
                    coverage,
                );
            });
        }

        raster
    }
}

/// Write glyph coverage at `(x, y)`, dropping pixels outside the raster.
/// Overlapping glyph edges keep the stronger coverage.
fn plot(raster: &mut GrayImage, x: i32, y: i32, coverage: f32) {
    let (width, height) = raster.dimensions();
    if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
        return;
    }
    let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
    let pixel = raster.get_pixel_mut(x as u32, y as u32);
    pixel.0[0] = pixel.0[0].max(value);
}

/// Points sampled from a rasterized phrase, in world units on `z = 0`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeSamples {
    points: Vec<Vec3>,
}

impl ShapeSamples {
    /// Scan `mask` every [`SAMPLE_STRIDE`] pixels, row by row, keeping pixels
    /// above [`ALPHA_THRESHOLD`].
    ///
    /// Raster coordinates are re-centered on the middle of the raster, with y
    /// pointing up, and scaled by [`SAMPLE_SCALE`].
    pub fn from_mask(mask: &GrayImage) -> Self {
        let (width, height) = mask.dimensions();
        let half_w = (width / 2) as f32;
        let half_h = (height / 2) as f32;

        let mut points = Vec::new();
        for y in (0..height).step_by(SAMPLE_STRIDE as usize) {
            for x in (0..width).step_by(SAMPLE_STRIDE as usize) {
                let Luma([alpha]) = *mask.get_pixel(x, y);
                if alpha > ALPHA_THRESHOLD {
                    points.push(Vec3::new(
                        (x as f32 - half_w) * SAMPLE_SCALE,
                        (half_h - y as f32) * SAMPLE_SCALE,
                        0.0,
                    ));
                }
            }
        }
        Self { points }
    }

    pub fn from_points(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Bind every particle's target to a sample, cycling through the samples
    /// by particle index.
    ///
    /// An empty sample set binds every particle to the origin.
    pub fn assign_targets(&self, store: &mut ParticleStore) {
        let points = self.points_or_origin();
        for i in 0..store.len() {
            store.set_target(i, points[i % points.len()]);
        }
    }

    /// The samples, or a single point at the origin when there are none.
    ///
    /// A phrase whose glyphs all fail to render would otherwise leave nothing
    /// to bind particles to.
    fn points_or_origin(&self) -> &[Vec3] {
        const ORIGIN: [Vec3; 1] = [Vec3::ZERO];
        if self.points.is_empty() {
            &ORIGIN
        } else {
            &self.points
        }
    }
}

/// Turns phrases into sample sets with a fixed raster size.
pub struct ShapeGenerator {
    rasterizer: Box<dyn Rasterizer>,
    width: u32,
    height: u32,
}

impl ShapeGenerator {
    pub fn new(rasterizer: Box<dyn Rasterizer>) -> Self {
        Self {
            rasterizer,
            width: RASTER_WIDTH,
            height: RASTER_HEIGHT,
        }
    }

    /// Raster the phrase would be sampled from.
    pub fn mask(&self, text: &str) -> GrayImage {
        self.rasterizer.rasterize(text, self.width, self.height)
    }

    /// Sample points for a phrase. May be empty.
    pub fn samples(&self, text: &str) -> ShapeSamples {
        ShapeSamples::from_mask(&self.mask(text))
    }

    /// Write the raster for `text` to an image file (format from extension).
    pub fn export_mask(
        &self,
        text: &str,
        path: impl AsRef<Path>,
    ) -> Result<(), image::ImageError> {
        self.mask(text).save(path)
    }
}
