//! Visual configuration for particle rendering.
//!
//! Controls how the cloud looks, separate from the rules that move it: the
//! point sprite style and the color palette the morph field steps through.

use glam::Vec3;

use crate::error::ConfigError;

/// The 30 colors the morph field cycles through, one step per shape change.
pub const MORPH_COLORS: [u32; 30] = [
    0x8952d1, 0x8b079e, 0x5a6873, 0x4a3215, 0x3c938a, 0xbbbeab, 0x004557, 0xf080fb, 0x50996d,
    0x12482c, 0x15ffcc, 0xe4e25a, 0xd083fb, 0xacf25a, 0xad782a, 0x427628, 0x44d8e8, 0xbaa877,
    0xf6086f, 0xc2f0f1, 0x6fb707, 0x92317e, 0x674139, 0x606ec9, 0x060457, 0xdac572, 0x7426a3,
    0xb17ff5, 0x5e1184, 0xf19e78,
];

/// Default color of the touch field.
pub const TOUCH_COLOR: u32 = 0x44d8e8;

/// Convert a `0xRRGGBB` value to sRGB components in `0.0..=1.0`.
pub fn hex_to_srgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Convert sRGB components to linear light, for blending on an sRGB surface.
pub fn srgb_to_linear(c: Vec3) -> Vec3 {
    let channel = |v: f32| {
        if v <= 0.04045 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };
    Vec3::new(channel(c.x), channel(c.y), channel(c.z))
}

/// Ordered, non-empty list of colors with a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<u32>,
    cursor: usize,
}

impl Palette {
    /// Create a palette starting at its first color.
    pub fn new(colors: impl Into<Vec<u32>>) -> Result<Self, ConfigError> {
        let colors = colors.into();
        if colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(Self { colors, cursor: 0 })
    }

    /// A palette with a single color that never changes.
    pub fn solid(color: u32) -> Self {
        Self {
            colors: vec![color],
            cursor: 0,
        }
    }

    /// The color under the cursor, as `0xRRGGBB`.
    pub fn current(&self) -> u32 {
        self.colors[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; palettes are validated non-empty.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Move the cursor to the next color, wrapping at the end, and return it.
    pub fn advance(&mut self) -> u32 {
        self.cursor = (self.cursor + 1) % self.colors.len();
        self.current()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: MORPH_COLORS.to_vec(),
            cursor: 0,
        }
    }
}

/// How each particle is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    /// Sprite diameter in world units.
    pub size: f32,
    /// Alpha applied to every sprite.
    pub opacity: f32,
    /// Clear color behind the cloud (sRGB).
    pub background: Vec3,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            size: 2.5,
            opacity: 0.8,
            background: Vec3::ZERO,
        }
    }
}
