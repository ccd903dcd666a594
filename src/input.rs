//! Input handling for particle fields.
//!
//! Raw winit window events are translated into a small set of
//! [`InputEvent`]s that the fields understand:
//!
//! - key presses carry the typed character, matched case-insensitively
//!   against a [`PhraseMap`] by the morph field
//! - pointer presses, drags and releases carry normalized device coordinates
//!   and drive the touch field's [`Attractor`]
//!
//! Mouse and touch both produce pointer events. Only the first finger down is
//! followed; other touches are ignored until it lifts.

use glam::{Vec2, Vec3};
use winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use crate::error::ConfigError;

/// Events the simulation reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A character key went down (not a repeat).
    Key(char),
    /// Pointer pressed at the given NDC position.
    PointerDown(Vec2),
    /// Pointer dragged to the given NDC position while pressed.
    PointerMove(Vec2),
    /// Pointer released or touch cancelled.
    PointerUp,
    /// The surface changed size, in physical pixels.
    Resized { width: u32, height: u32 },
    /// The user asked to close the window.
    Exit,
}

/// World-space point that pulls nearby particles while active.
///
/// Overwritten wholesale by every pointer event; there is no history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Attractor {
    pub point: Vec3,
    pub active: bool,
}

impl Attractor {
    /// Move the attractor and switch it on.
    pub fn engage(&mut self, point: Vec3) {
        self.point = point;
        self.active = true;
    }

    /// Switch the attractor off, leaving its last point in place.
    pub fn release(&mut self) {
        self.active = false;
    }
}

/// Fixed mapping from single keys to the phrases they morph the cloud into.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseMap {
    entries: Vec<(char, String)>,
}

impl PhraseMap {
    /// Build a mapping, rejecting keys that are not a single alphanumeric
    /// character, keys that collide once case is ignored, and empty phrases.
    pub fn new<K, P>(entries: impl IntoIterator<Item = (K, P)>) -> Result<Self, ConfigError>
    where
        K: AsRef<str>,
        P: Into<String>,
    {
        let mut map = Vec::new();
        for (key, phrase) in entries {
            let key = key.as_ref();
            let mut chars = key.chars();
            let c = match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_alphanumeric() => normalize(c),
                _ => return Err(ConfigError::InvalidKey(key.to_string())),
            };
            let phrase = phrase.into();
            if phrase.trim().is_empty() {
                return Err(ConfigError::EmptyPhrase(c));
            }
            if map.iter().any(|(k, _)| *k == c) {
                return Err(ConfigError::DuplicateKey(c));
            }
            map.push((c, phrase));
        }
        Ok(Self { entries: map })
    }

    /// Phrase mapped to `key`, ignoring case.
    pub fn lookup(&self, key: char) -> Option<&str> {
        let key = normalize(key);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, phrase)| phrase.as_str())
    }

    /// Mapped keys in insertion order (upper case).
    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PhraseMap {
    /// Six philosophy quotes, one per key.
    fn default() -> Self {
        Self {
            entries: vec![
                ('R', "人は自由なものとして生まれた。しかし至る所で鎖につながれている".into()),
                ('K', "意志は自らを法とする".into()),
                ('N', "神は死んだ。われわれが殺したのだ".into()),
                ('H', "万人の万人に対する闘争".into()),
                ('S', "存在とは何か".into()),
                ('M', "哲学者たちは世界をさまざまに解釈してきた。重要なのはそれを変えることだ".into()),
            ],
        }
    }
}

fn normalize(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

/// Translates winit events into [`InputEvent`]s.
///
/// Tracks only what translation needs: the window size for NDC conversion,
/// the mouse button and last cursor position, and which touch is followed.
#[derive(Debug)]
pub struct Input {
    window_size: (u32, u32),
    mouse_held: bool,
    last_cursor_ndc: Vec2,
    primary_touch: Option<u64>,
}

impl Input {
    /// Create a new input tracker.
    pub fn new() -> Self {
        Self {
            window_size: (800, 600),
            mouse_held: false,
            last_cursor_ndc: Vec2::ZERO,
            primary_touch: None,
        }
    }

    /// Update window size for NDC calculations.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// Whether a pointer (mouse button or followed touch) is currently down.
    pub fn pointer_held(&self) -> bool {
        self.mouse_held || self.primary_touch.is_some()
    }

    /// Convert a position in physical pixels to normalized device coordinates.
    ///
    /// Origin is at center of window. X increases to the right, Y increases upward.
    pub fn to_ndc(&self, x: f64, y: f64) -> Vec2 {
        let (w, h) = self.window_size;
        if w == 0 || h == 0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            (x as f32 / w as f32) * 2.0 - 1.0,
            1.0 - (y as f32 / h as f32) * 2.0, // Y flipped
        )
    }

    /// Process a winit window event.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CloseRequested => Some(InputEvent::Exit),

            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
                Some(InputEvent::Resized {
                    width: size.width,
                    height: size.height,
                })
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return None;
                }
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => Some(InputEvent::Exit),
                    Key::Character(text) => text.chars().next().map(InputEvent::Key),
                    _ => None,
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.mouse_button(*state == ElementState::Pressed),

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x, position.y)
            }

            WindowEvent::Touch(Touch {
                id,
                phase,
                location,
                ..
            }) => self.touch(*id, *phase, location.x, location.y),

            _ => None,
        }
    }

    /// Left mouse button went down or up.
    ///
    /// A press does not carry a position; the last cursor move supplies it.
    pub fn mouse_button(&mut self, pressed: bool) -> Option<InputEvent> {
        self.mouse_held = pressed;
        if pressed {
            Some(InputEvent::PointerDown(self.last_cursor_ndc))
        } else {
            Some(InputEvent::PointerUp)
        }
    }

    /// Cursor moved to `(x, y)` in physical pixels.
    pub fn cursor_moved(&mut self, x: f64, y: f64) -> Option<InputEvent> {
        let ndc = self.to_ndc(x, y);
        self.last_cursor_ndc = ndc;
        self.mouse_held.then_some(InputEvent::PointerMove(ndc))
    }

    /// A touch changed phase at `(x, y)` in physical pixels.
    pub fn touch(&mut self, id: u64, phase: TouchPhase, x: f64, y: f64) -> Option<InputEvent> {
        match phase {
            TouchPhase::Started => {
                if self.primary_touch.is_some() {
                    return None;
                }
                self.primary_touch = Some(id);
                Some(InputEvent::PointerDown(self.to_ndc(x, y)))
            }
            TouchPhase::Moved => (self.primary_touch == Some(id))
                .then(|| InputEvent::PointerMove(self.to_ndc(x, y))),
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.primary_touch != Some(id) {
                    return None;
                }
                self.primary_touch = None;
                Some(InputEvent::PointerUp)
            }
        }
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_ndc() {
        let mut input = Input::new();
        input.set_window_size(800, 600);

        // Center of window should be (0, 0) in NDC
        let center = input.to_ndc(400.0, 300.0);
        assert!(center.x.abs() < 0.01);
        assert!(center.y.abs() < 0.01);

        let top_left = input.to_ndc(0.0, 0.0);
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_zero_sized_window_maps_to_center() {
        let mut input = Input::new();
        input.set_window_size(0, 0);
        assert_eq!(input.to_ndc(10.0, 10.0), Vec2::ZERO);
    }

    #[test]
    fn test_cursor_moves_only_report_while_held() {
        let mut input = Input::new();
        input.set_window_size(200, 100);

        assert_eq!(input.cursor_moved(100.0, 50.0), None);
        assert_eq!(
            input.mouse_button(true),
            Some(InputEvent::PointerDown(Vec2::ZERO))
        );
        assert!(input.pointer_held());
        assert_eq!(
            input.cursor_moved(200.0, 0.0),
            Some(InputEvent::PointerMove(Vec2::new(1.0, 1.0)))
        );
        assert_eq!(input.mouse_button(false), Some(InputEvent::PointerUp));
        assert!(!input.pointer_held());
        assert_eq!(input.cursor_moved(0.0, 0.0), None);
    }

    #[test]
    fn test_only_first_touch_is_followed() {
        let mut input = Input::new();
        input.set_window_size(100, 100);

        assert_eq!(
            input.touch(1, TouchPhase::Started, 50.0, 50.0),
            Some(InputEvent::PointerDown(Vec2::ZERO))
        );
        // Second finger is ignored for its whole lifetime
        assert_eq!(input.touch(2, TouchPhase::Started, 0.0, 0.0), None);
        assert_eq!(input.touch(2, TouchPhase::Moved, 10.0, 0.0), None);
        assert_eq!(input.touch(2, TouchPhase::Ended, 10.0, 0.0), None);
        assert!(input.pointer_held());

        assert_eq!(
            input.touch(1, TouchPhase::Moved, 100.0, 100.0),
            Some(InputEvent::PointerMove(Vec2::new(1.0, -1.0)))
        );
        assert_eq!(
            input.touch(1, TouchPhase::Cancelled, 100.0, 100.0),
            Some(InputEvent::PointerUp)
        );
        assert!(!input.pointer_held());
    }

    #[test]
    fn test_attractor_engage_release() {
        let mut attractor = Attractor::default();
        assert!(!attractor.active);

        attractor.engage(Vec3::new(1.0, 2.0, 0.0));
        assert!(attractor.active);
        assert_eq!(attractor.point, Vec3::new(1.0, 2.0, 0.0));

        attractor.release();
        assert!(!attractor.active);
        assert_eq!(attractor.point, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_phrase_lookup_ignores_case() {
        let phrases = PhraseMap::default();
        assert_eq!(phrases.len(), 6);
        assert_eq!(phrases.lookup('s'), Some("存在とは何か"));
        assert_eq!(phrases.lookup('S'), Some("存在とは何か"));
        assert_eq!(phrases.lookup('x'), None);
        assert_eq!(phrases.keys().collect::<String>(), "RKNHSM");
    }

    #[test]
    fn test_phrase_map_validation() {
        assert_eq!(
            PhraseMap::new([("ab", "two chars")]).unwrap_err(),
            ConfigError::InvalidKey("ab".into())
        );
        assert_eq!(
            PhraseMap::new([("!", "symbol")]).unwrap_err(),
            ConfigError::InvalidKey("!".into())
        );
        assert_eq!(
            PhraseMap::new([("a", "one"), ("A", "two")]).unwrap_err(),
            ConfigError::DuplicateKey('A')
        );
        assert_eq!(
            PhraseMap::new([("q", "  ")]).unwrap_err(),
            ConfigError::EmptyPhrase('Q')
        );

        let map = PhraseMap::new([("h", "HELLO"), ("w", "WORLD")]).unwrap();
        assert_eq!(map.lookup('H'), Some("HELLO"));
        assert_eq!(map.lookup('w'), Some("WORLD"));
    }
}
