//! Frame clock.
//!
//! Supplies the simulation time `t` fed to the integrator. In real-time mode
//! `t` is wall-clock seconds since the clock started; in fixed mode every
//! tick advances `t` by a constant step, which makes runs reproducible.
//!
//! # Example
//!
//! ```ignore
//! use particle_field::time::Clock;
//!
//! let mut clock = Clock::fixed(1.0 / 60.0);
//! let t = clock.tick();
//! assert_eq!(clock.frame(), 1);
//! ```

use std::time::{Duration, Instant};

/// Time tracking for the frame loop.
#[derive(Debug)]
pub struct Clock {
    /// When the clock was created.
    start: Instant,
    /// Seconds added per tick, or `None` to follow the wall clock.
    fixed_step: Option<f32>,
    /// Simulation time at the last tick, in seconds.
    elapsed_secs: f32,
    /// Total ticks since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Clock {
    /// A clock that follows the wall clock.
    pub fn realtime() -> Self {
        Self::with_step(None)
    }

    /// A clock that advances by `step` seconds per tick regardless of how
    /// long frames actually take.
    pub fn fixed(step: f32) -> Self {
        Self::with_step(Some(step.max(0.0)))
    }

    fn with_step(fixed_step: Option<f32>) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            fixed_step,
            elapsed_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Advance one frame and return the simulation time for it.
    ///
    /// In fixed mode the first tick returns `0.0`.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();

        self.elapsed_secs = match self.fixed_step {
            Some(step) => self.frame_count as f32 * step,
            None => now.duration_since(self.start).as_secs_f32(),
        };
        self.frame_count += 1;

        // Update FPS periodically
        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.elapsed_secs
    }

    /// Simulation time returned by the last tick.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Total ticks since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed_step.is_some()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::realtime()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = Clock::realtime();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        assert!(!clock.is_fixed());
    }

    #[test]
    fn test_realtime_tick() {
        let mut clock = Clock::realtime();
        thread::sleep(Duration::from_millis(10));
        let t = clock.tick();

        assert!(t > 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_fixed_step() {
        let mut clock = Clock::fixed(1.0 / 60.0);

        thread::sleep(Duration::from_millis(20));
        assert_eq!(clock.tick(), 0.0);
        let t = clock.tick();

        // Should use fixed step regardless of actual time
        assert!((t - 1.0 / 60.0).abs() < 1e-6);
        for _ in 0..58 {
            clock.tick();
        }
        assert!((clock.elapsed() - 59.0 / 60.0).abs() < 1e-4);
        assert_eq!(clock.frame(), 60);
    }

    #[test]
    fn test_negative_step_clamps_to_zero() {
        let mut clock = Clock::fixed(-1.0);
        clock.tick();
        assert_eq!(clock.tick(), 0.0);
    }
}
