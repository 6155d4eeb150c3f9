//! Frame clock.
//!
//! Elapsed time drives the intro and the ambient motion; delta drives drift,
//! color smoothing and scrub. Deltas are clamped so a stalled frame (window
//! dragged, laptop resumed) does not jump the animation.
//!
//! ```ignore
//! let mut time = Time::new();
//!
//! // In the frame callback:
//! let (elapsed, delta) = time.update();
//! ```

use std::time::{Duration, Instant};

/// Longest delta a single frame may report, in seconds.
pub const DEFAULT_MAX_DELTA: f32 = 0.1;

/// Time tracking for the frame loop.
#[derive(Debug)]
pub struct Time {
    last_frame: Instant,
    /// Total elapsed time in seconds.
    elapsed_secs: f32,
    /// Time since last frame in seconds.
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
    max_delta: f32,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            fixed_delta: None,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns `(elapsed_time, delta_time)`.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(self.fixed_delta.unwrap_or(raw_delta));

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Step the clock by `delta` seconds without reading the wall clock.
    pub fn advance(&mut self, delta: f32) -> (f32, f32) {
        self.delta_secs = delta.clamp(0.0, self.max_delta);
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;
        (self.elapsed_secs, self.delta_secs)
    }

    /// Simulated seconds since start.
    ///
    /// The sum of clamped deltas, so it lags wall time after a stall.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since last frame in seconds (delta time).
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Use a fixed delta every frame. `None` returns to real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Set the per-frame delta ceiling.
    pub fn set_max_delta(&mut self, max_delta: f32) {
        self.max_delta = max_delta.max(0.0);
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = time.update();

        assert!(elapsed > 0.0);
        assert!(delta > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_delta_clamped() {
        let mut time = Time::new();
        let (elapsed, delta) = time.advance(5.0);
        assert_eq!(delta, DEFAULT_MAX_DELTA);
        assert_eq!(elapsed, DEFAULT_MAX_DELTA);

        let (_, delta) = time.advance(-1.0);
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn test_max_delta() {
        let mut time = Time::new();
        time.set_max_delta(0.05);
        let (_, delta) = time.advance(1.0);
        assert_eq!(delta, 0.05);

        // a negative ceiling freezes the clock rather than running it backwards
        time.set_max_delta(-1.0);
        let (elapsed, delta) = time.advance(1.0);
        assert_eq!(delta, 0.0);
        assert_eq!(elapsed, 0.05);
    }

    #[test]
    fn test_fixed_delta() {
        let mut time = Time::new();
        time.set_fixed_delta(Some(1.0 / 60.0));

        thread::sleep(Duration::from_millis(100));
        time.update();

        let expected = 1.0 / 60.0;
        assert!((time.delta() - expected).abs() < 0.0001);
    }
}
