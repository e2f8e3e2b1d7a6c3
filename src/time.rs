//! Frame timing.
//!
//! Animation is frame-based (a fixed step per redraw), so the clock is only
//! used for reporting: the last frame time and a smoothed FPS figure for the
//! debug panel.

use std::time::{Duration, Instant};

/// How often the FPS figure is recomputed.
const FPS_WINDOW: Duration = Duration::from_millis(500);

/// Counts frames and measures how fast they arrive.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_frame: Instant,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
        }
    }

    /// Record a frame at the current time.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Record a frame at `now`.
    pub fn tick_at(&mut self, now: Instant) {
        self.delta_secs = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;

        let window = now.saturating_duration_since(self.fps_update_time);
        if window >= FPS_WINDOW {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f32 / window.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }
    }

    /// Seconds between the last two frames.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[cfg(test)]
    fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
