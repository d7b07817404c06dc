//! Frame timing
//!
//! Motion is tuned in milliseconds per frame. Long stalls (a resize, a
//! debugger pause) are clamped so the player does not jump through walls.

use std::time::Duration;

/// Longest frame fed to motion, in milliseconds
const MAX_FRAME_MS: f32 = 100.0;

/// Converts real frame deltas into motion frame times
pub struct FrameClock {
    /// Total elapsed time in seconds
    elapsed: f32,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Record a frame and return its clamped duration in milliseconds
    pub fn tick(&mut self, delta: Duration) -> f32 {
        self.elapsed += delta.as_secs_f32();
        self.frames += 1;
        (delta.as_secs_f32() * 1000.0).min(MAX_FRAME_MS)
    }

    /// Seconds since the last reset
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Average frames per second since the last reset
    pub fn fps(&self) -> f32 {
        if self.elapsed > 0.0 {
            self.frames as f32 / self.elapsed
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.frames = 0;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_reports_milliseconds() {
        let mut clock = FrameClock::new();
        let ms = clock.tick(Duration::from_millis(16));
        assert!((ms - 16.0).abs() < 1e-3);
        assert_eq!(clock.tick(Duration::from_secs(2)), MAX_FRAME_MS);
        assert!(clock.fps() > 0.0);
    }

    #[test]
    fn test_reset_restarts_the_count() {
        let mut clock = FrameClock::new();
        clock.tick(Duration::from_millis(500));
        clock.tick(Duration::from_millis(500));
        assert!((clock.elapsed() - 1.0).abs() < 1e-4);
        assert!((clock.fps() - 2.0).abs() < 1e-3);

        clock.reset();
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.fps(), 0.0);
    }
}
