//! Time utilities for the frame clock

use std::time::{Duration, Instant};

/// Default frame rate of the simulation
pub const DEFAULT_FPS: u32 = 60;

/// Calculate delta time for one simulation tick (in seconds)
pub fn tick_delta(fps: u32) -> f32 {
    1.0 / fps.max(1) as f32
}

/// Wall-clock duration of one tick at the given frame rate
pub fn tick_duration(fps: u32) -> Duration {
    Duration::from_micros(1_000_000 / fps.max(1) as u64)
}

/// Count a remaining-time value down by `dt`, floored at zero
pub fn count_down(remaining: f32, dt: f32) -> f32 {
    (remaining - dt).max(0.0)
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_micros(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_delta_matches_frame_rate() {
        assert!((tick_delta(60) - 1.0 / 60.0).abs() < f32::EPSILON);
        assert_eq!(tick_duration(50), Duration::from_millis(20));
    }

    #[test]
    fn zero_fps_does_not_divide_by_zero() {
        assert_eq!(tick_delta(0), 1.0);
        assert_eq!(tick_duration(0), Duration::from_secs(1));
    }

    #[test]
    fn count_down_floors_at_zero() {
        assert_eq!(count_down(0.5, 0.25), 0.25);
        assert_eq!(count_down(0.1, 0.25), 0.0);
        assert_eq!(count_down(0.0, 0.25), 0.0);
    }
}
