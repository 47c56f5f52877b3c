use std::time::Instant;

use crate::frame::FrameInfo;

/// Shader time at the first frame
pub const SHADER_TIME_START: f64 = 1.0;
/// Shader time units per second of wall time
pub const SHADER_TIME_SCALE: f64 = 1000.0;

/// Frame clock - measures delta time and accumulates shader time
#[derive(Debug)]
pub struct FrameClock {
    last_tick: Instant,
    number: u64,
    time: f64,
}

impl FrameClock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            number: 0,
            time: SHADER_TIME_START,
        }
    }

    /// Measure the delta since the last tick and advance
    pub fn tick(&mut self) -> FrameInfo {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.advance(delta)
    }

    /// Advance by an explicit delta in seconds
    pub fn advance(&mut self, delta: f32) -> FrameInfo {
        self.time += delta as f64 * SHADER_TIME_SCALE;
        let info = FrameInfo::new(self.number, self.time, delta);
        self.number += 1;
        info
    }

    /// Reset the delta reference to now, keeping frame count and shader time
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }

    pub fn frame_number(&self) -> u64 {
        self.number
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
